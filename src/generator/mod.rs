//! Synthetic dataset generation for `opt_clients`, `opt_products` and
//! `opt_orders`.
//!
//! Field values flow through the generator's RNG, so a seeded generator
//! reproduces the same batches. Client ids are fresh v4 UUIDs on every run
//! and never repeat across runs against the same store.

use chrono::{Duration, Local, NaiveDateTime, Timelike};
use fake::Fake;
use fake::faker::address::en::{BuildingNumber, CityName, StateAbbr, StreetName, ZipCode};
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::{Paragraph, Word};
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::core::{BenchError, Client, ClientStatus, Order, PRODUCT_CATEGORIES, Product, Result};

pub const DEFAULT_WINDOW_DAYS: i64 = 365 * 5;

/// Historical range order dates are drawn from, ending at `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderWindow {
    pub end: NaiveDateTime,
    pub span: Duration,
}

impl OrderWindow {
    pub fn ending_at(end: NaiveDateTime, span: Duration) -> Self {
        Self {
            end: end.with_nanosecond(0).unwrap_or(end),
            span,
        }
    }

    /// Window of `days` ending at the current local time.
    pub fn last_days(days: i64) -> Self {
        Self::ending_at(Local::now().naive_local(), Duration::days(days))
    }

    /// Like [`OrderWindow::last_days`], rejecting spans that would not lie
    /// entirely in the past.
    pub fn try_last_days(days: i64) -> Result<Self> {
        if days < 1 {
            return Err(BenchError::Config(format!(
                "order window must cover at least one day, got {days}"
            )));
        }
        Ok(Self::last_days(days))
    }

    pub fn start(&self) -> NaiveDateTime {
        self.end - self.span
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start() && at <= self.end
    }
}

impl Default for OrderWindow {
    fn default() -> Self {
        Self::last_days(DEFAULT_WINDOW_DAYS)
    }
}

/// Where order product references are sampled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductPool {
    /// Ids `1..=count`, trusting the store to number products densely from 1.
    Dense(i64),
    /// Ids read back from the store.
    Known(Vec<i64>),
}

impl ProductPool {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Dense(count) => *count < 1,
            Self::Known(ids) => ids.is_empty(),
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        match self {
            Self::Dense(count) => (1..=*count).contains(&id),
            Self::Known(ids) => ids.contains(&id),
        }
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> i64 {
        match self {
            Self::Dense(count) => rng.gen_range(1..=*count),
            Self::Known(ids) => ids[rng.gen_range(0..ids.len())],
        }
    }
}

pub struct DatasetGenerator<R: Rng> {
    rng: R,
    window: OrderWindow,
}

impl DatasetGenerator<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed), OrderWindow::default())
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy(), OrderWindow::default())
    }
}

impl<R: Rng> DatasetGenerator<R> {
    pub fn new(rng: R, window: OrderWindow) -> Self {
        Self { rng, window }
    }

    pub fn with_window(mut self, window: OrderWindow) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> OrderWindow {
        self.window
    }

    pub fn clients(&mut self, count: usize) -> Vec<Client> {
        (0..count).map(|_| self.client()).collect()
    }

    pub fn products(&mut self, count: usize) -> Vec<Product> {
        (0..count).map(|_| self.product()).collect()
    }

    /// Generate `count` orders referencing `clients` and `products`.
    ///
    /// Fails fast when there is nothing to reference; a zero-length batch
    /// needs no references and always succeeds.
    pub fn orders(&mut self, count: usize, clients: &[Client], products: &ProductPool) -> Result<Vec<Order>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        if clients.is_empty() {
            return Err(BenchError::EmptyClientPool);
        }
        if products.is_empty() {
            return Err(BenchError::EmptyProductPool);
        }

        let mut orders = Vec::with_capacity(count);
        for _ in 0..count {
            let order_date = self.order_date();
            let client_id = clients[self.rng.gen_range(0..clients.len())].id;
            let product_id = products.sample(&mut self.rng);
            orders.push(Order {
                order_date,
                client_id,
                product_id,
            });
        }
        Ok(orders)
    }

    fn client(&mut self) -> Client {
        let rng = &mut self.rng;
        let address = format!(
            "{} {}, {}, {} {}",
            BuildingNumber().fake_with_rng::<String, _>(rng),
            StreetName().fake_with_rng::<String, _>(rng),
            CityName().fake_with_rng::<String, _>(rng),
            StateAbbr().fake_with_rng::<String, _>(rng),
            ZipCode().fake_with_rng::<String, _>(rng),
        );

        Client {
            id: Uuid::new_v4(),
            name: FirstName().fake_with_rng(rng),
            surname: LastName().fake_with_rng(rng),
            email: SafeEmail().fake_with_rng(rng),
            phone: PhoneNumber().fake_with_rng(rng),
            address,
            status: ClientStatus::ALL[rng.gen_range(0..ClientStatus::ALL.len())],
        }
    }

    fn product(&mut self) -> Product {
        let rng = &mut self.rng;
        Product {
            name: Word().fake_with_rng(rng),
            category: PRODUCT_CATEGORIES[rng.gen_range(0..PRODUCT_CATEGORIES.len())],
            description: Paragraph(3..6).fake_with_rng(rng),
        }
    }

    fn order_date(&mut self) -> NaiveDateTime {
        let offset = self.rng.gen_range(0..=self.window.span.num_seconds().max(0));
        self.window.start() + Duration::seconds(offset)
    }
}

/// Ids of a client batch, for checking order references.
pub fn client_ids(clients: &[Client]) -> Vec<Uuid> {
    clients.iter().map(|c| c.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn fixed_window() -> OrderWindow {
        let end = NaiveDate::from_ymd_opt(2024, 6, 30)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        OrderWindow::ending_at(end, Duration::days(DEFAULT_WINDOW_DAYS))
    }

    fn generator(seed: u64) -> DatasetGenerator<StdRng> {
        DatasetGenerator::seeded(seed).with_window(fixed_window())
    }

    #[test]
    fn test_clients_are_unique_and_well_formed() {
        let clients = generator(7).clients(500);
        assert_eq!(clients.len(), 500);

        let ids: HashSet<Uuid> = clients.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 500);

        for client in &clients {
            assert_eq!(client.id.get_version_num(), 4);
            assert!(!client.name.is_empty());
            assert!(!client.surname.is_empty());
            assert!(client.email.contains('@'));
            assert!(ClientStatus::ALL.contains(&client.status));
        }
    }

    #[test]
    fn test_both_statuses_show_up() {
        let clients = generator(11).clients(200);
        assert!(clients.iter().any(|c| c.status == ClientStatus::Active));
        assert!(clients.iter().any(|c| c.status == ClientStatus::Inactive));
    }

    #[test]
    fn test_products_use_fixed_categories() {
        let products = generator(3).products(100);
        assert_eq!(products.len(), 100);
        for product in &products {
            assert!(PRODUCT_CATEGORIES.contains(&product.category));
            assert!(!product.name.contains(' '));
            assert!(!product.description.is_empty());
        }
    }

    #[test]
    fn test_orders_reference_generated_clients() {
        let mut generator = generator(42);
        let clients = generator.clients(25);
        let pool = ProductPool::Dense(10);
        let orders = generator.orders(1_000, &clients, &pool).unwrap();

        let ids: HashSet<Uuid> = client_ids(&clients).into_iter().collect();
        let window = generator.window();
        assert_eq!(orders.len(), 1_000);
        for order in &orders {
            assert!(ids.contains(&order.client_id));
            assert!((1..=10).contains(&order.product_id));
            assert!(window.contains(order.order_date));
        }
    }

    #[test]
    fn test_known_product_pool_is_respected() {
        let mut generator = generator(5);
        let clients = generator.clients(3);
        let pool = ProductPool::Known(vec![101, 205, 309]);
        let orders = generator.orders(300, &clients, &pool).unwrap();
        assert!(orders.iter().all(|o| pool.contains(o.product_id)));
    }

    #[test]
    fn test_empty_client_pool_fails_fast() {
        let mut generator = generator(1);
        let clients = generator.clients(0);
        assert!(clients.is_empty());

        let err = generator
            .orders(10, &clients, &ProductPool::Dense(5))
            .unwrap_err();
        assert!(matches!(err, BenchError::EmptyClientPool));
    }

    #[test]
    fn test_empty_product_pool_fails_fast() {
        let mut generator = generator(1);
        let clients = generator.clients(2);
        let err = generator
            .orders(10, &clients, &ProductPool::Known(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, BenchError::EmptyProductPool));
    }

    #[test]
    fn test_zero_orders_needs_no_references() {
        let orders = generator(1).orders(0, &[], &ProductPool::Dense(0)).unwrap();
        assert!(orders.is_empty());
    }

    fn fields(client: &Client) -> (&str, &str, &str, &str, &str, ClientStatus) {
        (
            &client.name,
            &client.surname,
            &client.email,
            &client.phone,
            &client.address,
            client.status,
        )
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = generator(99).clients(20);
        let b = generator(99).clients(20);
        assert_eq!(a.iter().map(fields).collect::<Vec<_>>(), b.iter().map(fields).collect::<Vec<_>>());

        let c = generator(100).clients(20);
        assert_ne!(a.iter().map(fields).collect::<Vec<_>>(), c.iter().map(fields).collect::<Vec<_>>());
    }

    #[test]
    fn test_seeded_runs_never_repeat_client_ids() {
        let a: HashSet<Uuid> = client_ids(&generator(99).clients(50)).into_iter().collect();
        let b: HashSet<Uuid> = client_ids(&generator(99).clients(50)).into_iter().collect();
        assert!(a.is_disjoint(&b));
    }

    #[test]
    fn test_order_window_rejects_empty_or_future_spans() {
        assert!(matches!(OrderWindow::try_last_days(0), Err(BenchError::Config(_))));
        assert!(matches!(OrderWindow::try_last_days(-30), Err(BenchError::Config(_))));

        let window = OrderWindow::try_last_days(1).unwrap();
        assert!(window.start() < window.end);
    }
}
