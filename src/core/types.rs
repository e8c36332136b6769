use chrono::NaiveDateTime;
use std::fmt;
use uuid::Uuid;

use super::Value;

pub type Row = Vec<Value>;

/// Fixed label set products are categorised under.
pub const PRODUCT_CATEGORIES: [&str; 5] = [
    "Category1",
    "Category2",
    "Category3",
    "Category4",
    "Category5",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientStatus {
    Active,
    Inactive,
}

impl ClientStatus {
    pub const ALL: [ClientStatus; 2] = [ClientStatus::Active, ClientStatus::Inactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated customer row for `opt_clients`.
///
/// The id is produced client-side so orders generated in the same run can
/// reference it before anything reaches the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub status: ClientStatus,
}

/// A generated row for `opt_products`. `product_id` is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub name: String,
    pub category: &'static str,
    pub description: String,
}

/// A generated row for `opt_orders`.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_date: NaiveDateTime,
    pub client_id: Uuid,
    pub product_id: i64,
}
