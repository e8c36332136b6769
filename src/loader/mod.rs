//! Bulk loading of generated batches.
//!
//! Small batches go in as one transaction. The large order batch is split
//! into fixed-size chunks, each committed on its own, so a failure loses at
//! most the chunk in flight; chunks committed before it stay in the store.

use tracing::{error, info};

use crate::core::{BenchError, Client, Order, Product, Result, SqlParam};
use crate::interface::SqlSession;

pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Target table and column list of a multi-row INSERT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertTemplate {
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

impl InsertTemplate {
    pub const fn new(table: &'static str, columns: &'static [&'static str]) -> Self {
        Self { table, columns }
    }

    /// `INSERT INTO table (a, b, c) ` ready for a VALUES list.
    pub fn insert_prefix(&self) -> String {
        format!("INSERT INTO {} ({}) ", self.table, self.columns.join(", "))
    }
}

pub const CLIENTS: InsertTemplate = InsertTemplate::new(
    "opt_clients",
    &["id", "name", "surname", "email", "phone", "address", "status"],
);

pub const PRODUCTS: InsertTemplate = InsertTemplate::new(
    "opt_products",
    &["product_name", "product_category", "description"],
);

pub const ORDERS: InsertTemplate =
    InsertTemplate::new("opt_orders", &["order_date", "client_id", "product_id"]);

/// A generated record that maps onto one row of an [`InsertTemplate`].
pub trait Insertable {
    const TEMPLATE: InsertTemplate;

    /// Bind values in the template's column order.
    fn to_params(&self) -> Vec<SqlParam>;
}

impl Insertable for Client {
    const TEMPLATE: InsertTemplate = CLIENTS;

    fn to_params(&self) -> Vec<SqlParam> {
        vec![
            SqlParam::Text(self.id.to_string()),
            SqlParam::Text(self.name.clone()),
            SqlParam::Text(self.surname.clone()),
            SqlParam::Text(self.email.clone()),
            SqlParam::Text(self.phone.clone()),
            SqlParam::Text(self.address.clone()),
            SqlParam::from(self.status.as_str()),
        ]
    }
}

impl Insertable for Product {
    const TEMPLATE: InsertTemplate = PRODUCTS;

    fn to_params(&self) -> Vec<SqlParam> {
        vec![
            SqlParam::Text(self.name.clone()),
            SqlParam::from(self.category),
            SqlParam::Text(self.description.clone()),
        ]
    }
}

impl Insertable for Order {
    const TEMPLATE: InsertTemplate = ORDERS;

    fn to_params(&self) -> Vec<SqlParam> {
        vec![
            SqlParam::DateTime(self.order_date),
            SqlParam::Text(self.client_id.to_string()),
            SqlParam::Integer(self.product_id),
        ]
    }
}

/// Outcome of a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub table: &'static str,
    pub chunks_committed: usize,
    pub rows_committed: usize,
}

/// Insert the whole batch in one transaction.
pub async fn load_batch<T: Insertable>(session: &mut dyn SqlSession, records: &[T]) -> Result<LoadReport> {
    let table = T::TEMPLATE.table;
    info!(table, rows = records.len(), "inserting batch");

    if records.is_empty() {
        return Ok(LoadReport {
            table,
            chunks_committed: 0,
            rows_committed: 0,
        });
    }

    let rows: Vec<Vec<SqlParam>> = records.iter().map(Insertable::to_params).collect();
    session.insert_rows(&T::TEMPLATE, &rows).await?;

    info!(table, rows = records.len(), "batch committed");
    Ok(LoadReport {
        table,
        chunks_committed: 1,
        rows_committed: records.len(),
    })
}

/// Insert the batch in chunks of `chunk_size`, committing after each chunk.
///
/// Stops at the first failing chunk. Earlier chunks are not undone.
pub async fn load_chunked<T: Insertable>(
    session: &mut dyn SqlSession,
    records: &[T],
    chunk_size: usize,
) -> Result<LoadReport> {
    let table = T::TEMPLATE.table;
    if chunk_size == 0 {
        return Err(BenchError::Config("chunk size must be > 0".into()));
    }

    let total_chunks = records.len().div_ceil(chunk_size);
    info!(table, rows = records.len(), chunk_size, total_chunks, "inserting in chunks");

    let mut committed_rows = 0;
    for (chunk, chunk_records) in records.chunks(chunk_size).enumerate() {
        let rows: Vec<Vec<SqlParam>> = chunk_records.iter().map(Insertable::to_params).collect();
        if let Err(err) = session.insert_rows(&T::TEMPLATE, &rows).await {
            error!(table, chunk, committed_rows, error = %err, "chunk insert failed");
            return Err(BenchError::ChunkFailed {
                table,
                chunk,
                committed_rows,
                source: Box::new(err),
            });
        }
        committed_rows += chunk_records.len();
        info!(
            table,
            chunk = chunk + 1,
            total_chunks,
            committed_rows,
            "chunk committed"
        );
    }

    Ok(LoadReport {
        table,
        chunks_committed: total_chunks,
        rows_committed: committed_rows,
    })
}

/// Read back the identifiers the store assigned to `opt_products`.
pub async fn fetch_product_ids(session: &mut dyn SqlSession) -> Result<Vec<i64>> {
    let result = session
        .query("SELECT product_id FROM opt_products ORDER BY product_id")
        .await?;
    Ok(result
        .rows()
        .iter()
        .filter_map(|row| row.first().and_then(|v| v.as_i64()))
        .collect())
}
