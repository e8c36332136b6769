use async_trait::async_trait;

use crate::connection::Backend;
use crate::core::{Result, SqlParam};
use crate::loader::InsertTemplate;
use crate::result::QueryResult;

/// What a multi-statement script produced while it was drained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptStats {
    /// Statements that completed (one result summary each)
    pub statements: usize,
    /// Rows returned by statements and discarded
    pub rows_discarded: usize,
}

/// A single open session against the target engine.
///
/// Every method that writes owns its transaction: it begins, commits on
/// success and rolls back on failure before returning.
#[async_trait]
pub trait SqlSession: Send {
    fn backend(&self) -> Backend;

    /// Execute a multi-statement script as one unit, draining every result set.
    async fn run_script(&mut self, script: &str) -> Result<ScriptStats>;

    /// Insert `rows` into the template's table within a single transaction.
    ///
    /// Rows are packed into multi-row INSERT statements that stay under the
    /// backend's bind-parameter ceiling.
    async fn insert_rows(&mut self, template: &InsertTemplate, rows: &[Vec<SqlParam>]) -> Result<u64>;

    /// Execute a query and materialize the whole result set.
    async fn query(&mut self, sql: &str) -> Result<QueryResult>;

    /// Column layout of `table` as reported by the engine's catalog.
    async fn describe_table(&mut self, table: &str) -> Result<QueryResult>;

    async fn close(self: Box<Self>) -> Result<()>;
}

/// Number of rows that fit in one INSERT statement for a given column count.
pub fn rows_per_statement(backend: Backend, column_count: usize) -> usize {
    (backend.max_bind_params() / column_count.max(1)).max(1)
}
