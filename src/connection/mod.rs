pub mod config;
#[macro_use]
mod session;
mod mysql;
mod sqlite;

use crate::core::Result;
use crate::interface::SqlSession;
use tracing::{debug, error};

pub use config::{Backend, ConnectionConfig};
pub use mysql::MySqlSession;
pub use sqlite::SqliteSession;

/// Open one session against the configured engine.
///
/// `database` selects the schema to use; `None` keeps whatever the URL names
/// (or none at all for a server-level MySQL session). Connection failures are
/// returned as [`BenchError::Connect`](crate::core::BenchError::Connect) so the
/// caller decides whether the step is skipped.
pub async fn connect(config: &ConnectionConfig, database: Option<&str>) -> Result<Box<dyn SqlSession>> {
    let session: Result<Box<dyn SqlSession>> = match config.backend() {
        Backend::MySql => MySqlSession::connect(config, database)
            .await
            .map(|s| Box::new(s) as Box<dyn SqlSession>),
        Backend::Sqlite => SqliteSession::connect(config)
            .await
            .map(|s| Box::new(s) as Box<dyn SqlSession>),
    };

    match &session {
        Ok(_) => debug!(target = %config.describe(), ?database, "connection opened"),
        Err(err) => error!(target = %config.describe(), error = %err, "failed to create database connection"),
    }

    session
}
