use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Connection to {target} failed: {source}")]
    Connect {
        target: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to read script {path}: {source}")]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Script failed at statement #{statement}{}: {source}", near(.sql))]
    Script {
        statement: usize,
        /// Text of the failing statement, when the script could be split
        sql: Option<String>,
        #[source]
        source: sqlx::Error,
    },

    #[error("Insert into {table} failed: {source}")]
    Insert {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Chunk {chunk} of {table} failed after {committed_rows} committed rows: {source}")]
    ChunkFailed {
        table: &'static str,
        chunk: usize,
        committed_rows: usize,
        #[source]
        source: Box<BenchError>,
    },

    #[error("Query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),

    #[error("Cannot generate orders: client pool is empty")]
    EmptyClientPool,

    #[error("Cannot generate orders: no product identifiers available")]
    EmptyProductPool,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, BenchError>;

fn near(sql: &Option<String>) -> String {
    sql.as_deref().map(|s| format!(" near `{s}`")).unwrap_or_default()
}

