use chrono::NaiveDateTime;
use log::LevelFilter;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column as _, ConnectOptions, Row as _, Sqlite};
use std::str::FromStr;

use super::{Backend, ConnectionConfig};
use crate::core::{BenchError, Result, Value};

const DESCRIBE_SQL: &str = "SELECT name AS field, type AS type, \"notnull\" AS not_null, \
     dflt_value AS default_value, pk AS pk \
     FROM pragma_table_info(?) ORDER BY cid";

/// Session over a file-backed SQLite database.
///
/// The database file is created on first connect.
pub struct SqliteSession {
    conn: SqliteConnection,
}

impl SqliteSession {
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let connect_err = |source| BenchError::Connect {
            target: config.describe(),
            source,
        };

        let url = config
            .url
            .as_deref()
            .ok_or_else(|| BenchError::Config("SQLite backend requires DATABASE_URL".into()))?;
        let options = SqliteConnectOptions::from_str(url)
            .map_err(connect_err)?
            .create_if_missing(true)
            .log_statements(LevelFilter::Debug);

        let conn = options.connect().await.map_err(connect_err)?;
        Ok(Self { conn })
    }
}

impl_sql_session!(
    SqliteSession,
    database = Sqlite,
    backend = Backend::Sqlite,
    describe = DESCRIBE_SQL,
    decode = decode_cell,
);

// SQLite values are dynamically typed, so each cell is probed in turn.
fn decode_cell(row: &SqliteRow, index: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map_or(Value::Null, Value::Integer);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.map_or(Value::Null, Value::Float);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map_or(Value::Null, Value::Text);
    }
    if let Ok(v) = row.try_get::<Option<NaiveDateTime>, _>(index) {
        return v.map_or(Value::Null, |dt| Value::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()));
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v.map_or(Value::Null, Value::Bytes);
    }
    Value::Text(format!("<{}>", row.columns()[index].type_info()))
}
