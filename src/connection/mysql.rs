use chrono::NaiveDateTime;
use log::LevelFilter;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column as _, ConnectOptions, MySql, Row as _};
use std::str::FromStr;

use super::{Backend, ConnectionConfig};
use crate::core::{BenchError, Result, Value};

const DESCRIBE_SQL: &str = "SELECT COLUMN_NAME AS field, COLUMN_TYPE AS type, IS_NULLABLE AS nullable, \
     COLUMN_KEY AS `key`, EXTRA AS extra \
     FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
     ORDER BY ORDINAL_POSITION";

/// Session over a single MySQL connection.
pub struct MySqlSession {
    conn: MySqlConnection,
}

impl MySqlSession {
    pub async fn connect(config: &ConnectionConfig, database: Option<&str>) -> Result<Self> {
        let conn = connect_options(config, database)?
            .connect()
            .await
            .map_err(|source| BenchError::Connect {
                target: config.describe(),
                source,
            })?;
        Ok(Self { conn })
    }
}

impl_sql_session!(
    MySqlSession,
    database = MySql,
    backend = Backend::MySql,
    describe = DESCRIBE_SQL,
    decode = decode_cell,
);

/// Options for `config`, switching to `database` when one is given.
///
/// A URL wins over the individual host/port/user settings.
fn connect_options(config: &ConnectionConfig, database: Option<&str>) -> Result<MySqlConnectOptions> {
    let mut options = match &config.url {
        Some(url) => MySqlConnectOptions::from_str(url).map_err(|source| BenchError::Connect {
            target: config.describe(),
            source,
        })?,
        None => MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password),
    };
    if let Some(database) = database {
        options = options.database(database);
    }
    // Bulk inserts would flood the log at the driver's default level.
    Ok(options.log_statements(LevelFilter::Debug))
}

fn decode_cell(row: &MySqlRow, index: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map_or(Value::Null, Value::Integer);
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(index) {
        return v.map_or(Value::Null, |v| {
            i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer)
        });
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.map_or(Value::Null, Value::Float);
    }
    if let Ok(v) = row.try_get::<Option<NaiveDateTime>, _>(index) {
        return v.map_or(Value::Null, |dt| Value::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()));
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map_or(Value::Null, Value::Text);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v.map_or(Value::Null, Value::Bytes);
    }
    Value::Text(format!("<{}>", row.columns()[index].type_info()))
}
