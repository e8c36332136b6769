use tracing::{error, info};

use crate::connection::{ConnectionConfig, connect};
use crate::core::{BenchError, Result};
use crate::result::QueryResult;

pub const TABLES: [&str; 3] = ["opt_clients", "opt_products", "opt_orders"];

#[derive(Debug)]
pub struct TableReport {
    pub table: String,
    pub row_count: Result<i64>,
    pub schema: Result<QueryResult>,
}

/// Row counts and column layouts, gathered for manual review.
#[derive(Debug)]
pub struct VerificationReport {
    pub tables: Vec<TableReport>,
}

impl VerificationReport {
    /// Row count of `table`, if it was read successfully.
    pub fn count(&self, table: &str) -> Option<i64> {
        self.tables
            .iter()
            .find(|t| t.table == table)
            .and_then(|t| t.row_count.as_ref().ok().copied())
    }

    pub fn print(&self) {
        println!("Row counts:");
        for t in &self.tables {
            match &t.row_count {
                Ok(count) => println!("  {:<14} {}", t.table, count),
                Err(err) => println!("  {:<14} unavailable: {}", t.table, err),
            }
        }

        for t in &self.tables {
            println!("\nSchema of {}:", t.table);
            match &t.schema {
                Ok(schema) => schema.print(),
                Err(err) => println!("  unavailable: {}", err),
            }
        }
    }
}

/// Query counts and schemas for `tables` over one connection.
pub async fn verify(config: &ConnectionConfig, database: Option<&str>, tables: &[&str]) -> Result<VerificationReport> {
    let mut session = connect(config, database).await?;
    let mut reports = Vec::with_capacity(tables.len());

    for &table in tables {
        let row_count = match session.query(&format!("SELECT COUNT(*) FROM {}", table)).await {
            Ok(result) => result
                .rows()
                .first()
                .and_then(|row| row.first())
                .and_then(|v| v.as_i64())
                .ok_or_else(|| BenchError::UnexpectedResult(format!("COUNT(*) on {} returned no value", table))),
            Err(err) => Err(err),
        };
        if let Err(err) = &row_count {
            error!(table, error = %err, "row count failed");
        }

        let schema = session.describe_table(table).await;
        if let Err(err) = &schema {
            error!(table, error = %err, "schema introspection failed");
        }

        reports.push(TableReport {
            table: table.to_string(),
            row_count,
            schema,
        });
    }

    if let Err(err) = session.close().await {
        error!(error = %err, "failed to close connection");
    }

    info!(tables = tables.len(), "verification finished");
    Ok(VerificationReport { tables: reports })
}
