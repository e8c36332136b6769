use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::connection::{ConnectionConfig, connect};
use crate::core::Result;
use crate::result::QueryResult;

/// A query formulation with a label for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedQuery {
    pub name: String,
    pub sql: String,
}

impl NamedQuery {
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimedQuery {
    pub elapsed: Duration,
    pub result: QueryResult,
}

/// Run `sql` on a fresh connection and time execution plus full materialization.
///
/// Connection setup is outside the measured span.
pub async fn time_query(config: &ConnectionConfig, database: Option<&str>, sql: &str) -> Result<TimedQuery> {
    let mut session = connect(config, database).await?;

    let start = Instant::now();
    let outcome = session.query(sql).await;
    let elapsed = start.elapsed();

    if let Err(err) = session.close().await {
        error!(error = %err, "failed to close connection");
    }

    Ok(TimedQuery {
        elapsed,
        result: outcome?,
    })
}

#[derive(Debug, Clone)]
pub struct Measurement {
    pub name: String,
    pub outcome: std::result::Result<TimedQuery, String>,
}

impl Measurement {
    pub fn elapsed(&self) -> Option<Duration> {
        self.outcome.as_ref().ok().map(|t| t.elapsed)
    }
}

/// Time each formulation in turn. A failed formulation is reported and skipped.
pub async fn compare_formulations(
    config: &ConnectionConfig,
    database: Option<&str>,
    queries: &[NamedQuery],
) -> Vec<Measurement> {
    let mut measurements = Vec::with_capacity(queries.len());

    for query in queries {
        let outcome = match time_query(config, database, &query.sql).await {
            Ok(timed) => {
                info!(
                    query = %query.name,
                    elapsed_ms = timed.elapsed.as_secs_f64() * 1000.0,
                    rows = timed.result.row_count(),
                    "query timed"
                );
                Ok(timed)
            }
            Err(err) => {
                error!(query = %query.name, error = %err, "query failed; measurement skipped");
                Err(err.to_string())
            }
        };
        measurements.push(Measurement {
            name: query.name.clone(),
            outcome,
        });
    }

    let row_counts: Vec<usize> = measurements
        .iter()
        .filter_map(|m| m.outcome.as_ref().ok().map(|t| t.result.row_count()))
        .collect();
    if row_counts.windows(2).any(|w| w[0] != w[1]) {
        warn!(?row_counts, "formulations returned different row counts");
    }

    measurements
}

pub fn print_measurements(title: &str, measurements: &[Measurement]) {
    println!("{}:", title);
    for m in measurements {
        match &m.outcome {
            Ok(timed) => println!(
                "  {:<16} {:>12.3} ms  {} row(s)",
                m.name,
                timed.elapsed.as_secs_f64() * 1000.0,
                timed.result.row_count()
            ),
            Err(err) => println!("  {:<16} skipped: {}", m.name, err),
        }
    }
}
