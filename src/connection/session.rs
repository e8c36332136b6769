//! Session plumbing shared by every sqlx-backed engine.
//!
//! Each backend supplies its connection type, catalog query and cell decoder;
//! transactions, script draining, batched inserts and materialization are
//! generated once by `impl_sql_session!`.

use sqlparser::dialect::{MySqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;
use sqlx::{Column as _, Row as _};

use super::Backend;
use crate::core::{BenchError, Row, Value};
use crate::interface::ScriptStats;
use crate::result::QueryResult;

const STATEMENT_SNIPPET_CHARS: usize = 120;

/// Text of the 1-based `statement` of `script`, cut to a readable length.
///
/// `None` when the script does not parse in the backend's dialect.
pub(crate) fn failing_statement(backend: Backend, script: &str, statement: usize) -> Option<String> {
    let parsed = match backend {
        Backend::MySql => Parser::parse_sql(&MySqlDialect {}, script),
        Backend::Sqlite => Parser::parse_sql(&SQLiteDialect {}, script),
    }
    .ok()?;
    let text = parsed.get(statement.checked_sub(1)?)?.to_string();

    if text.chars().count() <= STATEMENT_SNIPPET_CHARS {
        return Some(text);
    }
    let mut snippet: String = text.chars().take(STATEMENT_SNIPPET_CHARS).collect();
    snippet.push_str("...");
    Some(snippet)
}

pub(crate) fn script_failed(backend: Backend, script: &str, stats: ScriptStats, source: sqlx::Error) -> BenchError {
    let statement = stats.statements + 1;
    BenchError::Script {
        statement,
        sql: failing_statement(backend, script, statement),
        source,
    }
}

pub(crate) fn materialize<R: sqlx::Row>(rows: &[R], decode: fn(&R, usize) -> Value) -> QueryResult {
    let columns = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();
    let rows = rows
        .iter()
        .map(|row| (0..row.len()).map(|i| decode(row, i)).collect::<Row>())
        .collect();
    QueryResult::new(columns, rows)
}

/// Implement [`SqlSession`](crate::interface::SqlSession) for a session
/// struct holding its connection in a `conn` field.
macro_rules! impl_sql_session {
    (
        $session:ty,
        database = $db:ty,
        backend = $backend:expr,
        describe = $describe_sql:expr,
        decode = $decode:path $(,)?
    ) => {
        #[async_trait::async_trait]
        impl $crate::interface::SqlSession for $session {
            fn backend(&self) -> $crate::connection::Backend {
                $backend
            }

            async fn run_script(&mut self, script: &str) -> $crate::core::Result<$crate::interface::ScriptStats> {
                use futures::TryStreamExt as _;
                use sqlx::{Connection as _, Executor as _};

                let mut tx = self.conn.begin().await?;
                let mut stats = $crate::interface::ScriptStats::default();

                let outcome = {
                    let mut results = (&mut *tx).fetch_many(sqlx::raw_sql(script));
                    loop {
                        match results.try_next().await {
                            Ok(Some(sqlx::Either::Left(_))) => stats.statements += 1,
                            Ok(Some(sqlx::Either::Right(_))) => stats.rows_discarded += 1,
                            Ok(None) => break Ok(()),
                            Err(err) => break Err(err),
                        }
                    }
                };

                match outcome {
                    Ok(()) => {
                        tx.commit().await?;
                        Ok(stats)
                    }
                    Err(source) => {
                        if let Err(err) = tx.rollback().await {
                            tracing::warn!(error = %err, "rollback after script failure did not complete");
                        }
                        Err($crate::connection::session::script_failed($backend, script, stats, source))
                    }
                }
            }

            async fn insert_rows(
                &mut self,
                template: &$crate::loader::InsertTemplate,
                rows: &[Vec<$crate::core::SqlParam>],
            ) -> $crate::core::Result<u64> {
                use sqlx::Connection as _;

                let insert_err = |source| $crate::core::BenchError::Insert {
                    table: template.table,
                    source,
                };
                let per_statement = $crate::interface::rows_per_statement($backend, template.columns.len());

                let mut tx = self.conn.begin().await?;
                let mut affected = 0;
                for statement_rows in rows.chunks(per_statement) {
                    let mut builder = sqlx::QueryBuilder::<$db>::new(template.insert_prefix());
                    builder.push_values(statement_rows, |mut b, row| {
                        for param in row {
                            match param {
                                $crate::core::SqlParam::Text(s) => b.push_bind(s.as_str()),
                                $crate::core::SqlParam::Integer(i) => b.push_bind(*i),
                                $crate::core::SqlParam::DateTime(dt) => b.push_bind(*dt),
                            };
                        }
                    });
                    let done = builder.build().execute(&mut *tx).await.map_err(insert_err)?;
                    affected += done.rows_affected();
                }
                tx.commit().await.map_err(insert_err)?;

                Ok(affected)
            }

            async fn query(&mut self, sql: &str) -> $crate::core::Result<$crate::result::QueryResult> {
                use sqlx::Executor as _;

                let rows = (&mut self.conn)
                    .fetch_all(sqlx::raw_sql(sql))
                    .await
                    .map_err($crate::core::BenchError::Query)?;
                Ok($crate::connection::session::materialize(&rows, $decode))
            }

            async fn describe_table(&mut self, table: &str) -> $crate::core::Result<$crate::result::QueryResult> {
                let rows = sqlx::query($describe_sql)
                    .bind(table)
                    .fetch_all(&mut self.conn)
                    .await
                    .map_err($crate::core::BenchError::Query)?;
                Ok($crate::connection::session::materialize(&rows, $decode))
            }

            async fn close(self: Box<Self>) -> $crate::core::Result<()> {
                use sqlx::Connection as _;

                self.conn.close().await?;
                Ok(())
            }
        }
    };
}
