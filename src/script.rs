use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::connection::{ConnectionConfig, connect};
use crate::core::{BenchError, Result};

/// Outcome of a script run that committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptReport {
    pub path: PathBuf,
    pub statements: usize,
    pub rows_discarded: usize,
}

/// Execute every statement in the file at `path` as a single unit.
///
/// The script is committed only if all statements succeed; otherwise the
/// whole script is rolled back. The connection is closed on every path.
pub async fn run_script_file(config: &ConnectionConfig, path: &Path, database: Option<&str>) -> Result<ScriptReport> {
    let script = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| BenchError::ScriptRead {
            path: path.to_path_buf(),
            source,
        })?;

    let mut session = connect(config, database).await?;
    let outcome = session.run_script(&script).await;
    if let Err(err) = session.close().await {
        error!(error = %err, "failed to close connection");
    }

    match outcome {
        Ok(stats) => {
            info!(
                path = %path.display(),
                statements = stats.statements,
                rows_discarded = stats.rows_discarded,
                "SQL script executed successfully"
            );
            Ok(ScriptReport {
                path: path.to_path_buf(),
                statements: stats.statements,
                rows_discarded: stats.rows_discarded,
            })
        }
        Err(err) => {
            error!(path = %path.display(), error = %err, "SQL script rolled back");
            Err(err)
        }
    }
}
