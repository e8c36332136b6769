#![allow(dead_code)]

use optbench::{ConnectionConfig, connect, run_script_file};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A file-backed SQLite database living in its own temp directory.
pub struct TestDb {
    pub dir: TempDir,
    pub config: ConnectionConfig,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("bench.db");
        let config = ConnectionConfig::default().url(&format!("sqlite://{}", path.display()));
        Self { dir, config }
    }

    pub fn write_script(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("script should be written");
        path
    }

    pub async fn create_tables(&self) {
        run_script_file(&self.config, &sql_path("sqlite/create_tables.sql"), None)
            .await
            .expect("tables should be created");
    }

    pub async fn count(&self, table: &str) -> i64 {
        let mut session = connect(&self.config, None).await.expect("connect");
        let result = session
            .query(&format!("SELECT COUNT(*) FROM {}", table))
            .await
            .expect("count query");
        session.close().await.expect("close");
        result.rows()[0][0].as_i64().expect("integer count")
    }
}

pub fn sql_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("sql").join(relative)
}
