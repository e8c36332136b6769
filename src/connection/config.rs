use crate::core::{BenchError, Result};

/// Which engine a connection targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    MySql,
    Sqlite,
}

impl Backend {
    /// Bind-parameter ceiling for a single statement.
    pub fn max_bind_params(&self) -> usize {
        match self {
            Self::MySql => 65_535,
            Self::Sqlite => 32_766,
        }
    }

    /// Directory name under `sql/` holding this engine's scripts.
    pub fn script_dir(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Database connection configuration
///
/// Built once at startup and passed by reference into every step.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Database host
    pub host: String,

    /// Database port
    pub port: u16,

    /// Username for authentication
    pub user: String,

    /// Password for authentication
    pub password: String,

    /// Database name
    pub database: String,

    /// Full connection URL; overrides the individual parts when set
    pub url: Option<String>,
}

impl ConnectionConfig {
    /// Create a new connection configuration
    pub fn new(user: &str, password: &str) -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: user.to_string(),
            password: password.to_string(),
            database: "optbench".to_string(),
            url: None,
        }
    }

    /// Read `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` and
    /// `DATABASE_URL` from the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(&env_string("DB_USER", ""), &env_string("DB_PASSWORD", ""))
            .host(&env_string("DB_HOST", "localhost"))
            .database(&env_string("DB_NAME", "optbench"));

        if let Ok(port) = std::env::var("DB_PORT") {
            let port = port
                .parse::<u16>()
                .map_err(|_| BenchError::Config(format!("DB_PORT must be a port number, got '{}'", port)))?;
            config = config.port(port);
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                config = config.url(&url);
            }
        }

        Ok(config)
    }

    /// Set the database name
    pub fn database(mut self, database: &str) -> Self {
        self.database = database.to_string();
        self
    }

    /// Set the host
    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set a full connection URL (`mysql://...` or `sqlite://...`)
    pub fn url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    /// Database to select on connect. A URL names its own database.
    pub fn default_database(&self) -> Option<&str> {
        match &self.url {
            Some(_) => None,
            None => Some(&self.database),
        }
    }

    pub fn backend(&self) -> Backend {
        match &self.url {
            Some(url) if url.starts_with("sqlite:") => Backend::Sqlite,
            _ => Backend::MySql,
        }
    }

    /// Human-readable target with the password masked.
    pub fn describe(&self) -> String {
        match (&self.url, self.backend()) {
            (Some(url), Backend::Sqlite) => url.clone(),
            (Some(url), Backend::MySql) => mask_url_password(url),
            (None, _) => format!(
                "mysql://{}:***@{}:{}/{}",
                self.user, self.host, self.port, self.database
            ),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.url.is_some() {
            return Ok(());
        }

        if self.user.is_empty() {
            return Err(BenchError::Config("DB_USER cannot be empty".into()));
        }

        if self.database.is_empty() {
            return Err(BenchError::Config("DB_NAME cannot be empty".into()));
        }

        if self.port == 0 {
            return Err(BenchError::Config("DB_PORT must be > 0".into()));
        }

        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new("root", "")
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn mask_url_password(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let rest = &url[scheme_end + 3..];
    let Some(at) = rest.rfind('@') else {
        return url.to_string();
    };
    match rest[..at].find(':') {
        Some(colon) => format!(
            "{}{}:***{}",
            &url[..scheme_end + 3],
            &rest[..colon],
            &rest[at..]
        ),
        None => url.to_string(),
    }
}
