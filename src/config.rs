//! Runtime settings, read from flags or the environment.

use clap::{Args, ValueEnum};

use crate::db::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    Development,
    Production,
    Test,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Database location: a file path, `sqlite://<path>` or `:memory:`.
    /// Empty means the platform data directory.
    #[arg(long, env = "DATABASE_URL", default_value = "", global = true)]
    pub database_url: String,

    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "127.0.0.1", global = true)]
    pub host: String,

    /// Port for HTTP API
    #[arg(short, long, env = "PORT", default_value_t = 5000, global = true)]
    pub port: u16,

    /// Version segment of the `/api/<version>` prefix
    #[arg(long, env = "API_VERSION", default_value = "v1", global = true)]
    pub api_version: String,

    /// Log level used when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    #[arg(long = "env", env = "APP_ENV", value_enum, default_value_t = RunMode::Development, global = true)]
    pub run_mode: RunMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            host: "127.0.0.1".to_string(),
            port: 5000,
            api_version: "v1".to_string(),
            log_level: "info".to_string(),
            run_mode: RunMode::Development,
        }
    }
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn api_prefix(&self) -> String {
        format!("/api/{}", self.api_version)
    }

    pub fn log_filter(&self) -> String {
        let level = &self.log_level;
        format!("dynasty={level},dynasty_core={level},tower_http={level}")
    }

    /// Opens the configured database and applies the schema.
    pub fn open_database(&self) -> anyhow::Result<Database> {
        let db = Database::open_url(&self.database_url)?;
        db.migrate()?;
        Ok(db)
    }
}
