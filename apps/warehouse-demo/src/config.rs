//! Demo configuration module.
//!
//! ## Sources (later wins)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Built-in defaults          localhost:5432/warehouse, sslmode=disable│
//! │  2. warehouse.toml             optional, next to the working directory  │
//! │  3. WAREHOUSE_* environment    WAREHOUSE_DATABASE__HOST=db.internal     │
//! │  4. DATABASE_URL               full DSN, replaces the connection fields │
//! │                                                                         │
//! │  A `.env` file is loaded into the environment first, if present.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example `warehouse.toml`
//! ```toml
//! [database]
//! host = "localhost"
//! name = "warehouse"
//! user = "postgres"
//! password = "password"
//! search_path = "warehouse"
//! ssl_mode = "disable"
//! ```

use std::time::Duration;

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::Deserialize;
use warehouse_db::{DbConfig, DbError, SslMode};

/// Base name of the optional settings file (`warehouse.toml`).
const SETTINGS_FILE: &str = "warehouse";

/// Demo settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
}

/// Connection and pool settings.
#[derive(Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Full connection string; when set, host/port/user/password/name/
    /// search_path/ssl_mode below are ignored.
    pub url: Option<String>,

    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub name: String,
    pub search_path: Option<String>,
    pub ssl_mode: SslMode,

    pub max_connections: u32,
    pub connect_timeout_secs: u64,

    /// Log every SQL statement (through sqlx's tracing output)
    pub log_statements: bool,

    /// Drop and recreate the catalog tables on startup
    pub reset_schema: bool,
}

// Manual impl: url and password must not end up in logs.
impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("url", &self.url.as_ref().map(|_| "***"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("name", &self.name)
            .field("search_path", &self.search_path)
            .field("ssl_mode", &self.ssl_mode)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Loads settings from every source, `.env` included.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is normal outside development
        let _ = dotenvy::dotenv();

        let mut builder = Self::defaults()?
            .add_source(File::with_name(SETTINGS_FILE).required(false))
            .add_source(
                Environment::with_prefix("WAREHOUSE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }

        Self::from_builder(builder)
    }

    /// Builder seeded with the built-in defaults.
    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let builder = config::Config::builder()
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.user", "postgres")?
            .set_default("database.name", "warehouse")?
            .set_default("database.search_path", "warehouse")?
            .set_default("database.ssl_mode", "disable")?
            .set_default("database.max_connections", 1)?
            .set_default("database.connect_timeout_secs", 10)?
            .set_default("database.log_statements", true)?
            .set_default("database.reset_schema", true)?;
        Ok(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl DatabaseSettings {
    /// Turns the settings into a connection configuration.
    pub fn to_db_config(&self) -> Result<DbConfig, ConfigError> {
        let config = match &self.url {
            Some(url) => DbConfig::from_url(url)?,
            None => {
                let mut config = DbConfig::new(&self.host, &self.name)
                    .port(self.port)
                    .ssl_mode(self.ssl_mode);
                config.user = self.user.clone();
                config.password = self.password.clone();
                if let Some(search_path) = &self.search_path {
                    config = config.search_path(search_path);
                }
                config
            }
        };

        Ok(config
            .max_connections(self.max_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .log_statements(self.log_statements)
            .reset_schema(self.reset_schema))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid connection settings: {0}")]
    Connection(#[from] DbError),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
