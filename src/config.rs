//! Process configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use tracing_subscriber::filter::{EnvFilter, ParseError};

use crate::error::ConfigError;

/// Pool size used against a local database.
pub const LOCAL_MAX_CONNECTIONS: u32 = 20;
/// Idle connections are reaped after this long.
pub const LOCAL_IDLE_TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound on acquiring a connection from the pool.
pub const LOCAL_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP listening port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Hosted database connection string. Switches to hosted mode when set.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Shared secret for `POST /api/login`.
    #[serde(default)]
    pub admin_password: Option<String>,

    /// Deployment mode; `production` skips the `.env` file.
    #[serde(default)]
    pub app_env: Option<String>,

    /// Directory served for paths no route matches.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Log filter directive.
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    // === Local database ===
    #[serde(default = "default_db_host")]
    pub db_host: String,

    #[serde(default = "default_db_user")]
    pub db_user: String,

    #[serde(default)]
    pub db_password: String,

    #[serde(default = "default_db_port")]
    pub db_port: u16,

    #[serde(default = "default_db_name")]
    pub db_name: String,
}

/// Where the store lives, chosen once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Single connection string; TLS required but the certificate is not verified.
    Hosted { url: String },
    /// Discrete fields for local development.
    Local(LocalStore),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStore {
    pub host: String,
    pub user: String,
    pub password: String,
    pub port: u16,
    pub database: String,
    pub max_connections: u32,
    pub idle_timeout: Duration,
    pub connect_timeout: Duration,
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "postgres".to_string()
}

/// Read `.env` into the process environment unless `APP_ENV=production`.
pub fn load_dotenv() {
    let production = std::env::var("APP_ENV").is_ok_and(|v| v == "production");
    if !production {
        dotenvy::dotenv().ok();
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(envy::from_env()?)
    }

    /// Log filter from `RUST_LOG`. An unparseable directive falls back to
    /// `info` and the parse error is returned for reporting.
    pub fn log_filter(&self) -> (EnvFilter, Option<ParseError>) {
        match EnvFilter::try_new(&self.rust_log) {
            Ok(filter) => (filter, None),
            Err(e) => (EnvFilter::new(default_log_level()), Some(e)),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.as_deref() == Some("production")
    }

    pub fn store(&self) -> StoreConfig {
        match self.database_url.as_deref() {
            Some(url) if !url.is_empty() => StoreConfig::Hosted {
                url: url.to_string(),
            },
            _ => StoreConfig::Local(LocalStore {
                host: self.db_host.clone(),
                user: self.db_user.clone(),
                password: self.db_password.clone(),
                port: self.db_port,
                database: self.db_name.clone(),
                max_connections: LOCAL_MAX_CONNECTIONS,
                idle_timeout: LOCAL_IDLE_TIMEOUT,
                connect_timeout: LOCAL_CONNECT_TIMEOUT,
            }),
        }
    }
}

impl StoreConfig {
    /// Driver connect options for this variant.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        match self {
            StoreConfig::Hosted { url } => Ok(PgConnectOptions::from_str(url)
                .map_err(ConfigError::DatabaseUrl)?
                .ssl_mode(PgSslMode::Require)),
            StoreConfig::Local(local) => Ok(PgConnectOptions::new()
                .host(&local.host)
                .port(local.port)
                .username(&local.user)
                .password(&local.password)
                .database(&local.database)),
        }
    }
}
