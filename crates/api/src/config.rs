//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Database (one of)
//! - `CUSTOMERS_DATABASE_URL` - `PostgreSQL` connection string
//! - `DATABASE_URL` - Generic fallback (set by most hosting platforms)
//! - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` - Assembled into a
//!   URL when neither of the above is set (defaults: localhost, 5432, postgres,
//!   empty, `customer_db`)
//!
//! ## Optional
//! - `CUSTOMERS_STORAGE` - `postgres` (default) or `memory`
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 4000)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "4000";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where customer records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// `PostgreSQL` via a bounded connection pool.
    #[default]
    Postgres,
    /// Process-local map; contents are lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(format!("expected 'postgres' or 'memory', got '{other}'")),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Storage backend selection
    pub storage: StorageBackend,
    /// Database settings (used when `storage` is `Postgres`)
    pub database: DatabaseConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Database connection configuration.
///
/// Implements `Debug` manually to redact the connection string, which
/// carries the password.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL
    pub url: SecretString,
    /// Maximum pool size; requests queue when every connection is busy
    pub max_connections: u32,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl DatabaseConfig {
    fn from_lookup(env: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = env("CUSTOMERS_DATABASE_URL")
            .or_else(|| env("DATABASE_URL"))
            .unwrap_or_else(|| assemble_database_url(env));

        let max_connections = match env("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "DB_MAX_CONNECTIONS".to_string(),
                    format!("expected a positive integer, got '{raw}'"),
                )
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            url: SecretString::from(url),
            max_connections,
        })
    }
}

/// Build a `postgres://` URL from the discrete `DB_*` variables.
fn assemble_database_url(env: &impl Fn(&str) -> Option<String>) -> String {
    let host = env("DB_HOST").unwrap_or_else(|| "localhost".to_string());
    let port = env("DB_PORT").unwrap_or_else(|| "5432".to_string());
    let user = env("DB_USER").unwrap_or_else(|| "postgres".to_string());
    let password = env("DB_PASSWORD").unwrap_or_default();
    let name = env("DB_NAME").unwrap_or_else(|| "customer_db".to_string());

    if password.is_empty() {
        format!("postgres://{user}@{host}:{port}/{name}")
    } else {
        format!("postgres://{user}:{password}@{host}:{port}/{name}")
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(env: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage = match env("CUSTOMERS_STORAGE") {
            Some(raw) => raw
                .parse::<StorageBackend>()
                .map_err(|e| ConfigError::InvalidEnvVar("CUSTOMERS_STORAGE".to_string(), e))?,
            None => StorageBackend::default(),
        };
        let database = DatabaseConfig::from_lookup(env)?;
        let host = env("HOST")
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = env("PORT")
            .unwrap_or_else(|| DEFAULT_PORT.to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let sentry_dsn = env("SENTRY_DSN").filter(|dsn| !dsn.is_empty());
        let sentry_environment = env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);

        Ok(Self {
            storage,
            database,
            host,
            port,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Configuration for an in-memory service bound to an ephemeral port.
    ///
    /// Used by tests and local demos that have no database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            storage: StorageBackend::Memory,
            database: DatabaseConfig {
                url: SecretString::from(String::new()),
                max_connections: DEFAULT_MAX_CONNECTIONS,
            },
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the database URL with the password intact, for the pool.
    #[must_use]
    pub fn database_url(&self) -> &str {
        self.database.url.expose_secret()
    }
}
