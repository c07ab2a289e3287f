//! # Database Configuration
//!
//! Pool, lock and checkout deadlines.
//!
//! Configuration is built in code with the builder methods, or loaded from
//! environment variables with fallback to defaults:
//!
//! | Variable                     | Default            |
//! |------------------------------|--------------------|
//! | `KASIR_DATABASE_PATH`        | `./kasir.db`       |
//! | `KASIR_MAX_CONNECTIONS`      | `5`                |
//! | `KASIR_LOCK_TIMEOUT_MS`      | `5000`             |
//! | `KASIR_CHECKOUT_TIMEOUT_MS`  | `10000`            |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default database file when nothing is configured.
pub const DEFAULT_DATABASE_PATH: &str = "./kasir.db";

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/kasir.db")
///     .max_connections(8)
///     .lock_timeout(Duration::from_millis(500));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    pub min_connections: u32,

    /// How long to wait for a free pooled connection.
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection; `None` keeps idle
    /// connections open.
    pub idle_timeout: Option<Duration>,

    /// Age at which a connection is closed and replaced; `None` never
    /// retires one.
    pub max_lifetime: Option<Duration>,

    /// How long a statement waits for another writer's lock (SQLite busy
    /// timeout) before failing with `DbError::Busy`.
    pub lock_timeout: Duration,

    /// Upper bound for one whole checkout transaction.
    pub checkout_timeout: Duration,

    /// Whether to run migrations on connect.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(30 * 60)),
            lock_timeout: Duration::from_secs(5),
            checkout_timeout: Duration::from_secs(10),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection acquire timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the lock wait bound.
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Sets the whole-checkout deadline.
    pub fn checkout_timeout(mut self, timeout: Duration) -> Self {
        self.checkout_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// In-memory SQLite lives and dies with its single connection, so
    /// concurrent checkouts queue on the pool instead of on row locks, and
    /// the pool never closes that connection for idleness or age.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            max_lifetime: None,
            lock_timeout: Duration::from_secs(5),
            checkout_timeout: Duration::from_secs(10),
            run_migrations: true,
        }
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// `from_env` is this with `std::env::var`; tests pass a map instead of
    /// mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup("KASIR_DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());
        let mut config = DbConfig::new(path);

        if let Some(max) = parse_var::<u32, _>(&lookup, "KASIR_MAX_CONNECTIONS")? {
            if max == 0 {
                return Err(ConfigError::InvalidValue("KASIR_MAX_CONNECTIONS".to_string()));
            }
            config.max_connections = max;
            config.min_connections = config.min_connections.min(max);
        }

        if let Some(ms) = parse_var::<u64, _>(&lookup, "KASIR_LOCK_TIMEOUT_MS")? {
            config.lock_timeout = Duration::from_millis(ms);
        }

        if let Some(ms) = parse_var::<u64, _>(&lookup, "KASIR_CHECKOUT_TIMEOUT_MS")? {
            if ms == 0 {
                return Err(ConfigError::InvalidValue("KASIR_CHECKOUT_TIMEOUT_MS".to_string()));
            }
            config.checkout_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
