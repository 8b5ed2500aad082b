//! Configuration for [`DatabaseManager`](crate::DatabaseManager).

use std::str::FromStr;
use std::time::Duration;

use tracing::Level;

use crate::error::CrudError;

/// How concurrent callers share the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// One critical section per manager: catalog lookups and statements never
    /// overlap, and a single pooled connection is used.
    #[default]
    Exclusive,
    /// No manager-wide lock: each call checks out its own connection and
    /// relies on the backend's transaction isolation.
    Pooled,
}

impl AccessMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exclusive => "exclusive",
            Self::Pooled => "pooled",
        }
    }
}

impl FromStr for AccessMode {
    type Err = CrudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclusive" => Ok(Self::Exclusive),
            "pooled" => Ok(Self::Pooled),
            other => Err(CrudError::validation(format!(
                "unknown access mode '{other}' (expected 'exclusive' or 'pooled')"
            ))),
        }
    }
}

/// Configuration for `DatabaseManager`.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Lock discipline.
    pub access_mode: AccessMode,
    /// Upper bound for every backend round trip.
    pub statement_timeout: Option<Duration>,
    /// Upper bound for acquiring the session (gate and pool checkout).
    pub lock_timeout: Option<Duration>,
    /// Maximum pooled connections in [`AccessMode::Pooled`].
    pub pool_size: usize,
    /// Whether to emit statement text via `tracing`.
    pub log_sql: bool,
    /// Level of the `pgcrud.sql` statement events.
    pub sql_log_level: Level,
    /// Truncate logged SQL (in bytes). `None` means no truncation.
    pub max_logged_sql: Option<usize>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            access_mode: AccessMode::Exclusive,
            statement_timeout: Some(Duration::from_secs(30)),
            lock_timeout: Some(Duration::from_secs(30)),
            pool_size: 8,
            log_sql: true,
            sql_log_level: Level::DEBUG,
            max_logged_sql: Some(200),
        }
    }
}

impl ManagerConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the access mode.
    pub fn access_mode(mut self, mode: AccessMode) -> Self {
        self.access_mode = mode;
        self
    }

    /// Drop the manager-wide lock and use a connection pool.
    pub fn pooled(mut self, pool_size: usize) -> Self {
        self.access_mode = AccessMode::Pooled;
        self.pool_size = pool_size;
        self
    }

    /// Set statement timeout.
    pub fn statement_timeout(mut self, duration: Duration) -> Self {
        self.statement_timeout = Some(duration);
        self
    }

    /// Wait for the backend indefinitely.
    pub fn no_statement_timeout(mut self) -> Self {
        self.statement_timeout = None;
        self
    }

    /// Set lock/checkout timeout.
    pub fn lock_timeout(mut self, duration: Duration) -> Self {
        self.lock_timeout = Some(duration);
        self
    }

    /// Wait for the session indefinitely.
    pub fn no_lock_timeout(mut self) -> Self {
        self.lock_timeout = None;
        self
    }

    /// Disable SQL logging.
    pub fn no_sql_log(mut self) -> Self {
        self.log_sql = false;
        self
    }

    /// Emit statement text at `level` instead of `DEBUG`.
    pub fn sql_log_level(mut self, level: Level) -> Self {
        self.sql_log_level = level;
        self
    }

    /// Connections the pool may open for this configuration.
    pub fn effective_pool_size(&self) -> usize {
        match self.access_mode {
            AccessMode::Exclusive => 1,
            AccessMode::Pooled => self.pool_size.max(1),
        }
    }
}
