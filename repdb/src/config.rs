//! Connection settings for one database

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Where and how to connect. Immutable once handed to a pool.
///
/// Deserializes from the `rdbs` tables of the deployment config:
///
/// ```toml
/// host = "db1"
/// port = 3306
/// login = "r"
/// password = "x"
/// database = "reports"
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(alias = "user")]
    pub login: String,

    #[serde(default)]
    pub password: String,

    #[serde(alias = "db")]
    pub database: String,

    /// Connections kept open while idle
    #[serde(default = "default_pool_min")]
    pub pool_min: usize,

    /// Upper bound on concurrent connections (and in-flight calls)
    #[serde(default = "default_pool_max")]
    pub pool_max: usize,

    /// Pause between attempts while the server is unreachable
    #[serde(default = "default_reconnect_backoff_ms")]
    pub reconnect_backoff_ms: u64,

    /// How long a call that lost its connection waits for the reconnect
    /// before giving up. Unset means wait until the pool is back.
    ///
    /// Only that call is bounded. When the deadline passes the pool stays
    /// `Connecting`, and the next call connects again and waits for it
    /// without a limit.
    #[serde(default)]
    pub reconnect_deadline_ms: Option<u64>,
}

fn default_port() -> u16 {
    3306
}
fn default_pool_min() -> usize {
    1
}
fn default_pool_max() -> usize {
    10
}
fn default_reconnect_backoff_ms() -> u64 {
    500
}

impl ConnectionConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        login: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            login: login.into(),
            password: password.into(),
            database: database.into(),
            pool_min: default_pool_min(),
            pool_max: default_pool_max(),
            reconnect_backoff_ms: default_reconnect_backoff_ms(),
            reconnect_deadline_ms: None,
        }
    }

    /// Set the pool bounds.
    pub fn pool(mut self, min: usize, max: usize) -> Self {
        self.pool_min = min;
        self.pool_max = max;
        self
    }

    pub fn reconnect_backoff(mut self, backoff: Duration) -> Self {
        self.reconnect_backoff_ms = backoff.as_millis() as u64;
        self
    }

    pub fn reconnect_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.reconnect_deadline_ms = deadline.map(|d| d.as_millis() as u64);
        self
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_backoff_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.reconnect_deadline_ms.map(Duration::from_millis)
    }

    /// Check the settings before any connection is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("host is required".into()));
        }
        if self.database.trim().is_empty() {
            return Err(Error::Config("database is required".into()));
        }
        if self.login.trim().is_empty() {
            return Err(Error::Config("login is required".into()));
        }
        if self.pool_max == 0 || self.pool_max > u32::MAX as usize {
            return Err(Error::Config(format!(
                "pool_max must be between 1 and {}",
                u32::MAX
            )));
        }
        if self.pool_min > self.pool_max {
            return Err(Error::Config(format!(
                "pool_min ({}) exceeds pool_max ({})",
                self.pool_min, self.pool_max
            )));
        }
        Ok(())
    }

    /// `host:port/database`, safe to log.
    pub fn endpoint(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("login", &self.login)
            .field("password", &"***")
            .field("database", &self.database)
            .field("pool_min", &self.pool_min)
            .field("pool_max", &self.pool_max)
            .field("reconnect_backoff_ms", &self.reconnect_backoff_ms)
            .field("reconnect_deadline_ms", &self.reconnect_deadline_ms)
            .finish()
    }
}
