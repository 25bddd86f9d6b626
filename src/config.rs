//! Configuration Module
//!
//! Loads the store connection settings and service parameters from
//! environment variables.

use std::env;
use std::time::Duration;

use thiserror::Error;

// == Defaults ==
const DEFAULT_TTL_SECS: u64 = 300;
const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 1;
const DEFAULT_DIAL_TIMEOUT_SECS: u64 = 5;
const DEFAULT_READ_TIMEOUT_SECS: u64 = 3;
const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 3;

// == Config Error ==
/// Errors raised while reading configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("{0} is required")]
    Missing(&'static str),

    /// A variable is set but cannot be used
    #[error("invalid {name} value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Top-level configuration for the cache process.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Which store the cache sits on
    pub backend: BackendConfig,
    /// TTL applied when a caller passes a zero TTL
    pub default_ttl: Duration,
    /// Admin HTTP server port
    pub server_port: u16,
}

/// Store selection.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendConfig {
    /// Redis, directly or through sentinel
    Redis(StoreConfig),
    /// In-process store, purged every `cleanup_interval`
    Memory { cleanup_interval: Duration },
}

/// Connection settings for the Redis store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Logical database index
    pub database: u8,
    pub pool_size: usize,
    /// Floor for the number of pooled connections kept open
    pub min_idle_conns: usize,
    pub max_conn_age: Duration,
    pub idle_timeout: Duration,
    pub dial_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    /// Sentinel discovery, `None` for a direct connection
    pub failover: Option<FailoverConfig>,
}

/// Sentinel quorum and the name of the primary it monitors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailoverConfig {
    pub primary_name: String,
    pub monitors: Vec<MonitorAddr>,
}

/// A single sentinel address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorAddr {
    pub host: String,
    pub port: u16,
}

impl StoreConfig {
    /// Settings for a direct connection with the stock timeouts.
    pub fn direct(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
            database: 0,
            pool_size: 10,
            min_idle_conns: 0,
            max_conn_age: Duration::ZERO,
            idle_timeout: Duration::ZERO,
            dial_timeout: Duration::from_secs(DEFAULT_DIAL_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            write_timeout: Duration::from_secs(DEFAULT_WRITE_TIMEOUT_SECS),
            failover: None,
        }
    }

    /// Timeout applied to each command round trip.
    pub fn command_timeout(&self) -> Duration {
        self.read_timeout.max(self.write_timeout)
    }

    /// Number of pooled connections to open.
    pub fn effective_pool_size(&self) -> usize {
        self.pool_size.max(self.min_idle_conns).max(1)
    }
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BACKEND` - `redis` (default) or `memory`
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `SERVER_PORT` - Admin HTTP port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Memory store purge interval in seconds (default: 1)
    /// - `REDIS_HOST`, `REDIS_PORT`, `REDIS_DB`, `REDIS_POOL_SIZE`,
    ///   `REDIS_MIN_IDLE_CONNS`, `REDIS_MAX_CONN_AGE`, `REDIS_IDLE_TIMEOUT`,
    ///   `REDIS_SENTINEL_ENABLED` - required for the redis backend
    /// - `REDIS_USERNAME`, `REDIS_PASSWORD` - optional credentials
    /// - `REDIS_DIAL_TIMEOUT`, `REDIS_READ_TIMEOUT`, `REDIS_WRITE_TIMEOUT` -
    ///   seconds (defaults: 5, 3, 3)
    /// - `REDIS_SENTINEL_MASTER`, `REDIS_SENTINEL_ADDRESSES` - required when
    ///   sentinel is enabled
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup: &lookup };

        let backend = match vars.optional("CACHE_BACKEND").as_deref() {
            None | Some("redis") => BackendConfig::Redis(StoreConfig::from_vars(&vars)?),
            Some("memory") => BackendConfig::Memory {
                cleanup_interval: Duration::from_secs(
                    vars.parse_or("CLEANUP_INTERVAL", DEFAULT_CLEANUP_INTERVAL_SECS)?,
                ),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "CACHE_BACKEND",
                    value: other.to_string(),
                    reason: "expected redis or memory".to_string(),
                })
            }
        };

        Ok(Self {
            backend,
            default_ttl: Duration::from_secs(vars.parse_or("CACHE_DEFAULT_TTL", DEFAULT_TTL_SECS)?),
            server_port: vars.parse_or("SERVER_PORT", DEFAULT_SERVER_PORT)?,
        })
    }
}

impl StoreConfig {
    fn from_vars(vars: &Vars<'_>) -> Result<Self, ConfigError> {
        let host = vars.required("REDIS_HOST")?;
        let sentinel_enabled: bool = vars.parse("REDIS_SENTINEL_ENABLED")?;

        let failover = if sentinel_enabled {
            let primary_name = vars
                .optional("REDIS_SENTINEL_MASTER")
                .ok_or(ConfigError::Missing("REDIS_SENTINEL_MASTER"))?;
            let raw = vars
                .optional("REDIS_SENTINEL_ADDRESSES")
                .ok_or(ConfigError::Missing("REDIS_SENTINEL_ADDRESSES"))?;
            let monitors = split_comma_separated(&raw)
                .into_iter()
                .map(|addr| parse_monitor_addr(&addr))
                .collect::<Result<Vec<_>, _>>()?;
            if monitors.is_empty() {
                return Err(ConfigError::Missing("REDIS_SENTINEL_ADDRESSES"));
            }
            Some(FailoverConfig {
                primary_name,
                monitors,
            })
        } else {
            None
        };

        Ok(Self {
            host,
            port: vars.parse("REDIS_PORT")?,
            username: vars.optional("REDIS_USERNAME"),
            password: vars.optional("REDIS_PASSWORD"),
            database: vars.parse("REDIS_DB")?,
            pool_size: vars.parse("REDIS_POOL_SIZE")?,
            min_idle_conns: vars.parse("REDIS_MIN_IDLE_CONNS")?,
            max_conn_age: Duration::from_secs(vars.parse("REDIS_MAX_CONN_AGE")?),
            idle_timeout: Duration::from_secs(vars.parse("REDIS_IDLE_TIMEOUT")?),
            dial_timeout: Duration::from_secs(
                vars.parse_or("REDIS_DIAL_TIMEOUT", DEFAULT_DIAL_TIMEOUT_SECS)?,
            ),
            read_timeout: Duration::from_secs(
                vars.parse_or("REDIS_READ_TIMEOUT", DEFAULT_READ_TIMEOUT_SECS)?,
            ),
            write_timeout: Duration::from_secs(
                vars.parse_or("REDIS_WRITE_TIMEOUT", DEFAULT_WRITE_TIMEOUT_SECS)?,
            ),
            failover,
        })
    }
}

// == Variable Access ==
struct Vars<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl Vars<'_> {
    /// Returns the variable, treating empty values as unset.
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn parse<T>(&self, name: &'static str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.required(name)?;
        parse_value(name, &raw)
    }

    fn parse_or<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            Some(raw) => parse_value(name, &raw),
            None => Ok(default),
        }
    }
}

fn parse_value<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Splits a comma-separated list, dropping spaces and empty items.
pub fn split_comma_separated(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|item| item.chars().filter(|c| *c != ' ').collect::<String>())
        .filter(|item| !item.is_empty())
        .collect()
}

fn parse_monitor_addr(addr: &str) -> Result<MonitorAddr, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        name: "REDIS_SENTINEL_ADDRESSES",
        value: addr.to_string(),
        reason: reason.to_string(),
    };

    let (host, port) = addr.rsplit_once(':').ok_or_else(|| invalid("expected host:port"))?;
    if host.is_empty() {
        return Err(invalid("missing host"));
    }
    let port = port.parse().map_err(|_| invalid("invalid port"))?;

    Ok(MonitorAddr {
        host: host.to_string(),
        port,
    })
}
