//! Redis Store Module
//!
//! Wrapper around a fred connection pool, either pointed at a single
//! server or resolving the primary through a sentinel quorum.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fred::cmd;
use fred::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{KeyValueStore, ScanPage};
use crate::config::StoreConfig;
use crate::error::{CacheError, Result};

/// Cursor value that starts and ends a Redis `SCAN`
const SCAN_START: &str = "0";

/// Pooled Redis client behind [`KeyValueStore`].
///
/// Failover is handled by fred: in sentinel mode a reconnect re-resolves
/// the primary, so a promoted replica is picked up without callers
/// noticing.
pub struct RedisStore {
    pool: Pool,
    shutdown: CancellationToken,
    closed: AtomicBool,
}

impl RedisStore {
    /// Connects and probes the server with `PING`.
    ///
    /// Fails with [`CacheError::Connection`] if the pool cannot be brought
    /// up and answer within the dial timeout.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let pool = build_pool(config)?;

        let probe = async {
            pool.init().await?;
            pool.next().ping::<()>(None).await
        };
        match tokio::time::timeout(config.dial_timeout, probe).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                abandon(&pool, config.dial_timeout).await;
                return Err(CacheError::Connection(e.to_string()));
            }
            Err(_) => {
                abandon(&pool, config.dial_timeout).await;
                return Err(CacheError::Connection(format!(
                    "no response within {:?}",
                    config.dial_timeout
                )));
            }
        }

        match &config.failover {
            Some(failover) => info!(
                primary = %failover.primary_name,
                monitors = failover.monitors.len(),
                pool_size = pool.size(),
                "connected to redis through sentinel"
            ),
            None => info!(
                host = %config.host,
                port = config.port,
                pool_size = pool.size(),
                "connected to redis"
            ),
        }

        Ok(Self {
            pool,
            shutdown: CancellationToken::new(),
            closed: AtomicBool::new(false),
        })
    }

    /// Runs a command unless the lifecycle has been cancelled, aborting it
    /// if cancellation happens while it is in flight.
    async fn run<T, F>(&self, op: &'static str, key: &str, command: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, Error>> + Send,
    {
        if self.shutdown.is_cancelled() {
            return Err(CacheError::Closed);
        }

        tokio::select! {
            _ = self.shutdown.cancelled() => Err(CacheError::Closed),
            result = command => result.map_err(|e| CacheError::store(op, key, e)),
        }
    }
}

/// Stops the reconnect loop of a pool that never came up.
async fn abandon(pool: &Pool, wait: Duration) {
    if tokio::time::timeout(wait, pool.quit()).await.is_err() {
        warn!("timed out shutting down unconnected redis pool");
    }
}

fn build_pool(config: &StoreConfig) -> Result<Pool> {
    let server = match &config.failover {
        Some(failover) => ServerConfig::new_sentinel(
            failover
                .monitors
                .iter()
                .map(|monitor| (monitor.host.as_str(), monitor.port))
                .collect(),
            failover.primary_name.clone(),
        ),
        None => ServerConfig::new_centralized(config.host.as_str(), config.port),
    };

    let redis_config = Config {
        server,
        username: config.username.clone(),
        password: config.password.clone(),
        database: Some(config.database),
        ..Default::default()
    };

    let dial_timeout = config.dial_timeout;
    let command_timeout = config.command_timeout();

    if !config.max_conn_age.is_zero() || !config.idle_timeout.is_zero() {
        debug!(
            max_conn_age_secs = config.max_conn_age.as_secs(),
            idle_timeout_secs = config.idle_timeout.as_secs(),
            "pooled connections are multiplexed and kept open; age and idle limits are advisory"
        );
    }

    Builder::from_config(redis_config)
        .with_connection_config(|connection| {
            connection.connection_timeout = dial_timeout;
        })
        .with_performance_config(|performance| {
            performance.default_command_timeout = command_timeout;
        })
        .set_policy(ReconnectPolicy::new_exponential(0, 100, 30_000, 2))
        .build_pool(config.effective_pool_size())
        .map_err(|e| CacheError::Connection(e.to_string()))
}

/// Builds the `SCAN MATCH` pattern for a literal prefix.
///
/// Glob metacharacters in the prefix are escaped so that only keys which
/// literally start with it are matched.
pub fn match_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

/// Translates a `TTL` reply. Negative replies (-1 persistent, -2 absent)
/// carry no duration.
fn ttl_from_reply(seconds: i64) -> Option<Duration> {
    u64::try_from(seconds).ok().map(Duration::from_secs)
}

fn expiration_for(ttl: Duration) -> Option<Expiration> {
    if ttl.is_zero() {
        None
    } else if ttl.subsec_nanos() == 0 {
        Some(Expiration::EX(clamp_i64(ttl.as_secs().into())))
    } else {
        Some(Expiration::PX(expiry_millis(ttl)))
    }
}

/// Millisecond expiry for `PX`/`PEXPIRE`. Non-zero TTLs under a
/// millisecond become 1ms, since Redis rejects an expiry of 0.
fn expiry_millis(ttl: Duration) -> i64 {
    clamp_i64(ttl.as_millis().max(1))
}

fn clamp_i64(value: u128) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn ping(&self) -> Result<()> {
        self.run("PING", "", self.pool.next().ping::<()>(None)).await
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.run(
            "SET",
            key,
            self.pool
                .set::<(), _, _>(key, value, expiration_for(ttl), None, false),
        )
        .await
    }

    async fn get(&self, key: &str) -> Result<String> {
        self.run("GET", key, self.pool.get::<Option<String>, _>(key))
            .await?
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.run("DEL", key, self.pool.del::<i64, _>(key)).await?;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let updated = if ttl.is_zero() {
            // PERSIST also answers 0 for a key that exists without a TTL
            let persisted = self.run("PERSIST", key, self.pool.persist::<bool, _>(key)).await?;
            persisted || self.run("EXISTS", key, self.pool.exists::<bool, _>(key)).await?
        } else {
            self.run(
                "PEXPIRE",
                key,
                self.pool.pexpire::<bool, _>(key, expiry_millis(ttl), None),
            )
            .await?
        };

        if updated {
            Ok(())
        } else {
            Err(CacheError::NotFound(key.to_string()))
        }
    }

    async fn ttl(&self, key: &str) -> Result<Duration> {
        let seconds = self.run("TTL", key, self.pool.ttl::<i64, _>(key)).await?;
        ttl_from_reply(seconds).ok_or_else(|| CacheError::NoExpiry(key.to_string()))
    }

    async fn scan_page(
        &self,
        prefix: &str,
        cursor: Option<String>,
        count: usize,
    ) -> Result<ScanPage> {
        let args = vec![
            cursor.unwrap_or_else(|| SCAN_START.to_string()),
            "MATCH".to_string(),
            match_pattern(prefix),
            "COUNT".to_string(),
            count.max(1).to_string(),
        ];

        let (next, keys): (String, Vec<String>) = self
            .run("SCAN", prefix, self.pool.next().custom(cmd!("SCAN"), args))
            .await?;

        Ok(ScanPage {
            cursor: (next != SCAN_START).then_some(next),
            keys,
        })
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        self.shutdown.cancel();
        if let Err(e) = self.pool.quit().await {
            warn!(error = %e, "error closing redis pool");
        }
        info!("redis store closed");
    }
}
