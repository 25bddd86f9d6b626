//! Store Client Module
//!
//! A minimal transport to the key-value store, independent of what is
//! being cached. Both the Redis pool (direct or sentinel) and the
//! in-process store sit behind [`KeyValueStore`], so the cache service
//! never branches on which one is active.

mod entry;
mod memory;
mod redis;
mod scan;

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::config::StoreConfig;
use crate::error::Result;

pub use entry::StoredValue;
pub use memory::MemoryStore;
pub use redis::{match_pattern, RedisStore};
pub use scan::KeyScan;

// == Public Constants ==
/// Number of keys requested per scan page
pub const SCAN_PAGE_SIZE: usize = 100;

/// One page of a cursor-driven key enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next page, `None` once the enumeration is complete
    pub cursor: Option<String>,
    /// Keys returned by this page
    pub keys: Vec<String>,
}

// == Key-Value Store Trait ==
/// Capability set the cache service needs from a store.
///
/// A zero TTL always means "no expiration".
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Liveness probe.
    async fn ping(&self) -> Result<()>;

    /// Runs [`KeyValueStore::ping`], logging and swallowing any failure.
    async fn is_healthy(&self) -> bool {
        match self.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "store health check failed");
                false
            }
        }
    }

    /// Writes `value` under `key`, replacing any previous value and TTL.
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Reads the raw value; `NotFound` when the key is absent.
    async fn get(&self, key: &str) -> Result<String>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Replaces the expiration of an existing key; `NotFound` when absent.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<()>;

    /// Remaining time to live; `NoExpiry` when absent or persistent.
    async fn ttl(&self, key: &str) -> Result<Duration>;

    /// Fetches one page of keys starting with `prefix`.
    ///
    /// Pass `None` to start a new enumeration and the returned cursor to
    /// continue it.
    async fn scan_page(
        &self,
        prefix: &str,
        cursor: Option<String>,
        count: usize,
    ) -> Result<ScanPage>;

    /// Releases pooled connections and cancels in-flight work. Idempotent.
    async fn close(&self);
}

impl dyn KeyValueStore {
    /// Lazily enumerates every key starting with `prefix`.
    ///
    /// Pages are fetched on demand, but each yielded key is kept in
    /// memory for deduplication until the [`KeyScan`] is dropped.
    pub fn scan_by_prefix(&self, prefix: &str) -> KeyScan<'_> {
        KeyScan::new(self, prefix, SCAN_PAGE_SIZE)
    }
}

// == Connect ==
/// Builds a direct or sentinel-backed Redis store depending on `config`.
pub async fn connect(config: &StoreConfig) -> Result<RedisStore> {
    RedisStore::connect(config).await
}
