//! In-Process Store Module
//!
//! An ordered in-memory map with lazy TTL expiry, used for local runs and
//! tests in place of a Redis server.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{KeyValueStore, ScanPage, StoredValue};
use crate::error::{CacheError, Result};

// == Memory Store ==
/// Key-value storage with TTL support behind [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Values ordered by key, so scans can resume after the last key seen
    entries: RwLock<BTreeMap<String, StoredValue>>,
    /// Set once [`KeyValueStore::close`] has run
    closed: AtomicBool,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(CacheError::Closed)
        } else {
            Ok(())
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired values.
    ///
    /// Returns the number of values removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, stored| !stored.is_expired());
        before - entries.len()
    }

    // == Length ==
    /// Returns the number of stored values, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        self.ensure_open()
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.ensure_open()?;
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), StoredValue::new(value.to_string(), ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<String> {
        self.ensure_open()?;
        let mut entries = self.entries.write().await;

        match entries.get(key) {
            Some(stored) if stored.is_expired() => {
                entries.remove(key);
                debug!(key = %key, "dropped expired value on read");
                Err(CacheError::NotFound(key.to_string()))
            }
            Some(stored) => Ok(stored.value.clone()),
            None => Err(CacheError::NotFound(key.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.ensure_open()?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        self.ensure_open()?;
        let mut entries = self.entries.write().await;

        match entries.get_mut(key) {
            Some(stored) if !stored.is_expired() => {
                stored.set_ttl(ttl);
                Ok(())
            }
            _ => Err(CacheError::NotFound(key.to_string())),
        }
    }

    async fn ttl(&self, key: &str) -> Result<Duration> {
        self.ensure_open()?;
        let entries = self.entries.read().await;

        entries
            .get(key)
            .filter(|stored| !stored.is_expired())
            .and_then(StoredValue::ttl_remaining)
            .ok_or_else(|| CacheError::NoExpiry(key.to_string()))
    }

    async fn scan_page(
        &self,
        prefix: &str,
        cursor: Option<String>,
        count: usize,
    ) -> Result<ScanPage> {
        self.ensure_open()?;
        let entries = self.entries.read().await;

        let start = match cursor {
            Some(last) => Bound::Excluded(last),
            None => Bound::Included(prefix.to_string()),
        };
        let mut matching = entries
            .range::<String, _>((start, Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .filter(|(_, stored)| !stored.is_expired())
            .map(|(key, _)| key);

        let keys: Vec<String> = matching.by_ref().take(count.max(1)).cloned().collect();
        let cursor = match (matching.next(), keys.last()) {
            (Some(_), Some(last)) => Some(last.clone()),
            _ => None,
        };

        Ok(ScanPage { cursor, keys })
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("in-process store closed");
        }
    }
}
