//! Cache Service Module
//!
//! Turns domain-shaped cache requests into store calls: derives the key,
//! encodes the value as JSON and applies TTL defaults.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::keys;
use crate::error::{CacheError, Result};
use crate::store::KeyValueStore;

// == Cache Service ==
/// Caches API responses and blockchain data on top of a [`KeyValueStore`].
///
/// The service keeps no state beyond the shared store handle, so a single
/// instance can be used from any number of tasks. Every operation first
/// runs the store's health probe and fails with
/// [`CacheError::Unavailable`] without touching the store otherwise.
/// Nothing is retried.
#[derive(Clone)]
pub struct CacheService {
    store: Arc<dyn KeyValueStore>,
    default_ttl: Duration,
}

impl CacheService {
    // == Constructor ==
    /// Creates a service over `store`. The store's lifecycle stays with the
    /// caller that created it.
    pub fn new(store: Arc<dyn KeyValueStore>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    /// TTL used when callers pass `Duration::ZERO`.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Runs the store health probe.
    pub async fn is_healthy(&self) -> bool {
        self.store.is_healthy().await
    }

    async fn ensure_available(&self) -> Result<()> {
        if self.store.is_healthy().await {
            Ok(())
        } else {
            Err(CacheError::Unavailable)
        }
    }

    fn resolve_ttl(&self, ttl: Duration) -> Duration {
        if ttl.is_zero() {
            self.default_ttl
        } else {
            ttl
        }
    }

    async fn store_value<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<Duration>
    where
        T: Serialize + ?Sized,
    {
        let encoded = serde_json::to_string(value).map_err(|source| CacheError::Serialization {
            op: "encode",
            key: key.to_string(),
            source,
        })?;

        let ttl = self.resolve_ttl(ttl);
        self.store.set_with_expiry(key, &encoded, ttl).await?;
        Ok(ttl)
    }

    async fn load_value<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let raw = self.store.get(key).await?;

        serde_json::from_str(&raw).map_err(|source| CacheError::Serialization {
            op: "decode",
            key: key.to_string(),
            source,
        })
    }

    // == API Responses ==
    /// Caches an API response under the key derived from `endpoint` and
    /// `query_params`. A zero `ttl` uses the default TTL.
    pub async fn cache_api_response<T>(
        &self,
        endpoint: &str,
        query_params: &HashMap<String, String>,
        response: &T,
        ttl: Duration,
    ) -> Result<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        self.ensure_available().await?;

        let key = keys::api_response_key(endpoint, query_params);
        let ttl = self.store_value(&key, response, ttl).await?;

        debug!(key = %key, ttl_secs = ttl.as_secs(), "cached api response");
        Ok(())
    }

    /// Reads a cached API response.
    ///
    /// A miss is returned as [`CacheError::NotFound`]; use
    /// [`CacheError::is_not_found`] to tell it apart from store failures.
    pub async fn get_cached_api_response<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query_params: &HashMap<String, String>,
    ) -> Result<T> {
        self.ensure_available().await?;

        let key = keys::api_response_key(endpoint, query_params);
        let response = self.load_value(&key).await?;

        debug!(key = %key, "api response cache hit");
        Ok(response)
    }

    // == Blockchain Data ==
    /// Caches blockchain data such as account info, transactions or blocks.
    /// A zero `ttl` uses the default TTL.
    pub async fn cache_blockchain_data<T>(
        &self,
        data_type: &str,
        identifier: &str,
        data: &T,
        ttl: Duration,
    ) -> Result<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        self.ensure_available().await?;

        let key = keys::blockchain_key(data_type, identifier);
        let ttl = self.store_value(&key, data, ttl).await?;

        debug!(key = %key, ttl_secs = ttl.as_secs(), "cached blockchain data");
        Ok(())
    }

    /// Reads cached blockchain data; a miss is [`CacheError::NotFound`].
    pub async fn get_cached_blockchain_data<T: DeserializeOwned>(
        &self,
        data_type: &str,
        identifier: &str,
    ) -> Result<T> {
        self.ensure_available().await?;

        let key = keys::blockchain_key(data_type, identifier);
        let data = self.load_value(&key).await?;

        debug!(key = %key, "blockchain data cache hit");
        Ok(data)
    }

    // == Invalidation ==
    /// Deletes every key starting with `prefix` and returns how many were
    /// removed.
    ///
    /// Best effort: keys written while the scan runs may survive, and a key
    /// that fails to delete is logged and skipped. Only a failure of the
    /// enumeration itself is returned as an error.
    pub async fn invalidate_by_prefix(&self, prefix: &str) -> Result<usize> {
        self.ensure_available().await?;

        let mut scan = self.store.scan_by_prefix(prefix);
        let mut deleted = 0;

        while let Some(key) = scan.next_key().await? {
            match self.store.delete(&key).await {
                Ok(()) => deleted += 1,
                Err(e) => warn!(key = %key, error = %e, "failed to delete key during invalidation"),
            }
        }

        info!(prefix = %prefix, deleted, "invalidated cache entries by prefix");
        Ok(deleted)
    }

    /// Deletes a single key.
    pub async fn invalidate_by_key(&self, key: &str) -> Result<()> {
        self.ensure_available().await?;

        self.store.delete(key).await?;

        debug!(key = %key, "invalidated cache entry");
        Ok(())
    }

    /// Invalidates one blockchain entry, or the whole sub-namespace of
    /// `data_type` when `identifier` is empty.
    pub async fn invalidate_blockchain_cache(
        &self,
        data_type: &str,
        identifier: &str,
    ) -> Result<()> {
        if identifier.is_empty() {
            self.invalidate_by_prefix(keys::blockchain_prefix(data_type))
                .await
                .map(|_| ())
        } else {
            self.invalidate_by_key(&keys::blockchain_key(data_type, identifier))
                .await
        }
    }

    // == TTL Management ==
    /// Replaces the expiration of an existing entry without touching its
    /// value. Fails with [`CacheError::NotFound`] if the key is absent.
    pub async fn set_ttl(&self, key: &str, ttl: Duration) -> Result<()> {
        self.ensure_available().await?;

        self.store.get(key).await?;
        self.store.expire(key, ttl).await?;

        debug!(key = %key, ttl_secs = ttl.as_secs(), "updated cache entry TTL");
        Ok(())
    }

    /// Remaining time to live of an entry.
    ///
    /// Fails with [`CacheError::NoExpiry`] when the key is absent or has no
    /// expiration.
    pub async fn get_ttl(&self, key: &str) -> Result<Duration> {
        self.ensure_available().await?;

        let ttl = self.store.ttl(key).await?;

        debug!(key = %key, ttl_secs = ttl.as_secs(), "read cache entry TTL");
        Ok(ttl)
    }
}
