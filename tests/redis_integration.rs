//! Integration tests against a live Redis server.
//!
//! All tests are `#[ignore]`; run them with:
//!   cargo test --test redis_integration -- --ignored
//!
//! Environment variables:
//!   REDIS_HOST - Redis host (default: 127.0.0.1)
//!   REDIS_PORT - Redis port (default: 6379)

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chain_cache::config::StoreConfig;
use chain_cache::store::{self, KeyValueStore, RedisStore};
use chain_cache::{CacheError, CacheService};

fn store_config() -> StoreConfig {
    let host = std::env::var("REDIS_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("REDIS_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(6379);
    let mut config = StoreConfig::direct(host, port);
    config.database = 15; // dedicated DB for tests
    config.pool_size = 4;
    config
}

async fn connect() -> Arc<RedisStore> {
    Arc::new(
        store::connect(&store_config())
            .await
            .expect("redis should be reachable"),
    )
}

/// Every test works under its own prefix so runs can overlap.
fn unique(tag: &str) -> String {
    format!(
        "itest:{}:{}:",
        tag,
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

#[tokio::test]
#[ignore]
async fn test_ping_and_health() {
    let store = connect().await;
    store.ping().await.unwrap();
    assert!(store.is_healthy().await);
    store.close().await;
}

#[tokio::test]
#[ignore]
async fn test_set_get_delete() {
    let store = connect().await;
    let key = format!("{}k", unique("crud"));

    store
        .set_with_expiry(&key, r#"{"n":1}"#, Duration::from_secs(30))
        .await
        .unwrap();
    assert_eq!(store.get(&key).await.unwrap(), r#"{"n":1}"#);

    store.delete(&key).await.unwrap();
    assert!(store.get(&key).await.unwrap_err().is_not_found());

    // deleting an absent key is not an error
    store.delete(&key).await.unwrap();
    store.close().await;
}

#[tokio::test]
#[ignore]
async fn test_ttl_and_expire() {
    let store = connect().await;
    let key = format!("{}k", unique("ttl"));

    store
        .set_with_expiry(&key, "v", Duration::from_secs(60))
        .await
        .unwrap();
    let ttl = store.ttl(&key).await.unwrap();
    assert!(ttl > Duration::from_secs(55) && ttl <= Duration::from_secs(60));

    store.expire(&key, Duration::from_secs(600)).await.unwrap();
    assert!(store.ttl(&key).await.unwrap() > Duration::from_secs(590));

    store.expire(&key, Duration::ZERO).await.unwrap();
    assert!(matches!(
        store.ttl(&key).await.unwrap_err(),
        CacheError::NoExpiry(_)
    ));

    store.delete(&key).await.unwrap();
    store.close().await;
}

#[tokio::test]
#[ignore]
async fn test_scan_by_prefix_with_glob_characters() {
    let store = connect().await;
    let prefix = format!("{}[a*]?", unique("scan"));
    let decoy = format!("{}ax?", unique("scan"));

    for i in 0..150 {
        store
            .set_with_expiry(&format!("{prefix}{i}"), "v", Duration::from_secs(60))
            .await
            .unwrap();
    }
    store
        .set_with_expiry(&decoy, "v", Duration::from_secs(60))
        .await
        .unwrap();

    let dyn_store: &dyn KeyValueStore = &*store;
    let keys = dyn_store.scan_by_prefix(&prefix).collect_keys().await.unwrap();
    assert_eq!(keys.len(), 150);
    assert!(keys.iter().all(|k| k.starts_with(&prefix)));

    for key in keys {
        store.delete(&key).await.unwrap();
    }
    store.delete(&decoy).await.unwrap();
    store.close().await;
}

#[tokio::test]
#[ignore]
async fn test_cache_service_over_redis() {
    let store = connect().await;
    let service = CacheService::new(store.clone(), Duration::from_secs(120));
    let mut params = HashMap::new();
    params.insert("address".to_string(), unique("svc"));

    service
        .cache_api_response("/v1/balance", &params, &42u64, Duration::ZERO)
        .await
        .unwrap();
    let cached: u64 = service
        .get_cached_api_response("/v1/balance", &params)
        .await
        .unwrap();
    assert_eq!(cached, 42);

    let key = chain_cache::cache::api_response_key("/v1/balance", &params);
    assert!(service.get_ttl(&key).await.unwrap() <= Duration::from_secs(120));

    service.invalidate_by_key(&key).await.unwrap();
    assert!(service
        .get_cached_api_response::<u64>("/v1/balance", &params)
        .await
        .unwrap_err()
        .is_not_found());

    store.close().await;
    assert!(service
        .get_ttl(&key)
        .await
        .unwrap_err()
        .is_unavailable());
}
