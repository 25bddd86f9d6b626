//! Integration Tests for the Admin API
//!
//! Drives the full request/response cycle of each endpoint against a
//! cache service backed by the in-process store.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chain_cache::cache::{api_response_key, blockchain_key};
use chain_cache::{api::create_router, AppState, CacheService, KeyValueStore, MemoryStore};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> (Arc<MemoryStore>, CacheService, Router) {
    let store = Arc::new(MemoryStore::new());
    let cache = CacheService::new(store.clone(), Duration::from_secs(300));
    let router = create_router(AppState::new(cache.clone()));
    (store, cache, router)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let (_, _, app) = create_test_app();

    let response = app.oneshot(request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_endpoint_after_close() {
    let (store, _, app) = create_test_app();
    store.close().await;

    let response = app.oneshot(request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "unhealthy");
}

// == TTL Endpoint Tests ==

#[tokio::test]
async fn test_get_ttl_endpoint() {
    let (_, cache, app) = create_test_app();
    cache
        .cache_blockchain_data("block", "100", &"payload", Duration::from_secs(120))
        .await
        .unwrap();
    let key = blockchain_key("block", "100");

    let response = app
        .oneshot(request("GET", &format!("/ttl/{key}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], key.as_str());
    let ttl = json["ttl_seconds"].as_u64().unwrap();
    assert!(ttl > 100 && ttl <= 120);
}

#[tokio::test]
async fn test_get_ttl_endpoint_persistent_key() {
    let (store, _, app) = create_test_app();
    store
        .set_with_expiry("api:pinned", "{}", Duration::ZERO)
        .await
        .unwrap();

    let response = app.oneshot(request("GET", "/ttl/api:pinned")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("api:pinned"));
}

#[tokio::test]
async fn test_set_ttl_endpoint() {
    let (_, cache, app) = create_test_app();
    cache
        .cache_blockchain_data("account", "0xabc", &"balance", Duration::from_secs(30))
        .await
        .unwrap();
    let key = blockchain_key("account", "0xabc");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/ttl/{key}"))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"ttl":3600}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains(&key));

    let ttl = cache.get_ttl(&key).await.unwrap();
    assert!(ttl > Duration::from_secs(3590));
}

#[tokio::test]
async fn test_set_ttl_endpoint_rejects_bad_body() {
    let (_, _, app) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/ttl/api:any")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"ttl":"soon"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// == Invalidation Endpoint Tests ==

#[tokio::test]
async fn test_invalidate_key_endpoint() {
    let (_, cache, app) = create_test_app();
    let params: HashMap<String, String> = HashMap::new();
    cache
        .cache_api_response("/v1/status", &params, &"ok", Duration::ZERO)
        .await
        .unwrap();
    let key = api_response_key("/v1/status", &params);

    let response = app
        .oneshot(request("DELETE", &format!("/keys/{}", key.replace('/', "%2F"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(cache
        .get_cached_api_response::<String>("/v1/status", &params)
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_invalidate_prefix_endpoint() {
    let (_, cache, app) = create_test_app();
    for id in ["0x1", "0x2", "0x3"] {
        cache
            .cache_blockchain_data("transaction", id, &id, Duration::ZERO)
            .await
            .unwrap();
    }
    cache
        .cache_blockchain_data("account", "0x1", &"kept", Duration::ZERO)
        .await
        .unwrap();

    let response = app
        .oneshot(request("DELETE", "/prefix/blockchain:tx:"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["target"], "blockchain:tx:");
    assert_eq!(json["deleted"], 3);

    let kept: String = cache
        .get_cached_blockchain_data("account", "0x1")
        .await
        .unwrap();
    assert_eq!(kept, "kept");
}

#[tokio::test]
async fn test_invalidate_prefix_endpoint_rejects_blank() {
    let (_, _, app) = create_test_app();

    let response = app.oneshot(request("DELETE", "/prefix/%20")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("Prefix"));
}

#[tokio::test]
async fn test_invalidate_blockchain_entry_endpoint() {
    let (_, cache, app) = create_test_app();
    for id in ["0xabc", "0xdef"] {
        cache
            .cache_blockchain_data("account", id, &id, Duration::ZERO)
            .await
            .unwrap();
    }

    let response = app
        .oneshot(request("DELETE", "/blockchain/account/0xabc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["target"], blockchain_key("account", "0xabc").as_str());

    assert!(cache
        .get_cached_blockchain_data::<String>("account", "0xabc")
        .await
        .unwrap_err()
        .is_not_found());
    let other: String = cache
        .get_cached_blockchain_data("account", "0xdef")
        .await
        .unwrap();
    assert_eq!(other, "0xdef");
}

#[tokio::test]
async fn test_invalidate_blockchain_type_endpoint() {
    let (store, cache, app) = create_test_app();
    for id in ["0xabc", "0xdef"] {
        cache
            .cache_blockchain_data("account", id, &id, Duration::ZERO)
            .await
            .unwrap();
    }
    cache
        .cache_blockchain_data("block", "7", &7u64, Duration::ZERO)
        .await
        .unwrap();

    let response = app
        .oneshot(request("DELETE", "/blockchain/account"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["target"], "blockchain:account:");
    assert_eq!(store.len().await, 1);
}

// == Availability Tests ==

#[tokio::test]
async fn test_endpoints_return_503_when_store_closed() {
    let (store, _, app) = create_test_app();
    store.close().await;

    for (method, uri) in [
        ("GET", "/ttl/api:any"),
        ("DELETE", "/keys/api:any"),
        ("DELETE", "/prefix/api:"),
        ("DELETE", "/blockchain/account"),
        ("DELETE", "/blockchain/account/0xabc"),
    ] {
        let response = app.clone().oneshot(request(method, uri)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::SERVICE_UNAVAILABLE,
            "{method} {uri}"
        );
    }
}

#[tokio::test]
async fn test_unknown_route() {
    let (_, _, app) = create_test_app();

    let response = app.oneshot(request("GET", "/stats")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
