//! API Handlers
//!
//! HTTP handlers for the cache admin endpoints.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::cache::CacheService;
use crate::error::{CacheError, Result};
use crate::models::{HealthResponse, InvalidateResponse, KeyResponse, SetTtlRequest, TtlResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache service over the process-wide store
    pub cache: CacheService,
}

impl AppState {
    /// Creates a new AppState around the given cache service.
    pub fn new(cache: CacheService) -> Self {
        Self { cache }
    }
}

/// Handler for GET /health
///
/// Runs the store health probe; 503 when it fails.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse::new(state.cache.is_healthy().await);
    let status = if response.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Handler for GET /ttl/:key
pub async fn get_ttl_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<TtlResponse>> {
    let ttl = state.cache.get_ttl(&key).await?;

    Ok(Json(TtlResponse::new(key, ttl.as_secs())))
}

/// Handler for PUT /ttl/:key
pub async fn set_ttl_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetTtlRequest>,
) -> Result<Json<KeyResponse>> {
    state
        .cache
        .set_ttl(&key, Duration::from_secs(req.ttl))
        .await?;

    Ok(Json(KeyResponse::new(key, "updated")))
}

/// Handler for DELETE /keys/:key
pub async fn invalidate_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<KeyResponse>> {
    state.cache.invalidate_by_key(&key).await?;

    Ok(Json(KeyResponse::new(key, "invalidated")))
}

/// Handler for DELETE /prefix/:prefix
pub async fn invalidate_prefix_handler(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    if prefix.trim().is_empty() {
        return Err(CacheError::InvalidRequest(
            "Prefix cannot be empty".to_string(),
        ));
    }

    let deleted = state.cache.invalidate_by_prefix(&prefix).await?;

    Ok(Json(InvalidateResponse::new(prefix, Some(deleted))))
}

/// Handler for DELETE /blockchain/:data_type
///
/// Invalidates the whole sub-namespace of the data type.
pub async fn invalidate_blockchain_type_handler(
    State(state): State<AppState>,
    Path(data_type): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    state
        .cache
        .invalidate_blockchain_cache(&data_type, "")
        .await?;

    Ok(Json(InvalidateResponse::new(
        crate::cache::blockchain_prefix(&data_type),
        None,
    )))
}

/// Handler for DELETE /blockchain/:data_type/:identifier
pub async fn invalidate_blockchain_entry_handler(
    State(state): State<AppState>,
    Path((data_type, identifier)): Path<(String, String)>,
) -> Result<Json<InvalidateResponse>> {
    state
        .cache
        .invalidate_blockchain_cache(&data_type, &identifier)
        .await?;

    Ok(Json(InvalidateResponse::new(
        crate::cache::blockchain_key(&data_type, &identifier),
        None,
    )))
}
