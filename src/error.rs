//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the store client and the cache service.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Initial connect or liveness probe failed
    #[error("failed to connect to store: {0}")]
    Connection(String),

    /// Health probe failed before an operation; no store call was made
    #[error("cache store is not reachable or unhealthy")]
    Unavailable,

    /// Key is absent from the store
    #[error("key not found: {0}")]
    NotFound(String),

    /// Key has no expiration or does not exist
    #[error("key {0} does not exist or has no TTL")]
    NoExpiry(String),

    /// Encoding or decoding of a cached value failed
    #[error("failed to {op} cached value for key {key}: {source}")]
    Serialization {
        op: &'static str,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Any other transport or protocol failure
    #[error("store {op} failed for key {key}: {message}")]
    Store {
        op: &'static str,
        key: String,
        message: String,
    },

    /// The connection was closed or its lifecycle cancelled
    #[error("store connection has been closed")]
    Closed,

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CacheError {
    /// Builds a [`CacheError::Store`] from any transport error.
    pub fn store(op: &'static str, key: impl Into<String>, err: impl Display) -> Self {
        CacheError::Store {
            op,
            key: key.into(),
            message: err.to_string(),
        }
    }

    /// True when the error means "the key is not cached".
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound(_))
    }

    /// True when the error came from a failed health probe.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CacheError::Unavailable)
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) | CacheError::NoExpiry(_) => StatusCode::NOT_FOUND,
            CacheError::Unavailable | CacheError::Connection(_) | CacheError::Closed => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Store { .. } => StatusCode::BAD_GATEWAY,
            CacheError::Serialization { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
