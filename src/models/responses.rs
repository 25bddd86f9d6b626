//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

/// Response body for GET /ttl/:key
#[derive(Debug, Clone, Serialize)]
pub struct TtlResponse {
    /// The requested key
    pub key: String,
    /// Remaining time to live in whole seconds
    pub ttl_seconds: u64,
}

impl TtlResponse {
    /// Creates a new TtlResponse
    pub fn new(key: impl Into<String>, ttl_seconds: u64) -> Self {
        Self {
            key: key.into(),
            ttl_seconds,
        }
    }
}

/// Response body for single-key operations (PUT /ttl/:key, DELETE /keys/:key)
#[derive(Debug, Clone, Serialize)]
pub struct KeyResponse {
    /// Success message
    pub message: String,
    /// The key that was affected
    pub key: String,
}

impl KeyResponse {
    /// Creates a new KeyResponse with the given action verb
    pub fn new(key: impl Into<String>, action: &str) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' {} successfully", key, action),
            key,
        }
    }
}

/// Response body for bulk invalidation (DELETE /prefix/:prefix, DELETE /blockchain/...)
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Prefix or key that was invalidated
    pub target: String,
    /// Number of deleted entries, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<usize>,
}

impl InvalidateResponse {
    /// Creates a new InvalidateResponse
    pub fn new(target: impl Into<String>, deleted: Option<usize>) -> Self {
        Self {
            target: target.into(),
            deleted,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status ("healthy" or "unhealthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn new(healthy: bool) -> Self {
        Self {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
