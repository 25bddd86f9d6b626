//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for PUT /ttl/:key
///
/// # Fields
/// - `ttl`: New TTL in seconds; 0 removes the expiration
#[derive(Debug, Clone, Deserialize)]
pub struct SetTtlRequest {
    /// TTL in seconds
    pub ttl: u64,
}
