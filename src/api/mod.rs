//! API Module
//!
//! HTTP handlers and routing for the cache admin API.
//!
//! # Endpoints
//! - `GET /health` - Store health probe
//! - `GET|PUT /ttl/:key` - Read or replace a key's TTL
//! - `DELETE /keys/:key` - Invalidate a key
//! - `DELETE /prefix/:prefix` - Invalidate a namespace
//! - `DELETE /blockchain/:data_type[/:identifier]` - Invalidate blockchain data

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
