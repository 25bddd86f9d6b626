//! API Routes
//!
//! Configures the Axum router with all admin endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    get_ttl_handler, health_handler, invalidate_blockchain_entry_handler,
    invalidate_blockchain_type_handler, invalidate_key_handler, invalidate_prefix_handler,
    set_ttl_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Store health probe
/// - `GET /ttl/:key` - Remaining TTL of a key
/// - `PUT /ttl/:key` - Replace the TTL of a key
/// - `DELETE /keys/:key` - Invalidate a key
/// - `DELETE /prefix/:prefix` - Invalidate every key under a prefix
/// - `DELETE /blockchain/:data_type[/:identifier]` - Invalidate blockchain data
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/ttl/:key", get(get_ttl_handler).put(set_ttl_handler))
        .route("/keys/:key", delete(invalidate_key_handler))
        .route("/prefix/:prefix", delete(invalidate_prefix_handler))
        .route(
            "/blockchain/:data_type",
            delete(invalidate_blockchain_type_handler),
        )
        .route(
            "/blockchain/:data_type/:identifier",
            delete(invalidate_blockchain_entry_handler),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
