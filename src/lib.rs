//! Chain Cache - A Redis-backed cache layer for API responses and
//! blockchain data
//!
//! Derives deterministic cache keys, stores JSON-encoded values with TTLs
//! and supports targeted or prefix-wide invalidation.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::CacheService;
pub use config::Config;
pub use error::{CacheError, Result};
pub use store::{KeyValueStore, MemoryStore, RedisStore};
pub use tasks::spawn_cleanup_task;
