//! Cache Module
//!
//! Cache key derivation and the cache service built on the store client.

pub mod keys;
mod service;


// Re-export public types
pub use keys::{
    api_response_key, blockchain_key, blockchain_prefix, fnv1a_64, generate_cache_key,
    ACCOUNT_PREFIX, API_PREFIX, BLOCKCHAIN_PREFIX, TRANSACTION_PREFIX,
};
pub use service::CacheService;
