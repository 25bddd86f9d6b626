//! Cache Key Module
//!
//! Deterministic key derivation: `prefix + fnv1a64(joined) + ":" + joined`,
//! where `joined` is the input fields separated by `:`.

use std::collections::HashMap;

// == Namespace Prefixes ==
/// Prefix for cached API responses
pub const API_PREFIX: &str = "api:";
/// Prefix for blockchain data without a more specific type
pub const BLOCKCHAIN_PREFIX: &str = "blockchain:";
/// Prefix for cached transactions
pub const TRANSACTION_PREFIX: &str = "blockchain:tx:";
/// Prefix for cached accounts
pub const ACCOUNT_PREFIX: &str = "blockchain:account:";

/// Separator between key fields
pub const FIELD_DELIMITER: &str = ":";

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a hash.
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Builds a key from a namespace prefix and ordered input fields.
pub fn generate_cache_key<S: AsRef<str>>(prefix: &str, fields: &[S]) -> String {
    let joined = fields
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(FIELD_DELIMITER);
    let fingerprint = fnv1a_64(joined.as_bytes());

    format!("{prefix}{fingerprint}{FIELD_DELIMITER}{joined}")
}

/// Key for an API response.
///
/// Query parameters are rendered as `k=v` and sorted by name (then value)
/// so the key does not depend on map iteration order.
pub fn api_response_key(endpoint: &str, query_params: &HashMap<String, String>) -> String {
    let mut params: Vec<(&String, &String)> = query_params.iter().collect();
    params.sort();

    let mut fields = Vec::with_capacity(params.len() + 1);
    fields.push(endpoint.to_string());
    fields.extend(params.into_iter().map(|(k, v)| format!("{k}={v}")));

    generate_cache_key(API_PREFIX, &fields)
}

/// Namespace prefix for a blockchain data type.
///
/// `"transaction"` and `"account"` have their own sub-namespaces; any other
/// type shares the bare blockchain prefix.
pub fn blockchain_prefix(data_type: &str) -> &'static str {
    match data_type {
        "transaction" => TRANSACTION_PREFIX,
        "account" => ACCOUNT_PREFIX,
        _ => BLOCKCHAIN_PREFIX,
    }
}

/// Key for a piece of blockchain data.
pub fn blockchain_key(data_type: &str, identifier: &str) -> String {
    generate_cache_key(blockchain_prefix(data_type), &[identifier])
}
