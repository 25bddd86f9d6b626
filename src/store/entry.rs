//! Stored Value Module
//!
//! A value held by the in-process store together with its expiry.

use std::time::Duration;

// == Stored Value ==
/// Represents a single stored value with optional expiration.
#[derive(Debug, Clone)]
pub struct StoredValue {
    /// The raw value
    pub value: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoredValue {
    // == Constructor ==
    /// Creates a new stored value. A zero `ttl` means no expiration.
    pub fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: expiry_from(current_timestamp_ms(), ttl),
        }
    }

    // == Is Expired ==
    /// Checks if the value has expired.
    ///
    /// A value is expired once the current time reaches its expiration
    /// timestamp.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    fn is_expired_at(&self, now: u64) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Expire ==
    /// Replaces the expiration; a zero `ttl` makes the value persistent.
    pub fn set_ttl(&mut self, ttl: Duration) {
        self.expires_at = expiry_from(current_timestamp_ms(), ttl);
    }

    // == Time To Live ==
    /// Returns the remaining TTL, or None if no expiration is set.
    ///
    /// Returns `Some(Duration::ZERO)` once the TTL has elapsed.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at.map(|expires| {
            let now = current_timestamp_ms();
            Duration::from_millis(expires.saturating_sub(now))
        })
    }
}

fn expiry_from(now: u64, ttl: Duration) -> Option<u64> {
    if ttl.is_zero() {
        None
    } else {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        Some(now.saturating_add(ttl_ms.max(1)))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_value_without_ttl() {
        let stored = StoredValue::new("payload".to_string(), Duration::ZERO);

        assert_eq!(stored.value, "payload");
        assert!(stored.expires_at.is_none());
        assert!(!stored.is_expired());
        assert!(stored.ttl_remaining().is_none());
    }

    #[test]
    fn test_value_with_ttl() {
        let stored = StoredValue::new("payload".to_string(), Duration::from_secs(10));

        assert!(!stored.is_expired());
        let remaining = stored.ttl_remaining().unwrap();
        assert!(remaining <= Duration::from_secs(10));
        assert!(remaining >= Duration::from_secs(9));
    }

    #[test]
    fn test_value_expiration() {
        let stored = StoredValue::new("payload".to_string(), Duration::from_millis(50));

        sleep(Duration::from_millis(80));

        assert!(stored.is_expired());
        assert_eq!(stored.ttl_remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_set_ttl_and_persist() {
        let mut stored = StoredValue::new("payload".to_string(), Duration::from_secs(5));

        stored.set_ttl(Duration::from_secs(100));
        assert!(stored.ttl_remaining().unwrap() > Duration::from_secs(90));

        stored.set_ttl(Duration::ZERO);
        assert!(stored.ttl_remaining().is_none());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let stored = StoredValue {
            value: "payload".to_string(),
            expires_at: Some(now),
        };

        assert!(stored.is_expired_at(now), "value should be expired at boundary");
        assert!(!stored.is_expired_at(now - 1));
    }
}
