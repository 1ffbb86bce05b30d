//! Store Entry Module
//!
//! A single value held by the in-process store, with optional expiry.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

// == Stored Value ==
/// The typed payload of a key.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// Plain string, also addressed bit by bit
    Str(Vec<u8>),
    /// Field to value map
    Hash(HashMap<String, String>),
    /// Member to score map
    ZSet(HashMap<String, f64>),
}

impl StoredValue {
    /// Redis type name, used in WRONGTYPE messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            StoredValue::Str(_) => "string",
            StoredValue::Hash(_) => "hash",
            StoredValue::ZSet(_) => "zset",
        }
    }
}

// == Store Entry ==
/// A stored value with optional expiration.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    pub value: StoredValue,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoreEntry {
    // == Constructor ==
    /// Creates a new entry with optional TTL.
    ///
    /// A TTL too large to express as a Unix millisecond timestamp never expires.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_seconds` - Optional TTL in seconds
    pub fn new(value: StoredValue, ttl_seconds: Option<u64>) -> Self {
        let now = current_timestamp_ms();
        let expires_at = ttl_seconds
            .and_then(|ttl| ttl.checked_mul(1000))
            .and_then(|ms| now.checked_add(ms));

        Self { value, expires_at }
    }

    /// Creates an entry that never expires.
    pub fn persistent(value: StoredValue) -> Self {
        Self::new(value, None)
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its expiration time.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Remaining TTL in milliseconds, `Some(0)` once expired, None without expiry.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(current_timestamp_ms()))
    }

    /// Remaining TTL in whole seconds.
    pub fn ttl_remaining(&self) -> Option<u64> {
        self.ttl_remaining_ms().map(|ms| ms / 1000)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn text(s: &str) -> StoredValue {
        StoredValue::Str(s.as_bytes().to_vec())
    }

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = StoreEntry::persistent(text("test_value"));

        assert_eq!(entry.value, text("test_value"));
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining().is_none());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = StoreEntry::new(text("test_value"), Some(1));

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(1100));

        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining_ms(), Some(0));
    }

    #[test]
    fn test_ttl_remaining_seconds() {
        let entry = StoreEntry::new(text("test_value"), Some(10));

        let remaining = entry.ttl_remaining().unwrap();
        assert!(remaining <= 10);
        assert!(remaining >= 9);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let entry = StoreEntry {
            value: text("test"),
            expires_at: Some(now),
        };

        assert!(entry.is_expired(), "Entry should be expired at boundary");
    }

    #[test]
    fn test_overflowing_ttl_never_expires() {
        let entry = StoreEntry::new(text("test"), Some(u64::MAX));

        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());

        let entry = StoreEntry::new(text("test"), Some(u64::MAX / 1000));
        assert!(entry.expires_at.is_none());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(text("x").type_name(), "string");
        assert_eq!(StoredValue::Hash(HashMap::new()).type_name(), "hash");
        assert_eq!(StoredValue::ZSet(HashMap::new()).type_name(), "zset");
    }
}
