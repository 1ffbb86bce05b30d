//! Request DTOs for the HTTP front end
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

/// Largest accepted TTL in seconds, the bound Redis enforces on `SET EX`
/// once converted to milliseconds.
pub const MAX_TTL_SECS: u64 = i64::MAX as u64 / 1000;

/// Request body for `PUT /cache/:alias/:key`
///
/// # Fields
/// - `value`: Any JSON value; objects and arrays are stored as JSON text
/// - `ttl`: Optional TTL in seconds, overriding the configured default
#[derive(Debug, Clone, Deserialize)]
pub struct SetValueRequest {
    /// The value to store
    pub value: Value,
    /// Optional TTL in seconds, 0 = no expiration
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetValueRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.value.is_null() {
            return Some("Value cannot be null".to_string());
        }
        if let Some(ttl) = self.ttl {
            if ttl > MAX_TTL_SECS {
                return Some(format!("TTL cannot exceed {} seconds", MAX_TTL_SECS));
            }
        }
        None
    }
}
