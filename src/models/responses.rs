//! Response DTOs for the HTTP front end
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::checkin::UserId;
use crate::codec::Decoded;

/// Response body for `GET /cache/:alias/:key`
#[derive(Debug, Clone, Serialize)]
pub struct ValueResponse {
    pub alias: String,
    pub key: String,
    /// Decoded value, empty string when the key is absent
    pub value: Decoded,
}

impl ValueResponse {
    pub fn new(alias: impl Into<String>, key: impl Into<String>, value: Decoded) -> Self {
        Self {
            alias: alias.into(),
            key: key.into(),
            value,
        }
    }
}

/// Response body for `PUT /cache/:alias/:key`
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    pub alias: String,
    pub key: String,
}

impl SetResponse {
    pub fn new(alias: impl Into<String>, key: impl Into<String>) -> Self {
        let alias = alias.into();
        let key = key.into();
        Self {
            message: format!("Key '{}{}' set successfully", alias, key),
            alias,
            key,
        }
    }
}

/// Response body for `DELETE /cache/:alias/:key`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub alias: String,
    pub key: String,
    /// False when there was nothing to delete
    pub deleted: bool,
}

impl DeleteResponse {
    pub fn new(alias: impl Into<String>, key: impl Into<String>, deleted: bool) -> Self {
        Self {
            alias: alias.into(),
            key: key.into(),
            deleted,
        }
    }
}

/// Response body for `POST /checkin/:user_id`
#[derive(Debug, Clone, Serialize)]
pub struct SignResponse {
    pub user_id: UserId,
    /// Bit value before this call
    pub previous: u8,
    /// True when this call made the first check-in of the day
    pub first_today: bool,
}

impl SignResponse {
    pub fn new(user_id: UserId, previous: u8) -> Self {
        Self {
            user_id,
            previous,
            first_today: previous == 0,
        }
    }
}

/// Response body for `GET /checkin/:user_id`
#[derive(Debug, Clone, Serialize)]
pub struct SignStatusResponse {
    pub user_id: UserId,
    pub signed: bool,
}

impl SignStatusResponse {
    pub fn new(user_id: UserId, bit: u8) -> Self {
        Self {
            user_id,
            signed: bit == 1,
        }
    }
}

/// Response body for the week and month check-in endpoints
#[derive(Debug, Clone, Serialize)]
pub struct SignRangeResponse {
    pub user_id: UserId,
    /// One bit per day, oldest first, today last
    pub days: Vec<u8>,
    /// Number of days checked in
    pub total: u32,
}

impl SignRangeResponse {
    pub fn new(user_id: UserId, days: Vec<u8>) -> Self {
        let total = days.iter().map(|&bit| u32::from(bit)).sum();
        Self {
            user_id,
            days,
            total,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;

    #[test]
    fn test_value_response_embeds_decoded_json() {
        let resp = ValueResponse::new("user:", "1", codec::decode(r#"{"a":1}"#));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["value"]["a"], 1);
        assert_eq!(json["alias"], "user:");
    }

    #[test]
    fn test_value_response_raw_text() {
        let resp = ValueResponse::new("user:", "1", codec::decode("plain"));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["value"], "plain");
    }

    #[test]
    fn test_set_response_serialize() {
        let resp = SetResponse::new("user:", "my_key");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("user:my_key"));
        assert!(json.contains("successfully"));
    }

    #[test]
    fn test_sign_response_first_today() {
        assert!(SignResponse::new(UserId::new(1), 0).first_today);
        assert!(!SignResponse::new(UserId::new(1), 1).first_today);
    }

    #[test]
    fn test_sign_range_total() {
        let resp = SignRangeResponse::new(UserId::new(3), vec![1, 0, 1]);
        assert_eq!(resp.total, 2);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["user_id"], 3);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
