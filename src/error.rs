//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache proxy, the check-in tracker and the stores.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key or hash field is empty or contains whitespace
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// Request body failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A batch write merged down to nothing
    #[error("Empty batch: {0}")]
    EmptyBatch(&'static str),

    /// A required sorted-set argument was empty
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    /// User id is not a non-negative integer within the bit offset range
    #[error("Invalid user id: {0:?}")]
    InvalidUserId(String),

    /// Key holds a value of another type
    #[error("WRONGTYPE operation against key holding the wrong kind of value: {0}")]
    WrongType(String),

    /// Stored value cannot be used as an integer
    #[error("Value is not an integer or out of range: {0}")]
    NotAnInteger(String),

    /// Value could not be rendered to its wire form
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Transport or server error from Redis, passed through unchanged
    #[error("Store error: {0}")]
    Store(#[from] redis::RedisError),
}

impl CacheError {
    /// Returns true for errors caused by the caller's input rather than the store.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CacheError::InvalidKey(_)
                | CacheError::InvalidRequest(_)
                | CacheError::EmptyBatch(_)
                | CacheError::MissingArgument(_)
                | CacheError::InvalidUserId(_)
        )
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidKey(_)
            | CacheError::InvalidRequest(_)
            | CacheError::EmptyBatch(_)
            | CacheError::MissingArgument(_)
            | CacheError::InvalidUserId(_) => StatusCode::BAD_REQUEST,
            CacheError::WrongType(_) | CacheError::NotAnInteger(_) => StatusCode::CONFLICT,
            CacheError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
