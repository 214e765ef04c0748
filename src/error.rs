//! Error types for the cache server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache server.
///
/// A cache miss is not an error at the cache layer (`Option::None`); `NotFound`
/// only exists so the HTTP layer can turn a miss into a response.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Remote backend rejected the operation or could not be reached
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Backend(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::NotFound(_) => (StatusCode::NOT_FOUND, "Key Not Found".to_string()),
            CacheError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            // Backend details stay in the logs
            CacheError::Backend(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Config Error Enum ==
/// Errors raised while loading configuration at startup.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: String, value: String },
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            CacheError::NotFound("k".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CacheError::InvalidRequest("bad".into())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CacheError::Backend("connection refused".into())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            key: "PORT".into(),
            value: "abc".into(),
        };
        assert_eq!(err.to_string(), "invalid value \"abc\" for PORT");
    }
}
