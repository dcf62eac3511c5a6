//! Error types for the request cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Fetch Error Enum ==
/// Failure reported by a caller-supplied fetch function.
///
/// The cache never builds these itself; it only classifies them to decide
/// between retrying, cooling down, or giving up.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Remote answered with a non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection, DNS or timeout failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Caller-side setup problem, e.g. no bearer token available
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Shorthand for a status failure.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        FetchError::Status {
            status,
            message: message.into(),
        }
    }

    /// Shorthand for the HTTP 429 rate-limit signal.
    pub fn too_many_requests() -> Self {
        Self::status(429, "Too Many Requests")
    }

    /// Returns the HTTP status code, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for an HTTP 429 response.
    pub fn is_rate_limit(&self) -> bool {
        self.status_code() == Some(429)
    }
}

// == Cache Error Enum ==
/// Unified error type for the request cache.
///
/// `Clone` so that one settled fetch can be handed to every waiter.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Rate-limit cooldown active, or a 429 observed, and nothing cached
    #[error("Too many requests: rate limited while resolving '{0}'")]
    RateLimited(String),

    /// Fetch failed and no cached value was available to fall back on
    #[error("Fetch failed for '{key}': {source}")]
    Fetch {
        key: String,
        #[source]
        source: FetchError,
    },

    /// In-flight fetch was cancelled
    #[error("Fetch cancelled for '{0}'")]
    Cancelled(String),

    /// Value could not be converted to or from JSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Persistence medium failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Key not cached
    #[error("Key not found: {0}")]
    NotFound(String),

    /// No cache instance registered under this name
    #[error("Unknown cache instance: {0}")]
    UnknownInstance(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Storage(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            CacheError::Fetch { .. } => StatusCode::BAD_GATEWAY,
            CacheError::Cancelled(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::NotFound(_) | CacheError::UnknownInstance(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::Serialization(_) => {
                StatusCode::BAD_REQUEST
            }
            CacheError::Storage(_) | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the request cache.
pub type Result<T> = std::result::Result<T, CacheError>;
