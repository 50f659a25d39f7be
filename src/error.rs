//! Error types for the listing cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

// == Error Enum ==
/// Unified error type for the listing data-access layer.
///
/// `Clone` because a coalesced fetch hands the same outcome to every waiter.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The document store rejected or failed the call
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Listing not found
    #[error("Listing not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Query parameters could not be turned into a cache key
    #[error("Cache key derivation failed: {0}")]
    KeyDerivation(String),

    /// The write reached the store but the caches could not be invalidated
    #[error("Cache invalidation failed: {0}")]
    Invalidation(String),

    /// A cache lock was poisoned by a panicking holder
    #[error("Cache lock poisoned: {0}")]
    Poisoned(String),
}

impl Error {
    /// Wraps a failure raised while invalidating caches after a mutation.
    pub fn invalidation(err: Error) -> Self {
        match err {
            Error::Invalidation(_) => err,
            other => Error::Invalidation(other.to_string()),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Store(StoreError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Error::Store(StoreError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Error::Store(StoreError::Backend(_)) => StatusCode::BAD_GATEWAY,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::KeyDerivation(_) | Error::Invalidation(_) | Error::Poisoned(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the listing cache.
pub type Result<T> = std::result::Result<T, Error>;
