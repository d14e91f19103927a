//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::Conflict`] → 409
/// - [`ServiceError::PayloadTooLarge`] → 413
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: invalid JSON, paste id, envelope, or expiry.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The paste does not exist or has expired. The two are indistinguishable.
    #[error("not found: {0}")]
    NotFound(String),

    /// A paste with the requested id already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The envelope exceeds the configured size limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::Conflict(_) => 409,
            ServiceError::PayloadTooLarge(_) => 413,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in [`crate::protocol::ErrorResponse`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::PayloadTooLarge(_) => "payload_too_large",
            ServiceError::Internal(_) => "internal_error",
        }
    }

    /// The caller-safe message carried by this error, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            ServiceError::BadRequest(m)
            | ServiceError::NotFound(m)
            | ServiceError::Conflict(m)
            | ServiceError::PayloadTooLarge(m)
            | ServiceError::Internal(m) => m,
        }
    }
}
