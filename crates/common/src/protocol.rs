//! Request and response types exchanged between the paste server and its clients.
//!
//! The create request body and the fetch response body are both a
//! [`Paste`](crate::Paste); the types here cover everything else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PasteId, ServiceError};

/// Path under which pastes are created (`POST`) and fetched (`GET <path>/:id`).
pub const PASTES_PATH: &str = "/api/pastes";

// ---------------------------------------------------------------------------
// Create endpoint
// ---------------------------------------------------------------------------

/// Successful response body for `POST /api/pastes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePasteResponse {
    /// Identifier the paste was stored under.
    pub id: PasteId,
    /// Instant after which the paste will no longer be served.
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"not_found"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&ServiceError> for ErrorResponse {
    fn from(err: &ServiceError) -> Self {
        Self::new(err.code(), err.message())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: String,
    /// Name of the storage backend in use (e.g. `"memory"`).
    pub store: String,
}
