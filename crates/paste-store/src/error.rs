//! Errors produced by paste store backends.

use common::PasteId;
use thiserror::Error;

/// Errors produced by [`crate::PasteStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A paste with this id already exists; pastes are immutable.
    #[error("paste already exists: {0}")]
    Conflict(PasteId),

    /// Filesystem access failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record could not be (de)serialised.
    #[error("stored record is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The HTTP request to a remote store failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A remote store answered with an unexpected status.
    #[error("remote store returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// The store was configured with an unusable location.
    #[error("invalid store configuration: {0}")]
    Config(String),
}
