//! Paste storage: the [`PasteStore`] contract and its backends.
//!
//! Stores only ever see [`Paste`] records: opaque envelopes plus metadata.
//!
//! # Expiry contract
//!
//! [`PasteStore::get`] returns `None` once a paste's `expires_at` has passed,
//! whether or not the record has been physically removed yet. Backends may
//! purge lazily on read, eagerly through [`PasteStore::purge_expired`], or
//! both; callers cannot tell the difference.

pub mod error;
pub mod file;
pub mod http;
pub mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use http::HttpStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use common::{Paste, PasteId};

/// Key-value access to pastes.
#[async_trait]
pub trait PasteStore: Send + Sync {
    /// Store a new paste.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if a paste with the same id already
    /// exists, or a backend error if the write fails.
    async fn put(&self, paste: Paste) -> Result<(), StoreError>;

    /// Fetch a paste; `None` if it never existed or has expired.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the read fails.
    async fn get(&self, id: &PasteId) -> Result<Option<Paste>, StoreError>;

    /// Physically remove every expired paste, returning how many were removed.
    ///
    /// Backends whose expiry is handled elsewhere keep the default, which
    /// removes nothing.
    async fn purge_expired(&self) -> Result<usize, StoreError> {
        Ok(0)
    }

    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;
}
