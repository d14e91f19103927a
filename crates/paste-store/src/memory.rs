//! [`MemoryStore`]: thread-safe in-process paste map.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{Paste, PasteId};
use tokio::sync::RwLock;

use crate::{PasteStore, StoreError};

/// In-memory paste store.
///
/// Wraps an `Arc<RwLock<HashMap<_, _>>>` so that:
/// - Many concurrent readers (request handlers) can fetch pastes without
///   contention.
/// - A single writer (a `put` or the sweep task) briefly holds the write lock.
///
/// Expired pastes are hidden from [`PasteStore::get`] immediately and removed
/// by [`PasteStore::purge_expired`].
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<PasteId, Paste>>>,
}

impl MemoryStore {
    /// Create a new, empty [`MemoryStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl PasteStore for MemoryStore {
    async fn put(&self, paste: Paste) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        if let Some(existing) = map.get(&paste.id) {
            // An expired record no longer reserves its id.
            if !existing.is_expired() {
                return Err(StoreError::Conflict(paste.id));
            }
        }
        map.insert(paste.id.clone(), paste);
        Ok(())
    }

    async fn get(&self, id: &PasteId) -> Result<Option<Paste>, StoreError> {
        let map = self.inner.read().await;
        Ok(map.get(id).filter(|p| !p.is_expired()).cloned())
    }

    async fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = Utc::now();
        let mut map = self.inner.write().await;
        let before = map.len();
        map.retain(|_, p| !p.is_expired_at(now));
        Ok(before - map.len())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
