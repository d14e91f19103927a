//! Store selection and background expiry sweeping.
//!
//! # Lifecycle
//!
//! 1. At startup, [`open`] builds the backend named by `STORE_BACKEND`.
//! 2. Handlers share it as an `Arc<dyn PasteStore>`; expired pastes are
//!    already invisible to them.
//! 3. [`sweep_task`] periodically calls [`PasteStore::purge_expired`] so that
//!    expired records do not accumulate.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use paste_store::{FileStore, MemoryStore, PasteStore};
use tokio::time;
use tracing::{debug, info, warn};

use crate::config::{Config, StoreBackend};

/// Open the storage backend selected by `cfg`.
///
/// # Errors
///
/// Returns an error if the `file` backend directory cannot be created.
pub async fn open(cfg: &Config) -> Result<Arc<dyn PasteStore>> {
    match cfg.store_backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::File => {
            let dir = cfg
                .store_dir
                .clone()
                .context("STORE_DIR is required when STORE_BACKEND=file")?;
            let store = FileStore::open(&dir)
                .await
                .with_context(|| format!("failed to open paste directory {}", dir.display()))?;
            Ok(Arc::new(store))
        }
    }
}

/// Spawn a background task that periodically purges expired pastes.
///
/// The first sweep fires after one full interval. A failed sweep is logged
/// and retried on the next tick.
pub fn sweep_task(store: Arc<dyn PasteStore>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        // First tick fires immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(0) => debug!(store = store.backend(), "expiry sweep found nothing"),
                Ok(removed) => info!(store = store.backend(), removed, "expired pastes purged"),
                Err(e) => warn!(store = store.backend(), error = %e, "expiry sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{Paste, PasteId};

    fn expired(id: &str) -> Paste {
        Paste {
            id: PasteId::parse(id).unwrap(),
            envelope: "00".repeat(28),
            expires_at: Utc::now() - chrono::Duration::seconds(1),
            has_password: false,
        }
    }

    #[tokio::test]
    async fn opens_memory_backend_by_default() {
        let store = open(&Config::default()).await.unwrap();
        assert_eq!(store.backend(), "memory");
    }

    #[tokio::test]
    async fn opens_file_backend_in_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config {
            store_backend: StoreBackend::File,
            store_dir: Some(dir.path().join("pastes")),
            ..Config::default()
        };
        let store = open(&cfg).await.unwrap();
        assert_eq!(store.backend(), "file");
        assert!(dir.path().join("pastes").is_dir());
    }

    #[tokio::test]
    async fn file_backend_without_dir_is_an_error() {
        let cfg = Config {
            store_backend: StoreBackend::File,
            ..Config::default()
        };
        assert!(open(&cfg).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_purges_after_first_interval() {
        let memory = MemoryStore::new();
        memory.put(expired("stale")).await.unwrap();
        let handle = sweep_task(Arc::new(memory.clone()), Duration::from_secs(60));

        // Let the task consume its immediate first tick.
        tokio::task::yield_now().await;
        assert_eq!(memory.len().await, 1);

        time::sleep(Duration::from_secs(61)).await;
        assert!(memory.is_empty().await);
        handle.abort();
    }
}
