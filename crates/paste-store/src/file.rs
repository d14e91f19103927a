//! [`FileStore`]: one JSON file per paste in a local directory.
//!
//! The on-disk analogue of browser local storage. Each paste lives in
//! `<dir>/<id>.json`; ids are restricted to filename-safe characters by
//! [`PasteId`], so they are used as file stems directly.
//!
//! Writes go to a hidden temporary file first and are published with a hard
//! link, which fails atomically if the target already exists. Readers never
//! observe a partially written paste.
//!
//! A record file is only unlinked while holding the store's removal lock, and
//! only after re-reading it under that lock. A fresh paste linked over an
//! expired one is therefore never removed by a reader or the sweep that saw
//! the expired record.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Paste, PasteId};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{PasteStore, StoreError};

const EXTENSION: &str = "json";

/// Directory-backed paste store.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
    /// Held across every check-then-unlink of a record file.
    removals: Arc<Mutex<()>>,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created, or
    /// [`StoreError::Config`] if `dir` exists but is not a directory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        if !fs::metadata(&dir).await?.is_dir() {
            return Err(StoreError::Config(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        Ok(Self {
            dir,
            removals: Arc::default(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &PasteId) -> PathBuf {
        self.dir.join(format!("{id}.{EXTENSION}"))
    }

    /// Read and parse a record, without any expiry handling.
    async fn read(&self, path: &Path) -> Result<Option<Paste>, StoreError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a file, treating a concurrent removal as success.
    async fn remove(path: &Path) -> Result<(), StoreError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the record at `path` if it is still expired at `now`.
    ///
    /// Returns `false` when the file is gone or now holds a live paste.
    async fn remove_if_expired(
        &self,
        path: &Path,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let _guard = self.removals.lock().await;
        match self.read(path).await? {
            Some(paste) if paste.is_expired_at(now) => {
                Self::remove(path).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Publish the record written at `tmp` as `target`.
    ///
    /// The id is taken unless its current holder has already expired.
    async fn publish(&self, tmp: &Path, target: &Path, id: &PasteId) -> Result<(), StoreError> {
        if Self::link(tmp, target).await? {
            return Ok(());
        }
        let _guard = self.removals.lock().await;
        if let Some(existing) = self.read(target).await? {
            if !existing.is_expired() {
                return Err(StoreError::Conflict(id.clone()));
            }
        }
        Self::remove(target).await?;
        if Self::link(tmp, target).await? {
            Ok(())
        } else {
            Err(StoreError::Conflict(id.clone()))
        }
    }

    /// Hard-link `tmp` to `target`; returns `false` if `target` already exists.
    async fn link(tmp: &Path, target: &Path) -> Result<bool, StoreError> {
        match fs::hard_link(tmp, target).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl PasteStore for FileStore {
    async fn put(&self, paste: Paste) -> Result<(), StoreError> {
        let target = self.path_for(&paste.id);
        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", paste.id, PasteId::generate()));
        fs::write(&tmp, serde_json::to_vec(&paste)?).await?;

        let result = self.publish(&tmp, &target, &paste.id).await;
        Self::remove(&tmp).await?;
        result
    }

    async fn get(&self, id: &PasteId) -> Result<Option<Paste>, StoreError> {
        let path = self.path_for(id);
        match self.read(&path).await? {
            Some(paste) if paste.is_expired() => {
                if self.remove_if_expired(&path, Utc::now()).await? {
                    debug!(paste_id = %id, "removed expired paste on read");
                }
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = Utc::now();
        let mut removed = 0;
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_record = path.extension().is_some_and(|ext| ext == EXTENSION)
                && !entry.file_name().to_string_lossy().starts_with('.');
            if !is_record {
                continue;
            }
            match self.read(&path).await {
                Ok(Some(paste)) if paste.is_expired_at(now) => {
                    if self.remove_if_expired(&path, now).await? {
                        removed += 1;
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable paste file"),
            }
        }
        Ok(removed)
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn paste(id: &str, ttl_secs: i64) -> Paste {
        Paste {
            id: PasteId::parse(id).unwrap(),
            envelope: "cd".repeat(40),
            expires_at: Utc::now() + Duration::seconds(ttl_secs),
            has_password: true,
        }
    }

    async fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("pastes")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn open_creates_directory() {
        let (_dir, store) = store().await;
        assert!(store.dir().is_dir());
    }

    #[tokio::test]
    async fn open_rejects_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        assert!(FileStore::open(&file).await.is_err());
    }

    #[tokio::test]
    async fn put_and_get() {
        let (_dir, store) = store().await;
        let p = paste("f1", 60);
        store.put(p.clone()).await.unwrap();
        assert_eq!(store.get(&p.id).await.unwrap(), Some(p));
    }

    #[tokio::test]
    async fn record_is_json_named_after_id() {
        let (_dir, store) = store().await;
        store.put(paste("named", 60)).await.unwrap();
        let raw = std::fs::read_to_string(store.dir().join("named.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["id"], "named");
        assert_eq!(json["has_password"], true);
    }

    #[tokio::test]
    async fn no_temporary_files_left_behind() {
        let (_dir, store) = store().await;
        store.put(paste("t1", 60)).await.unwrap();
        let _ = store.put(paste("t1", 60)).await;
        let names: Vec<_> = std::fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["t1.json".to_string()]);
    }

    #[tokio::test]
    async fn duplicate_id_conflicts() {
        let (_dir, store) = store().await;
        store.put(paste("dup", 60)).await.unwrap();
        let err = store.put(paste("dup", 60)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn expired_paste_removed_on_read() {
        let (_dir, store) = store().await;
        let p = paste("gone", -1);
        store.put(p.clone()).await.unwrap();
        assert!(store.get(&p.id).await.unwrap().is_none());
        assert!(!store.dir().join("gone.json").exists());
    }

    #[tokio::test]
    async fn expired_id_can_be_reused() {
        let (_dir, store) = store().await;
        store.put(paste("again", -1)).await.unwrap();
        store.put(paste("again", 60)).await.unwrap();
        assert!(store
            .get(&PasteId::parse("again").unwrap())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn purge_removes_only_expired() {
        let (_dir, store) = store().await;
        store.put(paste("old", -5)).await.unwrap();
        store.put(paste("new", 60)).await.unwrap();
        std::fs::write(store.dir().join("junk.json"), b"not json").unwrap();
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert!(store.dir().join("new.json").exists());
        assert!(store.dir().join("junk.json").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn fresh_paste_survives_concurrent_expiry_cleanup() {
        let (_dir, store) = store().await;
        let id = PasteId::parse("race").unwrap();
        for round in 0..200 {
            store.put(paste("race", -1)).await.unwrap();

            let reader = {
                let store = store.clone();
                let id = id.clone();
                tokio::spawn(async move { store.get(&id).await })
            };
            let sweeper = {
                let store = store.clone();
                tokio::spawn(async move { store.purge_expired().await })
            };
            let writer = {
                let store = store.clone();
                tokio::spawn(async move { store.put(paste("race", 60)).await })
            };

            reader.await.unwrap().unwrap();
            sweeper.await.unwrap().unwrap();
            writer.await.unwrap().unwrap();
            assert!(
                store.get(&id).await.unwrap().is_some(),
                "accepted paste lost in round {round}"
            );
            std::fs::remove_file(store.dir().join("race.json")).unwrap();
        }
    }

    #[tokio::test]
    async fn corrupted_record_is_an_error() {
        let (_dir, store) = store().await;
        std::fs::write(store.dir().join("bad.json"), b"{").unwrap();
        let err = store
            .get(&PasteId::parse("bad").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
