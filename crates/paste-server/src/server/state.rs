//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use chrono::Duration;
use paste_store::{MemoryStore, PasteStore};

use crate::config::Config;

/// Request limits enforced by the create handler.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Furthest into the future a paste may expire.
    pub max_ttl: Duration,
    /// Maximum envelope length in hex characters.
    pub max_envelope_len: usize,
}

impl Limits {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            max_ttl: Duration::from_std(std::time::Duration::from_secs(cfg.max_ttl_secs))
                .unwrap_or(Duration::MAX),
            max_envelope_len: cfg.max_envelope_len,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable so that Axum can clone the state for each
/// request without copying expensive data.
#[derive(Clone)]
pub struct AppState {
    /// Backend holding the ciphertext-only paste records.
    pub store: Arc<dyn PasteStore>,
    /// Size and expiry limits for new pastes.
    pub limits: Limits,
}

impl AppState {
    /// Create a new [`AppState`] over `store` with the given limits.
    pub fn new(store: Arc<dyn PasteStore>, limits: Limits) -> Self {
        Self { store, limits }
    }
}

impl Default for AppState {
    /// Creates a default [`AppState`] over an empty [`MemoryStore`], suitable for tests.
    fn default() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Limits::default())
    }
}
