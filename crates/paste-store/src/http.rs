//! [`HttpStore`]: client for a remote paste server.
//!
//! Only the paste record crosses the wire. Link keys live in URL fragments
//! and passwords stay with the user, so neither ever reaches this module.

use std::time::Duration;

use async_trait::async_trait;
use common::protocol::{ErrorResponse, PASTES_PATH};
use common::{Paste, PasteId};
use reqwest::{Client, Response, StatusCode};
use tracing::debug;
use url::Url;

use crate::{PasteStore, StoreError};

/// Per-request timeout for calls to the remote store.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote paste store reached over HTTP(S).
#[derive(Clone, Debug)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    /// Create a client for the paste server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if `base_url` is not an absolute
    /// `http`/`https` URL, or [`StoreError::Http`] if the client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| StoreError::Config(format!("invalid server URL {base_url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StoreError::Config(format!(
                "server URL must be http or https, got {:?}",
                parsed.scheme()
            )));
        }

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn pastes_url(&self) -> String {
        format!("{}{PASTES_PATH}", self.base_url)
    }

    fn paste_url(&self, id: &PasteId) -> String {
        format!("{}{PASTES_PATH}/{id}", self.base_url)
    }
}

/// Turn an unexpected response into [`StoreError::Remote`], preferring the
/// server's own error message when the body is an [`ErrorResponse`].
async fn remote_error(status: StatusCode, resp: Response) -> StoreError {
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    StoreError::Remote {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl PasteStore for HttpStore {
    async fn put(&self, paste: Paste) -> Result<(), StoreError> {
        let resp = self
            .client
            .post(self.pastes_url())
            .json(&paste)
            .send()
            .await?;

        match resp.status() {
            status if status.is_success() => {
                debug!(paste_id = %paste.id, "paste stored remotely");
                Ok(())
            }
            StatusCode::CONFLICT => Err(StoreError::Conflict(paste.id)),
            status => Err(remote_error(status, resp).await),
        }
    }

    async fn get(&self, id: &PasteId) -> Result<Option<Paste>, StoreError> {
        let resp = self.client.get(self.paste_url(id)).send().await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let paste: Paste = resp.json().await?;
                // Do not trust the server's clock alone.
                Ok(Some(paste).filter(|p| !p.is_expired()))
            }
            status => Err(remote_error(status, resp).await),
        }
    }

    fn backend(&self) -> &'static str {
        "http"
    }
}
