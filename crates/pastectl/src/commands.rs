//! `create` and `view`: the client side of the paste lifecycle.
//!
//! All encryption and decryption happens here, before anything reaches a
//! [`PasteStore`]. Stores only ever see envelopes.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use common::{Paste, PasteId};
use paste_crypto::{CryptoError, EncryptionService, RandomSource};
use paste_store::{FileStore, HttpStore, PasteStore};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};
use url::Url;
use zeroize::Zeroizing;

use crate::config::Config;
use crate::link::ShareLink;
use crate::prompt::PasswordSource;

/// Password attempts allowed when viewing interactively.
pub const MAX_PASSWORD_ATTEMPTS: u32 = 3;

/// A paste to be created.
#[derive(Debug)]
pub struct NewPaste {
    pub plaintext: String,
    pub with_password: bool,
    pub ttl: Duration,
}

/// Open the store `pastectl` should use.
///
/// The remote server when one is configured and `local` is not set,
/// otherwise the local paste directory.
///
/// # Errors
///
/// Returns an error if the server URL is invalid or the directory cannot be
/// created.
pub async fn open_store(cfg: &Config, local: bool) -> Result<Box<dyn PasteStore>> {
    match &cfg.server_url {
        Some(url) if !local => {
            let store = HttpStore::new(url).context("invalid PASTECTL_SERVER_URL")?;
            Ok(Box::new(store))
        }
        _ => {
            let store = FileStore::open(&cfg.local_dir).await.with_context(|| {
                format!("failed to open paste directory {}", cfg.local_dir.display())
            })?;
            Ok(Box::new(store))
        }
    }
}

/// Read paste text from `file`, or from stdin when no file is given.
pub async fn read_plaintext(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Encrypt and store a new paste, returning its share link.
///
/// # Errors
///
/// Returns an error if the text is empty, the password is empty or not
/// confirmed, encryption fails, or the store rejects the paste.
pub async fn create<R: RandomSource>(
    store: &dyn PasteStore,
    crypto: &EncryptionService<R>,
    passwords: &mut dyn PasswordSource,
    share_base: &Url,
    new: NewPaste,
) -> Result<Url> {
    if new.plaintext.trim().is_empty() {
        anyhow::bail!("nothing to share: the text is empty");
    }
    let ttl = chrono::Duration::from_std(new.ttl).context("expiry is too far in the future")?;
    if ttl <= chrono::Duration::zero() {
        anyhow::bail!("expiry must be greater than zero");
    }
    let expires_at = Utc::now()
        .checked_add_signed(ttl)
        .context("expiry is too far in the future")?;

    let (envelope, key) = if new.with_password {
        let password = read_new_password(passwords)?;
        (crypto.encrypt_with_password(&new.plaintext, &password)?, None)
    } else {
        let key = crypto.generate_key()?;
        (crypto.encrypt(&new.plaintext, &key)?, Some(key))
    };

    let paste = Paste {
        id: PasteId::generate(),
        envelope,
        expires_at,
        has_password: new.with_password,
    };
    let id = paste.id.clone();
    store.put(paste).await.context("failed to store paste")?;
    info!(paste_id = %id, has_password = new.with_password, store = store.backend(), "paste created");

    let link = ShareLink { id, key };
    Ok(link.to_url(share_base)?)
}

/// Fetch and decrypt the paste a share link points to.
///
/// `has_password` on the stored paste decides how it is opened: a key in the
/// link is ignored for password pastes.
///
/// # Errors
///
/// Returns an error if the paste is missing or expired, the link has no key
/// for a keyed paste, or decryption fails.
pub async fn view<R: RandomSource>(
    store: &dyn PasteStore,
    crypto: &EncryptionService<R>,
    passwords: &mut dyn PasswordSource,
    link: &ShareLink,
) -> Result<String> {
    let paste = store
        .get(&link.id)
        .await
        .context("failed to fetch paste")?
        .with_context(|| format!("paste {} not found or expired", link.id))?;

    if !paste.has_password {
        let key = link
            .key
            .as_ref()
            .context("this link has no key; keyed pastes need the #<key> part of the link")?;
        return crypto
            .decrypt(&paste.envelope, key)
            .context("could not decrypt paste");
    }

    if link.key.is_some() {
        debug!(paste_id = %link.id, "ignoring link key for password-protected paste");
    }
    let attempts = if passwords.is_interactive() {
        MAX_PASSWORD_ATTEMPTS
    } else {
        1
    };
    let mut attempt = 1;
    loop {
        let password = passwords.read_password("Password: ")?;
        match crypto.decrypt_with_password(&paste.envelope, &password) {
            Ok(text) => return Ok(text),
            Err(CryptoError::Decryption) if attempt < attempts => {
                eprintln!("Wrong password, try again ({attempt}/{attempts}).");
                attempt += 1;
            }
            Err(e) => return Err(e).context("could not decrypt paste"),
        }
    }
}

/// Ask for a new password twice, rejecting empty and mismatched entries.
fn read_new_password(passwords: &mut dyn PasswordSource) -> Result<Zeroizing<String>> {
    let password = passwords.read_password("Password: ")?;
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }
    let confirm = passwords.read_password("Confirm password: ")?;
    if *password != *confirm {
        anyhow::bail!("passwords do not match");
    }
    Ok(password)
}
