//! The paste record and its identifier.
//!
//! A [`Paste`] is the only thing a store ever sees: an opaque envelope string
//! plus the metadata needed to serve and expire it. Keys and passwords never
//! appear here.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum length of a paste identifier, in characters.
pub const MAX_ID_LEN: usize = 64;

/// Error returned when a string is not a valid [`PasteId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid paste id: must be 1-64 characters of [A-Za-z0-9_-]")]
pub struct InvalidPasteId;

/// Opaque identifier chosen by the paste creator.
///
/// Restricted to URL- and filename-safe characters so it can be used directly
/// as a path segment and as a file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PasteId(String);

impl PasteId {
    /// Generate a fresh random identifier (UUIDv4, simple form).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Validate and wrap `s`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPasteId`] if `s` is empty, longer than [`MAX_ID_LEN`],
    /// or contains anything other than ASCII alphanumerics, `-` and `_`.
    pub fn parse(s: &str) -> Result<Self, InvalidPasteId> {
        let valid = !s.is_empty()
            && s.len() <= MAX_ID_LEN
            && s
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !valid {
            return Err(InvalidPasteId);
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PasteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PasteId {
    type Err = InvalidPasteId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PasteId {
    type Error = InvalidPasteId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PasteId> for String {
    fn from(id: PasteId) -> Self {
        id.0
    }
}

impl AsRef<str> for PasteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A stored paste.
///
/// Created once at submission time and immutable thereafter. Logically
/// deleted as soon as `expires_at` has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paste {
    /// Creator-chosen identifier.
    pub id: PasteId,
    /// Hex-encoded ciphertext envelope (salt, IV, ciphertext and tag).
    pub envelope: String,
    /// Instant after which the paste is no longer served.
    pub expires_at: DateTime<Utc>,
    /// Whether the envelope is in password mode.
    pub has_password: bool,
}

impl Paste {
    /// Returns `true` if the paste is no longer servable at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Returns `true` if the paste is no longer servable right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
