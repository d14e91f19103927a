//! Errors produced by the crypto layer.

use thiserror::Error;

/// Errors produced by key derivation, envelope decoding and AEAD operations.
///
/// [`CryptoError::Decryption`] deliberately carries no detail: a wrong key, a
/// wrong password, and tampered ciphertext all look the same to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The KDF or the random source is unavailable.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// The envelope is too short, odd-length, or not lowercase hex.
    #[error("malformed envelope: corrupted data")]
    MalformedEnvelope,

    /// AEAD authentication failed.
    #[error("invalid key or corrupted data")]
    Decryption,

    /// A hex key string is not exactly [`crate::KEY_LEN`] bytes of hex.
    #[error("invalid key: expected {} hex characters", crate::KEY_LEN * 2)]
    InvalidKey,

    /// AEAD sealing failed.
    #[error("encryption failed")]
    Encryption,
}
