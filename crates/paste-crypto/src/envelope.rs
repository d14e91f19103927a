//! Fixed-offset hex framing of salt, IV and ciphertext.
//!
//! Both component sizes are protocol constants, so there are no length
//! prefixes or delimiters: the IV is the first [`IV_LEN`] bytes (after the
//! [`SALT_LEN`]-byte salt in password mode) and the ciphertext is everything
//! after it. Encoding is always lowercase; decoding accepts lowercase only, so
//! every envelope has exactly one string form.

use crate::error::CryptoError;

/// Byte length of the PBKDF2 salt (password mode only).
pub const SALT_LEN: usize = 16;

/// Byte length of an AES-GCM nonce (96 bits).
pub const IV_LEN: usize = 12;

/// Byte length of the AES-GCM authentication tag appended to the ciphertext.
pub const TAG_LEN: usize = 16;

/// Which of the two envelope layouts a string is in.
///
/// The envelope does not describe itself; this is carried next to it as the
/// paste's `has_password` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeMode {
    /// `iv ‖ ciphertext`, opened with a random link key.
    Keyed,
    /// `salt ‖ iv ‖ ciphertext`, opened with a password-derived key.
    Passworded,
}

impl EnvelopeMode {
    pub fn from_has_password(has_password: bool) -> Self {
        if has_password {
            Self::Passworded
        } else {
            Self::Keyed
        }
    }

    pub fn has_password(self) -> bool {
        matches!(self, Self::Passworded)
    }

    /// Number of header bytes preceding the ciphertext.
    pub fn header_len(self) -> usize {
        match self {
            Self::Keyed => IV_LEN,
            Self::Passworded => SALT_LEN + IV_LEN,
        }
    }
}

/// A decoded keyed envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedEnvelope {
    pub iv: [u8; IV_LEN],
    /// Ciphertext with the authentication tag appended.
    pub ciphertext: Vec<u8>,
}

/// A decoded password-mode envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordedEnvelope {
    pub salt: [u8; SALT_LEN],
    pub iv: [u8; IV_LEN],
    /// Ciphertext with the authentication tag appended.
    pub ciphertext: Vec<u8>,
}

/// Encode `iv ‖ ciphertext` as lowercase hex.
pub fn encode_keyed(iv: &[u8; IV_LEN], ciphertext: &[u8]) -> String {
    let mut out = String::with_capacity(2 * (IV_LEN + ciphertext.len()));
    out.push_str(&hex::encode(iv));
    out.push_str(&hex::encode(ciphertext));
    out
}

/// Encode `salt ‖ iv ‖ ciphertext` as lowercase hex.
pub fn encode_passworded(salt: &[u8; SALT_LEN], iv: &[u8; IV_LEN], ciphertext: &[u8]) -> String {
    let mut out = String::with_capacity(2 * (SALT_LEN + IV_LEN + ciphertext.len()));
    out.push_str(&hex::encode(salt));
    out.push_str(&hex::encode(iv));
    out.push_str(&hex::encode(ciphertext));
    out
}

/// Split a keyed envelope at byte offset [`IV_LEN`].
///
/// # Errors
///
/// Returns [`CryptoError::MalformedEnvelope`] if the string is shorter than
/// 24 hex characters, has odd length, or contains anything but `[0-9a-f]`.
pub fn decode_keyed(envelope: &str) -> Result<KeyedEnvelope, CryptoError> {
    let bytes = decode_hex(envelope)?;
    let (iv, ciphertext) = bytes
        .split_first_chunk::<IV_LEN>()
        .ok_or(CryptoError::MalformedEnvelope)?;
    Ok(KeyedEnvelope {
        iv: *iv,
        ciphertext: ciphertext.to_vec(),
    })
}

/// Split a password-mode envelope at byte offsets [`SALT_LEN`] and
/// `SALT_LEN + IV_LEN`.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedEnvelope`] if the string is shorter than
/// 56 hex characters, has odd length, or contains anything but `[0-9a-f]`.
pub fn decode_passworded(envelope: &str) -> Result<PasswordedEnvelope, CryptoError> {
    let bytes = decode_hex(envelope)?;
    let (salt, rest) = bytes
        .split_first_chunk::<SALT_LEN>()
        .ok_or(CryptoError::MalformedEnvelope)?;
    let (iv, ciphertext) = rest
        .split_first_chunk::<IV_LEN>()
        .ok_or(CryptoError::MalformedEnvelope)?;
    Ok(PasswordedEnvelope {
        salt: *salt,
        iv: *iv,
        ciphertext: ciphertext.to_vec(),
    })
}

/// Check that `envelope` is structurally sound for `mode` without opening it.
///
/// Beyond decoding, the ciphertext must be long enough to hold the
/// authentication tag.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedEnvelope`] on any structural problem.
pub fn validate(envelope: &str, mode: EnvelopeMode) -> Result<(), CryptoError> {
    let ciphertext_len = match mode {
        EnvelopeMode::Keyed => decode_keyed(envelope)?.ciphertext.len(),
        EnvelopeMode::Passworded => decode_passworded(envelope)?.ciphertext.len(),
    };
    if ciphertext_len < TAG_LEN {
        return Err(CryptoError::MalformedEnvelope);
    }
    Ok(())
}

fn decode_hex(s: &str) -> Result<Vec<u8>, CryptoError> {
    if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(CryptoError::MalformedEnvelope);
    }
    hex::decode(s).map_err(|_| CryptoError::MalformedEnvelope)
}
