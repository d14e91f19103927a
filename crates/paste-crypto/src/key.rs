//! Key material: random link keys and PBKDF2 password keys.

use std::fmt;

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use hmac::Hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::envelope::SALT_LEN;
use crate::error::CryptoError;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// PBKDF2-HMAC-SHA256 iteration count for password keys.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Source of cryptographically secure random bytes.
///
/// Passed into [`KeyProvider`] and [`crate::EncryptionService`] explicitly so
/// tests can substitute a deterministic source.
pub trait RandomSource: Send + Sync {
    /// Fill `dest` entirely with random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyDerivation`] if the source is unavailable.
    fn fill(&self, dest: &mut [u8]) -> Result<(), CryptoError>;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), CryptoError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| CryptoError::KeyDerivation(format!("random source unavailable: {e}")))
    }
}

/// A 256-bit symmetric key.
///
/// The bytes are wiped when the key is dropped, and `Debug` never prints them.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Lowercase hex form, as embedded in a share link fragment.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the hex form produced by [`SecretKey::to_hex`].
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] unless `s` is exactly
    /// `2 * KEY_LEN` hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let mut key = Self([0u8; KEY_LEN]);
        hex::decode_to_slice(s, &mut key.0).map_err(|_| CryptoError::InvalidKey)?;
        Ok(key)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

/// Produces random link keys and password-derived keys.
#[derive(Debug, Clone, Default)]
pub struct KeyProvider<R = OsRandom> {
    random: R,
}

impl KeyProvider<OsRandom> {
    pub fn new() -> Self {
        Self::with_random(OsRandom)
    }
}

impl<R: RandomSource> KeyProvider<R> {
    pub fn with_random(random: R) -> Self {
        Self { random }
    }

    /// Generate a fresh 256-bit key for link-based sharing.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyDerivation`] if the random source fails.
    pub fn generate_random_key(&self) -> Result<SecretKey, CryptoError> {
        let mut key = SecretKey([0u8; KEY_LEN]);
        self.random.fill(&mut key.0)?;
        Ok(key)
    }

    /// Derive a key from `password` and `salt` with PBKDF2-HMAC-SHA256.
    ///
    /// Deterministic: the same pair always yields the same key. Any password,
    /// including the empty string, is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyDerivation`] if the KDF primitive rejects its
    /// parameters.
    pub fn derive_key_from_password(
        &self,
        password: &str,
        salt: &[u8; SALT_LEN],
    ) -> Result<SecretKey, CryptoError> {
        let mut key = SecretKey([0u8; KEY_LEN]);
        pbkdf2::pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key.0)
            .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
        Ok(key)
    }

    /// Draw `N` random bytes, used for IVs and salts.
    pub(crate) fn random_array<const N: usize>(&self) -> Result<[u8; N], CryptoError> {
        let mut out = [0u8; N];
        self.random.fill(&mut out)?;
        Ok(out)
    }
}
