//! Plaintext ⇄ envelope transforms.
//!
//! Every call is independent: a fresh IV (and, in password mode, a fresh
//! salt) is drawn per encryption, and no key is cached between calls.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};

use crate::envelope::{self, IV_LEN, SALT_LEN};
use crate::error::CryptoError;
use crate::key::{KeyProvider, OsRandom, RandomSource, SecretKey};

/// Encrypts paste text into envelopes and back.
#[derive(Debug, Clone, Default)]
pub struct EncryptionService<R = OsRandom> {
    keys: KeyProvider<R>,
}

impl EncryptionService<OsRandom> {
    /// Create a service backed by the operating system CSPRNG.
    pub fn new() -> Self {
        Self::with_random(OsRandom)
    }
}

impl<R: RandomSource> EncryptionService<R> {
    /// Create a service drawing IVs, salts and keys from `random`.
    pub fn with_random(random: R) -> Self {
        Self {
            keys: KeyProvider::with_random(random),
        }
    }

    pub fn keys(&self) -> &KeyProvider<R> {
        &self.keys
    }

    /// Generate a fresh random link key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyDerivation`] if the random source fails.
    pub fn generate_key(&self) -> Result<SecretKey, CryptoError> {
        self.keys.generate_random_key()
    }

    /// Encrypt `plaintext` under `key` into a keyed envelope.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyDerivation`] if no IV can be drawn, or
    /// [`CryptoError::Encryption`] if sealing fails.
    pub fn encrypt(&self, plaintext: &str, key: &SecretKey) -> Result<String, CryptoError> {
        let iv = self.keys.random_array::<IV_LEN>()?;
        let ciphertext = seal(key, &iv, plaintext.as_bytes())?;
        Ok(envelope::encode_keyed(&iv, &ciphertext))
    }

    /// Encrypt `plaintext` under a key derived from `password` and a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyDerivation`] if the salt, IV or key cannot be
    /// produced, or [`CryptoError::Encryption`] if sealing fails.
    pub fn encrypt_with_password(
        &self,
        plaintext: &str,
        password: &str,
    ) -> Result<String, CryptoError> {
        let salt = self.keys.random_array::<SALT_LEN>()?;
        let iv = self.keys.random_array::<IV_LEN>()?;
        let key = self.keys.derive_key_from_password(password, &salt)?;
        let ciphertext = seal(&key, &iv, plaintext.as_bytes())?;
        Ok(envelope::encode_passworded(&salt, &iv, &ciphertext))
    }

    /// Open a keyed envelope.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedEnvelope`] if the envelope cannot be
    /// decoded, or [`CryptoError::Decryption`] if authentication fails for
    /// any reason.
    pub fn decrypt(&self, envelope: &str, key: &SecretKey) -> Result<String, CryptoError> {
        let decoded = envelope::decode_keyed(envelope)?;
        open(key, &decoded.iv, &decoded.ciphertext)
    }

    /// Open a password-mode envelope.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedEnvelope`] if the envelope cannot be
    /// decoded, [`CryptoError::KeyDerivation`] if the KDF fails, or
    /// [`CryptoError::Decryption`] if authentication fails for any reason.
    pub fn decrypt_with_password(
        &self,
        envelope: &str,
        password: &str,
    ) -> Result<String, CryptoError> {
        let decoded = envelope::decode_passworded(envelope)?;
        let key = self.keys.derive_key_from_password(password, &decoded.salt)?;
        open(&key, &decoded.iv, &decoded.ciphertext)
    }
}

fn seal(key: &SecretKey, iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    Aes256Gcm::new(key.as_bytes().into())
        .encrypt(Nonce::from_slice(iv), plaintext)
        .map_err(|_| CryptoError::Encryption)
}

fn open(key: &SecretKey, iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Result<String, CryptoError> {
    let plaintext = Aes256Gcm::new(key.as_bytes().into())
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| CryptoError::Decryption)?;
    String::from_utf8(plaintext).map_err(|_| CryptoError::Decryption)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::TAG_LEN;
    use crate::key::KEY_LEN;

    /// Deterministic source: every byte is the same constant.
    struct Constant(u8);

    impl RandomSource for Constant {
        fn fill(&self, dest: &mut [u8]) -> Result<(), CryptoError> {
            dest.fill(self.0);
            Ok(())
        }
    }

    struct Broken;

    impl RandomSource for Broken {
        fn fill(&self, _dest: &mut [u8]) -> Result<(), CryptoError> {
            Err(CryptoError::KeyDerivation("no entropy".into()))
        }
    }

    fn service() -> EncryptionService {
        EncryptionService::new()
    }

    #[test]
    fn keyed_round_trip() {
        let svc = service();
        let key = svc.generate_key().unwrap();
        let envelope = svc.encrypt("some paste text\nwith lines", &key).unwrap();
        assert_eq!(
            svc.decrypt(&envelope, &key).unwrap(),
            "some paste text\nwith lines"
        );
    }

    #[test]
    fn empty_plaintext_round_trip() {
        let svc = service();
        let key = svc.generate_key().unwrap();
        let envelope = svc.encrypt("", &key).unwrap();
        assert_eq!(envelope.len(), 24 + 2 * TAG_LEN);
        assert_eq!(svc.decrypt(&envelope, &key).unwrap(), "");
    }

    #[test]
    fn password_round_trip() {
        let svc = service();
        let envelope = svc.encrypt_with_password("top secret", "hunter2").unwrap();
        assert_eq!(
            svc.decrypt_with_password(&envelope, "hunter2").unwrap(),
            "top secret"
        );
    }

    #[test]
    fn hello_world_scenario() {
        let svc = service();
        let key = svc.generate_key().unwrap();
        let envelope = svc.encrypt("hello world", &key).unwrap();
        // 12-byte IV + 11-byte plaintext + 16-byte tag, hex encoded.
        assert_eq!(envelope.len(), 24 + 2 * (11 + TAG_LEN));
        assert_eq!(envelope.len(), 78);
        assert_eq!(svc.decrypt(&envelope, &key).unwrap(), "hello world");

        let other = svc.generate_key().unwrap();
        assert_eq!(svc.decrypt(&envelope, &other), Err(CryptoError::Decryption));
    }

    #[test]
    fn keyed_length_invariant() {
        let svc = service();
        let key = svc.generate_key().unwrap();
        let long = "x".repeat(1000);
        for text in ["a", "ünïcödé", long.as_str()] {
            let envelope = svc.encrypt(text, &key).unwrap();
            assert_eq!(envelope.len(), 24 + 2 * (text.len() + TAG_LEN));
        }
    }

    #[test]
    fn passworded_length_invariant() {
        let svc = service();
        let envelope = svc.encrypt_with_password("abc", "pw").unwrap();
        assert_eq!(envelope.len(), 32 + 24 + 2 * (3 + TAG_LEN));
    }

    #[test]
    fn every_flipped_envelope_bit_is_detected() {
        let svc = service();
        let key = svc.generate_key().unwrap();
        let envelope = svc.encrypt("hello world", &key).unwrap();
        let bytes = hex::decode(&envelope).unwrap();
        for i in 0..bytes.len() {
            for bit in 0..8 {
                let mut tampered = bytes.clone();
                tampered[i] ^= 1 << bit;
                assert_eq!(
                    svc.decrypt(&hex::encode(&tampered), &key),
                    Err(CryptoError::Decryption),
                    "flip of byte {i} bit {bit} went undetected"
                );
            }
        }
    }

    #[test]
    fn flipped_envelope_characters_never_decrypt() {
        let svc = service();
        let key = svc.generate_key().unwrap();
        let envelope = svc.encrypt("hello world", &key).unwrap();
        for i in 0..envelope.len() {
            for bit in 0..7 {
                let mut chars = envelope.clone().into_bytes();
                chars[i] ^= 1 << bit;
                // Still lowercase hex: decodes, then fails authentication.
                let expected = if matches!(chars[i], b'0'..=b'9' | b'a'..=b'f') {
                    CryptoError::Decryption
                } else {
                    CryptoError::MalformedEnvelope
                };
                let tampered = String::from_utf8(chars).unwrap();
                assert_eq!(
                    svc.decrypt(&tampered, &key),
                    Err(expected),
                    "flip of char {i} bit {bit}"
                );
            }
        }
    }

    #[test]
    fn keyed_envelope_matches_aes_256_gcm_vector() {
        let svc = EncryptionService::with_random(Constant(0x22));
        let key = SecretKey::from_bytes([0x11; KEY_LEN]);
        let envelope = svc.encrypt("hello world", &key).unwrap();
        assert_eq!(
            envelope,
            "222222222222222222222222\
             7f926b25afefe8309753ba7d2c12569d5205e9a85129b1a2a31835"
        );
        assert_eq!(svc.decrypt(&envelope, &key).unwrap(), "hello world");
    }

    #[test]
    fn password_envelope_matches_known_vector() {
        let svc = EncryptionService::with_random(Constant(0x07));
        let envelope = svc.encrypt_with_password("hello world", "password").unwrap();
        assert_eq!(
            envelope,
            "07070707070707070707070707070707\
             070707070707070707070707\
             0cf2aeb14bcf3dac9713f714ea7f974251c27f8d7598423cc7c9a0"
        );
        assert_eq!(
            svc.decrypt_with_password(&envelope, "password").unwrap(),
            "hello world"
        );
    }

    #[test]
    fn tampered_password_envelope_fails() {
        let svc = service();
        let envelope = svc.encrypt_with_password("payload", "pw").unwrap();
        let mut bytes = hex::decode(&envelope).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert_eq!(
            svc.decrypt_with_password(&hex::encode(&bytes), "pw"),
            Err(CryptoError::Decryption)
        );
    }

    #[test]
    fn wrong_password_is_rejected() {
        let svc = service();
        let envelope = svc.encrypt_with_password("payload", "right").unwrap();
        assert_eq!(
            svc.decrypt_with_password(&envelope, "wrong"),
            Err(CryptoError::Decryption)
        );
    }

    #[test]
    fn iv_is_fresh_per_call() {
        let svc = service();
        let key = svc.generate_key().unwrap();
        let a = envelope::decode_keyed(&svc.encrypt("same", &key).unwrap()).unwrap();
        let b = envelope::decode_keyed(&svc.encrypt("same", &key).unwrap()).unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn salt_is_fresh_per_call() {
        let svc = service();
        let a = svc.encrypt_with_password("same", "pw").unwrap();
        let b = svc.encrypt_with_password("same", "pw").unwrap();
        let a = envelope::decode_passworded(&a).unwrap();
        let b = envelope::decode_passworded(&b).unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.iv, b.iv);
    }

    #[test]
    fn injected_source_makes_output_reproducible() {
        let svc = EncryptionService::with_random(Constant(0x0b));
        let key = SecretKey::from_bytes([0x42; KEY_LEN]);
        let a = svc.encrypt("vector", &key).unwrap();
        let b = svc.encrypt("vector", &key).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with(&"0b".repeat(IV_LEN)));
        assert_eq!(svc.decrypt(&a, &key).unwrap(), "vector");
    }

    #[test]
    fn random_source_failure_surfaces_as_key_derivation() {
        let svc = EncryptionService::with_random(Broken);
        let key = SecretKey::from_bytes([0x42; KEY_LEN]);
        assert!(matches!(
            svc.encrypt("x", &key),
            Err(CryptoError::KeyDerivation(_))
        ));
        assert!(matches!(svc.generate_key(), Err(CryptoError::KeyDerivation(_))));
    }

    #[test]
    fn malformed_envelope_is_reported_before_decryption() {
        let svc = service();
        let key = svc.generate_key().unwrap();
        assert_eq!(svc.decrypt("abc", &key), Err(CryptoError::MalformedEnvelope));
        assert_eq!(
            svc.decrypt_with_password(&"0".repeat(24), "pw"),
            Err(CryptoError::MalformedEnvelope)
        );
    }

    #[test]
    fn non_utf8_plaintext_is_a_generic_failure() {
        let key = SecretKey::from_bytes([0x42; KEY_LEN]);
        let iv = [0u8; IV_LEN];
        let ciphertext = seal(&key, &iv, &[0xff, 0xfe]).unwrap();
        let envelope = envelope::encode_keyed(&iv, &ciphertext);
        assert_eq!(
            service().decrypt(&envelope, &key),
            Err(CryptoError::Decryption)
        );
    }
}
