//! Client-side paste encryption: AES-256-GCM envelopes keyed either by a
//! random link key or by a PBKDF2-derived password key.
//!
//! This crate is intentionally free of storage and HTTP dependencies. Nothing
//! in it logs: salts, IVs, keys and passwords must never reach a log sink.
//!
//! # Envelope format
//!
//! ```text
//! keyed:      hex(iv[12] ‖ ciphertext+tag)
//! passworded: hex(salt[16] ‖ iv[12] ‖ ciphertext+tag)
//! ```
//!
//! The two formats carry no mode tag; the reader must know which one it holds
//! (see [`EnvelopeMode`]).

pub mod envelope;
pub mod error;
pub mod key;
pub mod service;

pub use envelope::{EnvelopeMode, IV_LEN, SALT_LEN, TAG_LEN};
pub use error::CryptoError;
pub use key::{KeyProvider, OsRandom, RandomSource, SecretKey, KEY_LEN, PBKDF2_ITERATIONS};
pub use service::EncryptionService;
