//! Common types, protocol definitions, and errors shared across `pastebin` crates.

pub mod error;
pub mod paste;
pub mod protocol;

pub use error::ServiceError;
pub use paste::{InvalidPasteId, Paste, PasteId};
