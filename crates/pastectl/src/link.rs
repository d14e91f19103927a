//! Share links.
//!
//! A keyed paste is shared as `<base>/p/<id>#<key hex>`. The key travels in
//! the URL fragment, which HTTP clients never send to a server. A
//! password-protected paste is shared as `<base>/p/<id>` with no fragment.

use common::{InvalidPasteId, PasteId};
use paste_crypto::{CryptoError, SecretKey};
use thiserror::Error;
use url::Url;

/// Path segment that precedes the paste id.
const PASTE_SEGMENT: &str = "p";

/// Errors produced while reading or building a share link.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("invalid link: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("link does not point to a paste (expected .../p/<id>)")]
    NotAPasteLink,

    #[error("invalid paste id in link: {0}")]
    InvalidId(#[from] InvalidPasteId),

    #[error("invalid key in link: {0}")]
    InvalidKey(#[from] CryptoError),

    #[error("share base URL cannot carry a path: {0}")]
    UnsupportedBase(Url),
}

/// The parts of a share link.
#[derive(Debug)]
pub struct ShareLink {
    pub id: PasteId,
    /// Decryption key for keyed pastes; `None` for password pastes.
    pub key: Option<SecretKey>,
}

impl ShareLink {
    /// Build the link URL under `base`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::UnsupportedBase`] if `base` cannot have path
    /// segments (e.g. `mailto:`).
    pub fn to_url(&self, base: &Url) -> Result<Url, LinkError> {
        let mut url = base.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|()| LinkError::UnsupportedBase(base.clone()))?
            .pop_if_empty()
            .push(PASTE_SEGMENT)
            .push(self.id.as_str());
        url.set_fragment(self.key.as_ref().map(SecretKey::to_hex).as_deref());
        Ok(url)
    }

    /// Parse a share link produced by [`ShareLink::to_url`].
    ///
    /// Any base URL is accepted as long as the path ends in `p/<id>`. An
    /// empty fragment is treated as no key.
    ///
    /// # Errors
    ///
    /// Returns a [`LinkError`] describing the first problem found.
    pub fn parse(link: &str) -> Result<Self, LinkError> {
        let url = Url::parse(link.trim())?;

        let mut segments: Vec<&str> = url
            .path_segments()
            .ok_or(LinkError::NotAPasteLink)?
            .collect();
        if segments.last() == Some(&"") {
            segments.pop();
        }
        let id = match segments.as_slice() {
            [.., marker, id] if *marker == PASTE_SEGMENT => PasteId::parse(id)?,
            _ => return Err(LinkError::NotAPasteLink),
        };

        let key = match url.fragment() {
            Some(hex) if !hex.is_empty() => Some(SecretKey::from_hex(hex)?),
            _ => None,
        };

        Ok(Self { id, key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paste_crypto::KEY_LEN;

    fn base(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn keyed(id: &str) -> ShareLink {
        ShareLink {
            id: PasteId::parse(id).unwrap(),
            key: Some(SecretKey::from_bytes([0x1f; KEY_LEN])),
        }
    }

    #[test]
    fn keyed_link_carries_key_in_fragment() {
        let url = keyed("abc").to_url(&base("http://localhost:8080")).unwrap();
        assert_eq!(
            url.as_str(),
            format!("http://localhost:8080/p/abc#{}", "1f".repeat(KEY_LEN))
        );
    }

    #[test]
    fn password_link_has_no_fragment() {
        let link = ShareLink {
            id: PasteId::parse("locked").unwrap(),
            key: None,
        };
        let url = link.to_url(&base("https://paste.example.com/")).unwrap();
        assert_eq!(url.as_str(), "https://paste.example.com/p/locked");
        assert!(url.fragment().is_none());
    }

    #[test]
    fn base_path_is_preserved() {
        let url = keyed("x1").to_url(&base("https://example.com/share/")).unwrap();
        assert!(url.as_str().starts_with("https://example.com/share/p/x1#"));
    }

    #[test]
    fn parse_recovers_formatted_link() {
        let url = keyed("round").to_url(&base("https://example.com")).unwrap();
        let parsed = ShareLink::parse(url.as_str()).unwrap();
        assert_eq!(parsed.id.as_str(), "round");
        assert_eq!(parsed.key.unwrap().as_bytes(), &[0x1f; KEY_LEN]);
    }

    #[test]
    fn parse_without_fragment_has_no_key() {
        let parsed = ShareLink::parse("http://localhost:8080/p/pw-only").unwrap();
        assert!(parsed.key.is_none());
        let parsed = ShareLink::parse("http://localhost:8080/p/pw-only#").unwrap();
        assert!(parsed.key.is_none());
    }

    #[test]
    fn parse_tolerates_trailing_slash_and_whitespace() {
        let parsed = ShareLink::parse("  https://example.com/p/spaced/\n").unwrap();
        assert_eq!(parsed.id.as_str(), "spaced");
    }

    #[test]
    fn parse_rejects_non_paste_paths() {
        assert!(matches!(
            ShareLink::parse("https://example.com/q/abc"),
            Err(LinkError::NotAPasteLink)
        ));
        assert!(matches!(
            ShareLink::parse("https://example.com/"),
            Err(LinkError::NotAPasteLink)
        ));
    }

    #[test]
    fn parse_rejects_bad_parts() {
        assert!(matches!(
            ShareLink::parse("not a link"),
            Err(LinkError::InvalidUrl(_))
        ));
        assert!(matches!(
            ShareLink::parse("https://example.com/p/bad%20id"),
            Err(LinkError::InvalidId(_))
        ));
        assert!(matches!(
            ShareLink::parse("https://example.com/p/abc#deadbeef"),
            Err(LinkError::InvalidKey(CryptoError::InvalidKey))
        ));
    }
}
