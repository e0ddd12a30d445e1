//! Content-addressed identifier using SHA-1

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;

/// Length of a digest in bytes
pub const ID_BYTES: usize = 20;

/// Length of a digest rendered as hex
pub const ID_HEX_LEN: usize = ID_BYTES * 2;

/// A 20-byte SHA-1 digest identifying an image by its content
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId([u8; ID_BYTES]);

impl ContentId {
    /// Digest arbitrary data
    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);
        let mut arr = [0u8; ID_BYTES];
        arr.copy_from_slice(&hasher.finalize());
        ContentId(arr)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; ID_BYTES] {
        &self.0
    }

    /// Convert to lowercase hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string (either case)
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != ID_BYTES {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; ID_BYTES];
        arr.copy_from_slice(&bytes);
        Ok(ContentId(arr))
    }

    /// Get a short prefix for display (first 8 chars)
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }
}

/// Display prefix of a possibly malformed id string
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.short())
    }
}

impl TryFrom<String> for ContentId {
    type Error = crate::Error;

    fn try_from(s: String) -> crate::Result<Self> {
        ContentId::from_hex(&s).map_err(|_| crate::Error::InvalidId(s))
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        id.to_hex()
    }
}

impl std::str::FromStr for ContentId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        ContentId::from_hex(s).map_err(|_| crate::Error::InvalidId(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_deterministic() {
        let h1 = ContentId::digest(b"hello");
        let h2 = ContentId::digest(b"hello");
        let h3 = ContentId::digest(b"world");

        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
    }

    #[test]
    fn test_known_sha1_vector() {
        let id = ContentId::digest(b"abc");
        assert_eq!(id.to_hex(), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn test_hex_is_lowercase_and_fixed_length() {
        let hex = ContentId::digest(b"test data").to_hex();
        assert_eq!(hex.len(), ID_HEX_LEN);
        assert_eq!(hex, hex.to_lowercase());
    }

    #[test]
    fn test_from_hex_accepts_uppercase() {
        let id = ContentId::digest(b"case");
        let upper = id.to_hex().to_uppercase();
        assert_eq!(ContentId::from_hex(&upper).unwrap(), id);
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        assert!(ContentId::from_hex("abcd").is_err());
        assert!("not-hex".parse::<ContentId>().is_err());
    }

    #[test]
    fn test_short_id_handles_short_strings() {
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id("0123456789"), "01234567");
    }
}
