//! Image entry - the unit of work moving in and out of the store

use super::ContentId;
use crate::fetch::Fetcher;
use crate::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

/// An image together with its metadata
///
/// The `id` is always the digest of `data` when `data` is present. Entries
/// listed from the store without their content are "dehydrated": they carry
/// the id of the stored bytes but an empty `data`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageEntry {
    /// Content digest
    pub id: ContentId,

    /// Where the image was fetched from (empty for local files)
    pub url: String,

    /// Caller-ordered tags, not deduplicated
    pub tags: Vec<String>,

    /// When the image entered the store (None until set)
    pub added_at: Option<DateTime<Utc>>,

    /// Length of the content in bytes
    pub size: u64,

    /// Sniffed file type token ("gif", "png", ...), empty when unknown
    pub file_type: String,

    /// Raw content
    pub data: Vec<u8>,
}

impl ImageEntry {
    /// Build an entry from raw bytes
    pub fn from_bytes(data: Vec<u8>) -> Self {
        ImageEntry {
            id: ContentId::digest(&data),
            url: String::new(),
            tags: Vec::new(),
            added_at: None,
            size: data.len() as u64,
            file_type: classify(&data),
            data,
        }
    }

    /// Read an entry from a local file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::from_bytes(data))
    }

    /// Fetch an entry from a URL, recording the URL as its source
    pub fn from_url(url: &str, fetcher: &dyn Fetcher) -> Result<Self> {
        let data = fetcher.fetch(url)?;
        let mut image = Self::from_bytes(data);
        image.url = url.to_string();
        Ok(image)
    }

    /// Whether the content bytes are loaded
    pub fn is_hydrated(&self) -> bool {
        !self.data.is_empty()
    }

    /// Whether the image has a remote origin
    pub fn is_remote(&self) -> bool {
        !self.url.is_empty()
    }

    /// Parse and set the addition time from an RFC 3339 string
    ///
    /// On failure `added_at` is left untouched.
    pub fn set_added_at_from_str(
        &mut self,
        added_at: &str,
    ) -> std::result::Result<(), chrono::ParseError> {
        let parsed = DateTime::parse_from_rfc3339(added_at)?;
        self.added_at = Some(parsed.with_timezone(&Utc));
        Ok(())
    }

    /// Set the tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Set the source URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Sniff a short file type token from the content signature
pub fn classify(data: &[u8]) -> String {
    ::image::guess_format(data)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or_default()
        .to_string()
}
