//! Exported metadata - the manifest record shared by bundles and bare manifests
//!
//! Wire shape:
//! ```text
//! [{"id": "<40 hex>", "url": "...", "tags": ["..."], "addedAt": "<RFC 3339>"}]
//! ```
//! `addedAt` is omitted when unset.

use super::ImageEntry;
use crate::Result;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Metadata of an image without its content
///
/// Fields are kept as plain strings: records come from untrusted input, and
/// the claimed id and timestamp are only checked when an entry is rebuilt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedMetadata {
    /// Claimed content digest
    pub id: String,

    /// Source URL, empty for local images
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// RFC 3339 addition time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
}

impl From<&ImageEntry> for ExportedMetadata {
    fn from(image: &ImageEntry) -> Self {
        ExportedMetadata {
            id: image.id.to_hex(),
            url: image.url.clone(),
            tags: image.tags.clone(),
            added_at: image
                .added_at
                .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

/// Parse a JSON array of metadata records
pub fn parse_manifest(reader: impl Read) -> Result<Vec<ExportedMetadata>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Write a JSON array of metadata records
pub fn write_manifest(writer: impl Write, records: &[ExportedMetadata]) -> Result<()> {
    serde_json::to_writer(writer, records)?;
    Ok(())
}
