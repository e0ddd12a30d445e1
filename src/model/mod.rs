//! Core data model types for gifbox

mod hash;
mod image;
mod metadata;

pub use self::hash::{short_id, ContentId, ID_HEX_LEN};
pub use self::image::{classify, ImageEntry};
pub use self::metadata::{parse_manifest, write_manifest, ExportedMetadata};
