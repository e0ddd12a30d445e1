//! Error types for gifbox

use thiserror::Error;

/// Result type alias for gifbox operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gifbox operations
///
/// These are whole-operation failures. Problems with a single entry of a
/// multi-entry import never surface here; they go to the outcome sink.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Invalid image ID: {0}")]
    InvalidId(String),

    #[error("Archive does not contain metadata ({})", crate::MANIFEST_NAME)]
    MissingManifest,

    #[error("Unrecognized import format")]
    UnrecognizedFormat,

    #[error("Image has no content: {0}")]
    EmptyContent(String),

    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    Config(String),
}
