//! # gifbox
//!
//! A content-addressed local store for image assets.
//!
//! Every image is keyed by the SHA-1 digest of its bytes and carries a small
//! amount of metadata: the URL it came from, free-form tags and the time it
//! was added. Stores can be exported to, and merged back from, portable
//! bundles.
//!
//! ## Core Concepts
//!
//! - **ImageEntry**: Raw bytes plus metadata, identified by content digest
//! - **Store**: A directory of content files plus a JSON metadata index
//! - **Filter**: Composable selection over a store listing
//! - **Bundle**: A gzip-compressed tar holding `gif.json` and `{id}.gif` members
//!
//! ## Example
//!
//! ```ignore
//! use gifbox::{bundle, ExportOptions, NullFilter, Store};
//!
//! let store = Store::open("/tmp/gifs")?;
//! let mut out = std::fs::File::create("backup.gifb")?;
//! bundle::export(&store, &mut out, &NullFilter, ExportOptions::bundle())?;
//! ```

pub mod bundle;
pub mod fetch;
pub mod filter;
pub mod model;
pub mod store;

mod config;
mod error;

pub use bundle::{
    export, import_directory, import_location, import_reader, BundleLayout, ExportOptions,
    ImportSummary,
};
pub use config::Config;
pub use error::{Error, Result};
#[cfg(feature = "remote")]
pub use fetch::HttpFetcher;
pub use fetch::{Fetcher, MockFetcher};
pub use filter::{Filter, NullFilter, Order, OrderAndLimit, RemoteFilter, TagFilter, TypeFilter};
pub use model::{ContentId, ExportedMetadata, ImageEntry};
pub use store::{LineSink, Outcome, OutcomeKind, OutcomeSink, Store};

/// Name of the metadata member inside a bundle
pub const MANIFEST_NAME: &str = "gif.json";

/// File extension used for content, both in bundles and on disk
pub const CONTENT_EXTENSION: &str = "gif";
