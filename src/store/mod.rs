//! On-disk image store
//!
//! Content files are stored by their SHA-1 digest under the store root, next
//! to a JSON index holding each image's metadata. Every add reports its
//! result through an [`OutcomeSink`].

mod file_store;
mod outcome;

pub use file_store::{Store, INDEX_NAME};
pub use outcome::{LineSink, Outcome, OutcomeKind, OutcomeSink};
