//! Bundles: moving images in and out of a store
//!
//! A bundle is a gzip-compressed tar archive:
//! ```text
//! gif.json        JSON array of exported metadata
//! {id}.gif        raw content, one member per image
//! ```
//! Member order is not fixed. The metadata may come first, last, or anywhere
//! in between, and readers accept every interleaving.
//!
//! A bare metadata array (no archive, no content) can be imported as well, in
//! which case every image is fetched from its URL.

mod directory;
mod export;
mod import;

pub use directory::{import_directory, is_whitelisted};
pub use export::{export, BundleLayout, BundleWriter, ExportOptions};
pub use import::{import_bundle, import_location, import_manifest, import_reader};

use crate::store::{Outcome, OutcomeKind, OutcomeSink};

/// Counts of per-entry outcomes of one import
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub duplicates: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl ImportSummary {
    fn record(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Added => self.added += 1,
            OutcomeKind::Duplicate => self.duplicates += 1,
            OutcomeKind::Warning => self.warnings += 1,
            OutcomeKind::Error => self.errors += 1,
        }
    }
}

/// Forwards outcomes while counting them
pub(crate) struct Tally<'a> {
    inner: &'a mut dyn OutcomeSink,
    summary: ImportSummary,
}

impl<'a> Tally<'a> {
    pub(crate) fn new(inner: &'a mut dyn OutcomeSink) -> Self {
        Tally {
            inner,
            summary: ImportSummary::default(),
        }
    }

    pub(crate) fn finish(self) -> ImportSummary {
        let summary = self.summary;
        tracing::info!(
            added = summary.added,
            duplicates = summary.duplicates,
            warnings = summary.warnings,
            errors = summary.errors,
            "import finished"
        );
        summary
    }
}

impl OutcomeSink for Tally<'_> {
    fn report(&mut self, outcome: Outcome) {
        self.summary.record(outcome.kind);
        self.inner.report(outcome);
    }
}
