//! Import: metadata arrays and bundles into a store
//!
//! Every entry goes through the same reconciliation: the id is recomputed
//! from the actual bytes, the claimed metadata is copied over, and the result
//! is handed to [`Store::add`]. Content always wins over a claimed id; a
//! mismatch is reported as a warning and the image is stored under the id of
//! what was actually received.

use super::{import_directory, ImportSummary, Tally};
use crate::fetch::Fetcher;
use crate::model::{parse_manifest, short_id, ContentId, ExportedMetadata, ImageEntry};
use crate::store::{Outcome, OutcomeSink, Store};
use crate::{Error, Result, CONTENT_EXTENSION, MANIFEST_NAME};
use libflate::gzip;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Leading bytes of every gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Import from a location: an http(s) URL, a file, or a directory
pub fn import_location(
    store: &Store,
    location: &str,
    recursive: bool,
    fetcher: &dyn Fetcher,
    sink: &mut dyn OutcomeSink,
) -> Result<ImportSummary> {
    if location.starts_with("http://") || location.starts_with("https://") {
        let body = fetcher.fetch(location)?;
        return import_reader(store, Cursor::new(body), fetcher, sink);
    }

    let path = Path::new(location);
    if std::fs::metadata(path)?.is_dir() {
        import_directory(store, path, recursive, sink)
    } else {
        import_reader(store, File::open(path)?, fetcher, sink)
    }
}

/// Import from a stream, detecting whether it is a bundle or a metadata array
pub fn import_reader(
    store: &Store,
    reader: impl Read,
    fetcher: &dyn Fetcher,
    sink: &mut dyn OutcomeSink,
) -> Result<ImportSummary> {
    let mut reader = reader;

    // A single read may return fewer bytes than the magic, so keep reading
    let mut prefix = Vec::with_capacity(GZIP_MAGIC.len());
    (&mut reader)
        .take(GZIP_MAGIC.len() as u64)
        .read_to_end(&mut prefix)?;
    let is_gzip = prefix == GZIP_MAGIC;
    let mut reader = Cursor::new(prefix).chain(reader);

    if is_gzip {
        tracing::debug!("detected bundle");
        let decoder = gzip::Decoder::new(reader)?;
        return import_bundle(store, decoder, sink);
    }

    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    match parse_manifest(&input[..]) {
        Ok(records) => {
            tracing::debug!(records = records.len(), "detected metadata array");
            import_manifest(store, records, fetcher, sink)
        }
        Err(_) => Err(Error::UnrecognizedFormat),
    }
}

/// Import a metadata array, fetching every image from its URL
///
/// Entries are processed one at a time in array order.
pub fn import_manifest(
    store: &Store,
    records: Vec<ExportedMetadata>,
    fetcher: &dyn Fetcher,
    sink: &mut dyn OutcomeSink,
) -> Result<ImportSummary> {
    let mut tally = Tally::new(sink);

    for record in records {
        let subject = short_id(&record.id).to_string();

        if record.url.is_empty() {
            tally.report(Outcome::error(subject, "No URL to fetch from"));
            continue;
        }

        let image = match ImageEntry::from_url(&record.url, fetcher) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(url = %record.url, error = %e, "fetch failed");
                tally.report(Outcome::error(subject, e.to_string()));
                continue;
            }
        };

        admit(store, image, &record.id, Some(&record), &mut tally);
    }

    store.sync()?;
    Ok(tally.finish())
}

/// Import a decompressed tar stream
///
/// Fails as a whole when the archive holds no metadata member; in that case
/// nothing has been added to the store.
pub fn import_bundle(
    store: &Store,
    reader: impl Read,
    sink: &mut dyn OutcomeSink,
) -> Result<ImportSummary> {
    import_bundle_in(&std::env::temp_dir(), store, reader, sink)
}

/// Like [`import_bundle`], staging early content under `staging_root`
pub(crate) fn import_bundle_in(
    staging_root: &Path,
    store: &Store,
    reader: impl Read,
    sink: &mut dyn OutcomeSink,
) -> Result<ImportSummary> {
    let mut tally = Tally::new(sink);
    let mut archive = tar::Archive::new(reader);
    let mut state = BundleState::awaiting(staging_root)?;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = member_name(&entry)?;

        if name == MANIFEST_NAME {
            let records = parse_manifest(&mut entry)?;
            tracing::debug!(records = records.len(), "read bundle metadata");
            state = state.receive_manifest(records, store, &mut tally);
            continue;
        }

        let Some(claimed) = parse_member_id(&name) else {
            tracing::debug!(member = %name, "skipping unknown member");
            continue;
        };

        match &mut state {
            BundleState::AwaitingMetadata { staging, queue } => {
                let staged = staged_path(staging, &claimed);
                let copied =
                    File::create(&staged).and_then(|mut file| std::io::copy(&mut entry, &mut file));
                match copied {
                    Ok(_) => queue.push(claimed),
                    Err(e) => tally.report(Outcome::error(claimed.short(), e.to_string())),
                }
            }
            BundleState::MetadataSeen { manifest } => {
                let mut data = Vec::new();
                if let Err(e) = entry.read_to_end(&mut data) {
                    tally.report(Outcome::error(claimed.short(), e.to_string()));
                    continue;
                }
                let image = ImageEntry::from_bytes(data);
                admit(store, image, &claimed.to_hex(), manifest.get(&claimed), &mut tally);
            }
        }
    }

    match state {
        BundleState::AwaitingMetadata { .. } => Err(Error::MissingManifest),
        BundleState::MetadataSeen { .. } => {
            store.sync()?;
            Ok(tally.finish())
        }
    }
}

/// Progress through a bundle whose member order is unknown
enum BundleState {
    /// No metadata yet: content is staged on disk and its claimed id queued
    AwaitingMetadata {
        staging: TempDir,
        queue: Vec<ContentId>,
    },
    /// Metadata known: content is reconciled as it arrives
    MetadataSeen {
        manifest: HashMap<ContentId, ExportedMetadata>,
    },
}

impl BundleState {
    fn awaiting(staging_root: &Path) -> Result<Self> {
        Ok(BundleState::AwaitingMetadata {
            staging: tempfile::Builder::new()
                .prefix("gif-import")
                .tempdir_in(staging_root)?,
            queue: Vec::new(),
        })
    }

    /// Take in a metadata member, draining any staged content
    fn receive_manifest(
        self,
        records: Vec<ExportedMetadata>,
        store: &Store,
        sink: &mut dyn OutcomeSink,
    ) -> Self {
        let (mut manifest, staged) = match self {
            BundleState::MetadataSeen { manifest } => (manifest, None),
            BundleState::AwaitingMetadata { staging, queue } => {
                (HashMap::new(), Some((staging, queue)))
            }
        };

        for record in records {
            match ContentId::from_hex(&record.id) {
                Ok(id) => {
                    manifest.insert(id, record);
                }
                Err(_) => sink.report(Outcome::warning(
                    short_id(&record.id),
                    "Invalid ID in metadata, record ignored",
                )),
            }
        }

        if let Some((staging, queue)) = staged {
            tracing::debug!(staged = queue.len(), "draining staged content");
            for claimed in queue {
                let image = match ImageEntry::from_file(staged_path(&staging, &claimed)) {
                    Ok(image) => image,
                    Err(e) => {
                        sink.report(Outcome::error(claimed.short(), e.to_string()));
                        continue;
                    }
                };
                admit(store, image, &claimed.to_hex(), manifest.get(&claimed), sink);
            }
            // staging is removed when dropped here
        }

        BundleState::MetadataSeen { manifest }
    }
}

/// Reconcile received content with its claimed metadata and add it
fn admit(
    store: &Store,
    image: ImageEntry,
    claimed_id: &str,
    record: Option<&ExportedMetadata>,
    sink: &mut dyn OutcomeSink,
) {
    if !image.is_hydrated() {
        sink.report(Outcome::error(short_id(claimed_id), "Empty content"));
        return;
    }
    let image = reconcile(image, claimed_id, record, sink);
    store.add(image, sink);
}

/// Merge claimed metadata into an image built from received bytes
fn reconcile(
    mut image: ImageEntry,
    claimed_id: &str,
    record: Option<&ExportedMetadata>,
    sink: &mut dyn OutcomeSink,
) -> ImageEntry {
    let subject = short_id(claimed_id).to_string();

    if !claimed_id.eq_ignore_ascii_case(&image.id.to_hex()) {
        tracing::warn!(claimed = claimed_id, actual = %image.id, "id mismatch");
        sink.report(Outcome::warning(
            subject.clone(),
            format!("ID mismatch, claimed {}, new ID: {}", claimed_id, image.id),
        ));
    }

    let Some(record) = record else {
        sink.report(Outcome::warning(subject, "No metadata for this image"));
        return image;
    };

    if !record.url.is_empty() {
        image.url = record.url.clone();
    }
    image.tags = record.tags.clone();

    if let Some(added_at) = &record.added_at {
        if image.set_added_at_from_str(added_at).is_err() {
            tracing::warn!(id = %image.id, added_at = %added_at, "unparseable addition date");
            sink.report(Outcome::warning(
                subject,
                format!("Could not set addition date: {}", added_at),
            ));
        }
    }

    image
}

fn staged_path(staging: &TempDir, id: &ContentId) -> PathBuf {
    staging.path().join(format!("{}.{}", id, CONTENT_EXTENSION))
}

fn member_name<R: Read>(entry: &tar::Entry<'_, R>) -> Result<String> {
    let path = entry.path()?;
    let name = path.to_string_lossy();
    Ok(name.trim_start_matches("./").to_string())
}

/// The id claimed by a content member name like `{40 hex}.gif`
fn parse_member_id(name: &str) -> Option<ContentId> {
    let stem = name.strip_suffix(&format!(".{}", CONTENT_EXTENSION))?;
    if stem.len() != crate::model::ID_HEX_LEN {
        return None;
    }
    ContentId::from_hex(stem).ok()
}
