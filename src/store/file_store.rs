//! Directory-backed image store
//!
//! Layout:
//! ```text
//! {root}/
//!   index.json        metadata for every stored image, keyed by id
//!   {id}.gif          raw content, one file per image
//! ```
//!
//! Content files are immutable: the same id always means the same bytes, so
//! re-adding an image never rewrites anything. The index is kept in memory
//! and written back by [`Store::sync`].

use crate::bundle::ExportOptions;
use crate::filter::Filter;
use crate::model::{ContentId, ImageEntry};
use crate::store::outcome::{Outcome, OutcomeKind, OutcomeSink};
use crate::{Error, Result, CONTENT_EXTENSION};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the metadata index inside the store root
pub const INDEX_NAME: &str = "index.json";

const INDEX_VERSION: u32 = 1;

/// Metadata persisted for one image
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexRecord {
    #[serde(default)]
    url: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    added_at: Option<DateTime<Utc>>,
    size: u64,
    #[serde(rename = "type", default)]
    file_type: String,
}

impl IndexRecord {
    fn from_image(image: &ImageEntry) -> Self {
        IndexRecord {
            url: image.url.clone(),
            tags: image.tags.clone(),
            added_at: image.added_at,
            size: image.size,
            file_type: image.file_type.clone(),
        }
    }

    fn to_image(&self, id: ContentId) -> ImageEntry {
        ImageEntry {
            id,
            url: self.url.clone(),
            tags: self.tags.clone(),
            added_at: self.added_at,
            size: self.size,
            file_type: self.file_type.clone(),
            data: Vec::new(),
        }
    }
}

/// On-disk shape of the index file
#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    images: BTreeMap<ContentId, IndexRecord>,
}

/// A content-addressed image store rooted at a directory
pub struct Store {
    /// Root directory
    path: PathBuf,
    /// In-memory index
    index: RwLock<BTreeMap<ContentId, IndexRecord>>,
    /// Whether the index has changes not yet written
    dirty: RwLock<bool>,
}

impl Store {
    /// Open the store at `path`, creating the directory if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        fs::create_dir_all(&path)?;

        let index_path = path.join(INDEX_NAME);
        let index = if index_path.exists() {
            let file: IndexFile = serde_json::from_slice(&fs::read(&index_path)?)?;
            if file.version != INDEX_VERSION {
                return Err(Error::Config(format!(
                    "Unsupported index version {} in {}",
                    file.version,
                    index_path.display()
                )));
            }
            file.images
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), images = index.len(), "opened store");

        Ok(Store {
            path,
            index: RwLock::new(index),
            dirty: RwLock::new(false),
        })
    }

    /// The store root
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the content of `image` lives; depends only on its id
    pub fn path_for(&self, image: &ImageEntry) -> PathBuf {
        self.path_for_id(&image.id)
    }

    fn path_for_id(&self, id: &ContentId) -> PathBuf {
        self.path.join(format!("{}.{}", id, CONTENT_EXTENSION))
    }

    /// Write the content of `image` to its path
    pub fn save(&self, image: &ImageEntry) -> Result<()> {
        if !image.is_hydrated() {
            return Err(Error::EmptyContent(image.id.to_hex()));
        }
        fs::write(self.path_for(image), &image.data)?;
        Ok(())
    }

    /// Whether content for `image` exists on disk
    pub fn contains(&self, image: &ImageEntry) -> bool {
        self.path_for(image).exists()
    }

    /// Add an image, reporting what happened to `sink`
    ///
    /// Never fails: errors are reported and returned as [`OutcomeKind::Error`].
    /// Metadata is first-writer-wins: re-adding a stored id reports a
    /// duplicate and keeps the url, tags and addition time already indexed.
    pub fn add(&self, mut image: ImageEntry, sink: &mut dyn OutcomeSink) -> OutcomeKind {
        let short = image.id.short();

        if !image.is_hydrated() {
            sink.report(Outcome::error(short, "Image has no content"));
            return OutcomeKind::Error;
        }

        if self.index.read().contains_key(&image.id) && self.contains(&image) {
            tracing::debug!(id = %image.id, "already stored");
            sink.report(Outcome::duplicate(short, "Already in store"));
            return OutcomeKind::Duplicate;
        }

        if let Err(e) = self.save(&image) {
            tracing::warn!(id = %image.id, error = %e, "failed to save image");
            sink.report(Outcome::error(short, e.to_string()));
            return OutcomeKind::Error;
        }

        if image.added_at.is_none() {
            image.added_at = Some(Utc::now());
        }

        self.index
            .write()
            .insert(image.id, IndexRecord::from_image(&image));
        *self.dirty.write() = true;

        tracing::debug!(id = %image.id, size = image.size, "added image");
        let message = if image.url.is_empty() {
            format!("Added {} image", type_label(&image))
        } else {
            image.url.clone()
        };
        sink.report(Outcome::added(short, message));
        OutcomeKind::Added
    }

    /// Fetch a stored image with its content
    pub fn get(&self, id: &ContentId) -> Result<ImageEntry> {
        let mut image = self
            .index
            .read()
            .get(id)
            .map(|record| record.to_image(*id))
            .ok_or_else(|| Error::NotFound(id.to_hex()))?;
        self.hydrate(&mut image)?;
        Ok(image)
    }

    /// Load the content of a listed image
    pub fn hydrate(&self, image: &mut ImageEntry) -> Result<()> {
        if !image.is_hydrated() {
            image.data = fs::read(self.path_for(image))?;
        }
        Ok(())
    }

    /// List stored images (without content) through `filter`
    pub fn list(&self, filter: &dyn Filter) -> Result<Vec<ImageEntry>> {
        let images = self
            .index
            .read()
            .iter()
            .map(|(id, record)| record.to_image(*id))
            .collect();
        Ok(filter.apply(images))
    }

    /// Number of stored images
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the index to disk
    pub fn sync(&self) -> Result<()> {
        let mut dirty = self.dirty.write();
        if !*dirty {
            return Ok(());
        }

        let file = IndexFile {
            version: INDEX_VERSION,
            images: self.index.read().clone(),
        };

        // Write next to the index and rename so a crash never leaves it truncated
        let index_path = self.path.join(INDEX_NAME);
        let tmp_path = self.path.join(format!("{}.tmp", INDEX_NAME));
        fs::write(&tmp_path, serde_json::to_vec_pretty(&file)?)?;
        fs::rename(&tmp_path, &index_path)?;

        *dirty = false;
        Ok(())
    }

    /// Export images passing `filter` as metadata or as a bundle
    pub fn export<W: Write>(
        &self,
        writer: W,
        filter: &dyn Filter,
        options: ExportOptions,
    ) -> Result<()> {
        crate::bundle::export(self, writer, filter, options)
    }

    /// Irreversibly delete the whole store
    pub fn purge(self) -> Result<()> {
        *self.dirty.write() = false;
        fs::remove_dir_all(&self.path)?;
        tracing::info!(path = %self.path.display(), "purged store");
        Ok(())
    }
}

fn type_label(image: &ImageEntry) -> &str {
    if image.file_type.is_empty() {
        "unknown"
    } else {
        &image.file_type
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        // Best-effort sync on drop
        if let Err(e) = self.sync() {
            tracing::warn!(error = %e, "failed to sync store index");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{NullFilter, RemoteFilter};
    use tempfile::tempdir;

    fn gif(suffix: &str) -> ImageEntry {
        ImageEntry::from_bytes(format!("GIF89a{}", suffix).into_bytes())
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("store");

        let store = Store::open(&root).unwrap();
        assert!(root.is_dir());
        assert!(store.is_empty());
    }

    #[test]
    fn test_path_for_is_pure_function_of_id() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let a = gif("a");
        let mut b = a.clone().with_url("http://x.test/a.gif");
        b.data.clear();

        assert_eq!(store.path_for(&a), store.path_for(&b));
        assert_eq!(
            store.path_for(&a),
            dir.path().join(format!("{}.gif", a.id.to_hex()))
        );
    }

    #[test]
    fn test_add_and_get() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let mut outcomes: Vec<Outcome> = Vec::new();

        let image = gif("a").with_tags(vec!["one".into()]);
        let kind = store.add(image.clone(), &mut outcomes);

        assert_eq!(kind, OutcomeKind::Added);
        assert!(store.contains(&image));

        let stored = store.get(&image.id).unwrap();
        assert_eq!(stored.data, image.data);
        assert_eq!(stored.tags, vec!["one"]);
        assert!(stored.added_at.is_some(), "addition time is stamped");
    }

    #[test]
    fn test_add_duplicate() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let mut outcomes: Vec<Outcome> = Vec::new();

        store.add(gif("a"), &mut outcomes);
        let kind = store.add(gif("a"), &mut outcomes);

        assert_eq!(kind, OutcomeKind::Duplicate);
        assert_eq!(store.len(), 1);
        assert_eq!(outcomes[1].kind, OutcomeKind::Duplicate);
        assert_eq!(outcomes[1].subject, gif("a").id.short());
    }

    #[test]
    fn test_readd_keeps_first_metadata() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let mut outcomes: Vec<Outcome> = Vec::new();

        store.add(gif("a").with_tags(vec!["first".into()]), &mut outcomes);
        let kind = store.add(
            gif("a")
                .with_tags(vec!["second".into()])
                .with_url("http://x.test/a.gif"),
            &mut outcomes,
        );

        assert_eq!(kind, OutcomeKind::Duplicate);
        let stored = store.get(&gif("a").id).unwrap();
        assert_eq!(stored.tags, vec!["first"]);
        assert!(stored.url.is_empty());
    }

    #[test]
    fn test_add_without_content_is_error() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let mut outcomes: Vec<Outcome> = Vec::new();

        let kind = store.add(ImageEntry::from_bytes(Vec::new()), &mut outcomes);

        assert_eq!(kind, OutcomeKind::Error);
        assert!(store.is_empty());
    }

    #[test]
    fn test_list_applies_filter() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let mut outcomes: Vec<Outcome> = Vec::new();

        store.add(gif("local"), &mut outcomes);
        store.add(gif("remote").with_url("http://x.test/r.gif"), &mut outcomes);

        let all = store.list(&NullFilter).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|i| !i.is_hydrated()));

        let remote = store.list(&RemoteFilter::new(NullFilter)).unwrap();
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].url, "http://x.test/r.gif");
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let image = gif("persist").with_url("http://x.test/p.gif");

        {
            let store = Store::open(dir.path()).unwrap();
            store.add(image.clone(), &mut Vec::<Outcome>::new());
            store.sync().unwrap();
        }

        {
            let store = Store::open(dir.path()).unwrap();
            let stored = store.get(&image.id).unwrap();
            assert_eq!(stored.url, "http://x.test/p.gif");
            assert_eq!(stored.file_type, "gif");
        }
    }

    #[test]
    fn test_drop_syncs_index() {
        let dir = tempdir().unwrap();
        {
            let store = Store::open(dir.path()).unwrap();
            store.add(gif("dropped"), &mut Vec::<Outcome>::new());
        }
        assert_eq!(Store::open(dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn test_purge() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("store");
        let store = Store::open(&root).unwrap();
        store.add(gif("a"), &mut Vec::<Outcome>::new());

        store.purge().unwrap();
        assert!(!root.exists());
    }
}
