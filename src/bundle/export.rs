//! Export: store listing to metadata array or bundle

use crate::filter::Filter;
use crate::model::{write_manifest, ContentId, ExportedMetadata};
use crate::store::Store;
use crate::{Result, CONTENT_EXTENSION, MANIFEST_NAME};
use libflate::gzip;
use std::io::Write;

/// Where the metadata member goes inside a bundle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BundleLayout {
    /// Metadata before content, so readers can stream straight into the store
    #[default]
    MetadataFirst,
    /// Metadata after all content
    MetadataLast,
}

/// What an export produces
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Bundle the content (gzip+tar) instead of writing bare metadata
    pub include_content: bool,
    pub layout: BundleLayout,
}

impl ExportOptions {
    /// A bare JSON metadata array
    pub fn metadata_only() -> Self {
        ExportOptions {
            include_content: false,
            layout: BundleLayout::default(),
        }
    }

    /// A full bundle with content
    pub fn bundle() -> Self {
        ExportOptions {
            include_content: true,
            layout: BundleLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: BundleLayout) -> Self {
        self.layout = layout;
        self
    }
}

/// Export every image passing `filter`
///
/// The filter is applied as given. Callers exporting metadata only usually
/// want a [`crate::RemoteFilter`], since local images cannot be re-fetched.
pub fn export<W: Write>(
    store: &Store,
    writer: W,
    filter: &dyn Filter,
    options: ExportOptions,
) -> Result<()> {
    let images = store.list(filter)?;
    let records: Vec<ExportedMetadata> = images.iter().map(ExportedMetadata::from).collect();

    if !options.include_content {
        write_manifest(writer, &records)?;
        tracing::info!(images = records.len(), "exported metadata");
        return Ok(());
    }

    let mut bundle = BundleWriter::new(writer)?;

    if options.layout == BundleLayout::MetadataFirst {
        bundle.append_manifest(&records)?;
    }

    for mut image in images {
        store.hydrate(&mut image)?;
        bundle.append_content(&image.id, &image.data)?;
    }

    if options.layout == BundleLayout::MetadataLast {
        bundle.append_manifest(&records)?;
    }

    bundle.finish()?;
    tracing::info!(images = records.len(), "exported bundle");
    Ok(())
}

/// Low-level bundle writer
///
/// Members are written in call order; nothing checks that content and
/// metadata agree.
pub struct BundleWriter<W: Write> {
    builder: tar::Builder<gzip::Encoder<W>>,
}

impl<W: Write> BundleWriter<W> {
    pub fn new(writer: W) -> Result<Self> {
        let encoder = gzip::Encoder::new(writer)?;
        Ok(BundleWriter {
            builder: tar::Builder::new(encoder),
        })
    }

    /// Append the metadata member
    pub fn append_manifest(&mut self, records: &[ExportedMetadata]) -> Result<()> {
        let data = serde_json::to_vec(records)?;
        self.append_raw(MANIFEST_NAME, &data)
    }

    /// Append a content member named after `id`
    pub fn append_content(&mut self, id: &ContentId, data: &[u8]) -> Result<()> {
        self.append_raw(&format!("{}.{}", id, CONTENT_EXTENSION), data)
    }

    /// Append an arbitrary member
    pub fn append_raw(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(0);
        self.builder.append_data(&mut header, name, data)?;
        tracing::debug!(member = name, size = data.len(), "wrote bundle member");
        Ok(())
    }

    /// Write the archive trailer and gzip footer, returning the inner writer
    pub fn finish(self) -> Result<W> {
        let encoder = self.builder.into_inner()?;
        Ok(encoder.finish().into_result()?)
    }
}
