//! Composable selection over a store listing
//!
//! Filters are decorators: each one wraps an inner filter, runs it first and
//! then narrows, reorders or truncates its output.
//!
//! ```ignore
//! let filter = RemoteFilter::new(TypeFilter::new(NullFilter, Some("png")));
//! let pngs_from_the_web = store.list(&filter)?;
//! ```

use crate::model::ImageEntry;
use std::cmp::Ordering;

/// A transform over a sequence of entries
pub trait Filter {
    fn apply(&self, images: Vec<ImageEntry>) -> Vec<ImageEntry>;
}

impl<F: Filter + ?Sized> Filter for Box<F> {
    fn apply(&self, images: Vec<ImageEntry>) -> Vec<ImageEntry> {
        (**self).apply(images)
    }
}

impl<F: Filter + ?Sized> Filter for &F {
    fn apply(&self, images: Vec<ImageEntry>) -> Vec<ImageEntry> {
        (**self).apply(images)
    }
}

/// Passes everything through unchanged
#[derive(Clone, Copy, Debug, Default)]
pub struct NullFilter;

impl Filter for NullFilter {
    fn apply(&self, images: Vec<ImageEntry>) -> Vec<ImageEntry> {
        images
    }
}

/// Keeps only images with a source URL
pub struct RemoteFilter {
    inner: Box<dyn Filter>,
}

impl RemoteFilter {
    pub fn new(inner: impl Filter + 'static) -> Self {
        RemoteFilter {
            inner: Box::new(inner),
        }
    }
}

impl Filter for RemoteFilter {
    fn apply(&self, images: Vec<ImageEntry>) -> Vec<ImageEntry> {
        self.inner
            .apply(images)
            .into_iter()
            .filter(ImageEntry::is_remote)
            .collect()
    }
}

/// Keeps only images of one file type
///
/// A missing or empty type means no restriction.
pub struct TypeFilter {
    inner: Box<dyn Filter>,
    file_type: Option<String>,
}

impl TypeFilter {
    pub fn new(inner: impl Filter + 'static, file_type: Option<impl Into<String>>) -> Self {
        TypeFilter {
            inner: Box::new(inner),
            file_type: file_type.map(Into::into).filter(|t| !t.is_empty()),
        }
    }
}

impl Filter for TypeFilter {
    fn apply(&self, images: Vec<ImageEntry>) -> Vec<ImageEntry> {
        let images = self.inner.apply(images);
        match &self.file_type {
            Some(file_type) => images
                .into_iter()
                .filter(|image| &image.file_type == file_type)
                .collect(),
            None => images,
        }
    }
}

/// Keeps only images carrying a tag
pub struct TagFilter {
    inner: Box<dyn Filter>,
    tag: String,
}

impl TagFilter {
    pub fn new(inner: impl Filter + 'static, tag: impl Into<String>) -> Self {
        TagFilter {
            inner: Box::new(inner),
            tag: tag.into(),
        }
    }
}

impl Filter for TagFilter {
    fn apply(&self, images: Vec<ImageEntry>) -> Vec<ImageEntry> {
        self.inner
            .apply(images)
            .into_iter()
            .filter(|image| image.tags.iter().any(|t| t == &self.tag))
            .collect()
    }
}

/// Sort key for [`OrderAndLimit`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Order {
    /// Most recently added first
    #[default]
    Newest,
    /// Least recently added first
    Oldest,
    /// Biggest content first
    Largest,
}

impl Order {
    fn compare(&self, a: &ImageEntry, b: &ImageEntry) -> Ordering {
        let primary = match self {
            Order::Newest => b.added_at.cmp(&a.added_at),
            Order::Oldest => a.added_at.cmp(&b.added_at),
            Order::Largest => b.size.cmp(&a.size),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

impl std::str::FromStr for Order {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Order::Newest),
            "oldest" => Ok(Order::Oldest),
            "largest" => Ok(Order::Largest),
            other => Err(format!("unknown order: {}", other)),
        }
    }
}

/// Sorts and truncates; a limit of 0 means unlimited
pub struct OrderAndLimit {
    inner: Box<dyn Filter>,
    order: Order,
    limit: usize,
}

impl OrderAndLimit {
    pub fn new(inner: impl Filter + 'static, order: Order, limit: usize) -> Self {
        OrderAndLimit {
            inner: Box::new(inner),
            order,
            limit,
        }
    }
}

impl Filter for OrderAndLimit {
    fn apply(&self, images: Vec<ImageEntry>) -> Vec<ImageEntry> {
        let mut images = self.inner.apply(images);
        images.sort_by(|a, b| self.order.compare(a, b));
        if self.limit > 0 {
            images.truncate(self.limit);
        }
        images
    }
}
