//! Import of loose image files from a directory tree

use super::{ImportSummary, Tally};
use crate::model::ImageEntry;
use crate::store::{Outcome, OutcomeSink, Store};
use crate::Result;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;
use walkdir::WalkDir;

/// File extensions picked up by directory import
static EXTENSION_WHITELIST: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["gif", "jpeg", "jpg", "png", "webp"].into_iter().collect());

/// Whether a file is a candidate for import, judged by its extension
pub fn is_whitelisted(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| EXTENSION_WHITELIST.contains(ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Import every whitelisted file under `root`
///
/// Each image is tagged with its file name. Subdirectories are only entered
/// when `recursive` is set.
pub fn import_directory(
    store: &Store,
    root: &Path,
    recursive: bool,
    sink: &mut dyn OutcomeSink,
) -> Result<ImportSummary> {
    // Surface an unreadable root as a failure of the whole import
    std::fs::read_dir(root)?;

    let mut tally = Tally::new(sink);
    let max_depth = if recursive { usize::MAX } else { 1 };

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let subject = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                tally.report(Outcome::error(subject, e.to_string()));
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_whitelisted(entry.path()) {
            continue;
        }

        let image = match ImageEntry::from_file(entry.path()) {
            Ok(image) => image,
            Err(e) => {
                tally.report(Outcome::error(entry.path().display().to_string(), e.to_string()));
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();
        store.add(image.with_tags(vec![name]), &mut tally);
    }

    store.sync()?;
    Ok(tally.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::NullFilter;
    use tempfile::tempdir;

    #[test]
    fn test_whitelist() {
        assert!(is_whitelisted(Path::new("a/b/cat.gif")));
        assert!(is_whitelisted(Path::new("cat.JPG")));
        assert!(is_whitelisted(Path::new("cat.webp")));
        assert!(!is_whitelisted(Path::new("notes.txt")));
        assert!(!is_whitelisted(Path::new("Makefile")));
    }

    #[test]
    fn test_import_directory() {
        let src = tempdir().unwrap();
        std::fs::write(src.path().join("one.gif"), b"GIF89a-one").unwrap();
        std::fs::write(src.path().join("two.png"), b"\x89PNG\r\n\x1a\n-two").unwrap();
        std::fs::write(src.path().join("skip.txt"), b"not an image").unwrap();
        std::fs::create_dir(src.path().join("nested")).unwrap();
        std::fs::write(src.path().join("nested").join("three.gif"), b"GIF89a-three").unwrap();

        let dst = tempdir().unwrap();
        let store = Store::open(dst.path()).unwrap();
        let mut outcomes: Vec<Outcome> = Vec::new();

        let flat = import_directory(&store, src.path(), false, &mut outcomes).unwrap();
        assert_eq!(flat.added, 2);

        let deep = import_directory(&store, src.path(), true, &mut outcomes).unwrap();
        assert_eq!(deep.added, 1);
        assert_eq!(deep.duplicates, 2);

        let tagged = store.list(&NullFilter).unwrap();
        assert!(tagged
            .iter()
            .any(|image| image.tags == vec!["three.gif".to_string()]));
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dst = tempdir().unwrap();
        let store = Store::open(dst.path()).unwrap();
        let mut outcomes: Vec<Outcome> = Vec::new();

        let result = import_directory(&store, &dst.path().join("missing"), false, &mut outcomes);
        assert!(result.is_err());
    }
}
