//! CLI Integration Tests
//!
//! These tests verify that the CLI commands work correctly end-to-end.
//! They test the actual binary behavior, not just the library.
//!
//! Run with:
//! ```bash
//! cargo test --test cli_integration
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

/// Get the path to the built binary
fn gif_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_gif"))
}

/// Run gif command and return (stdout, stderr, success)
fn run_gif(args: &[&str], store: &Path) -> (String, String, bool) {
    let output = Command::new(gif_binary())
        .arg("--store")
        .arg(store)
        .args(args)
        .output()
        .expect("Failed to execute gif");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn write_images(dir: &Path) {
    std::fs::write(dir.join("one.gif"), b"GIF89a-cli-one").unwrap();
    std::fs::write(dir.join("two.png"), b"\x89PNG\r\n\x1a\n-cli-two").unwrap();
    std::fs::write(dir.join("notes.txt"), b"ignored").unwrap();
}

// ============================================================================
// Import / List
// ============================================================================

#[test]
fn test_cli_import_directory_and_list() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("store");
    let images = dir.path().join("images");
    std::fs::create_dir(&images).unwrap();
    write_images(&images);

    let (stdout, _stderr, success) = run_gif(&["import", images.to_str().unwrap()], &store);
    assert!(success, "import should succeed");
    assert_eq!(stdout.matches("[added]").count(), 2);

    let (stdout, _stderr, success) = run_gif(&["-f", "json", "list"], &store);
    assert!(success, "list should succeed");
    assert!(stdout.contains("\"count\":2"), "got: {}", stdout);

    let (stdout, _stderr, _) = run_gif(&["-f", "json", "list", "--type", "png"], &store);
    assert!(stdout.contains("\"count\":1"), "got: {}", stdout);
}

#[test]
fn test_cli_add_file_with_tags() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("store");
    let file = dir.path().join("cat.gif");
    std::fs::write(&file, b"GIF89a-tagged").unwrap();

    let (stdout, _stderr, success) = run_gif(
        &["add", file.to_str().unwrap(), "--tag", "cat", "--tag", "funny"],
        &store,
    );
    assert!(success, "add should succeed");
    assert!(stdout.starts_with("[added]"));

    let (stdout, _stderr, _) = run_gif(&["list", "--tag", "funny"], &store);
    assert!(stdout.contains("1 images"), "got: {}", stdout);
    assert!(stdout.contains("cat,funny"));
}

// ============================================================================
// Export / Import round trip
// ============================================================================

#[test]
fn test_cli_bundle_round_trip() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source");
    let target = dir.path().join("target");
    let images = dir.path().join("images");
    let bundle = dir.path().join("backup.gifb");
    std::fs::create_dir(&images).unwrap();
    write_images(&images);

    run_gif(&["import", images.to_str().unwrap()], &source);

    let (_stdout, _stderr, success) =
        run_gif(&["export", "--output", bundle.to_str().unwrap()], &source);
    assert!(success, "export should succeed");
    assert!(bundle.exists());

    let (stdout, _stderr, success) = run_gif(&["import", bundle.to_str().unwrap()], &target);
    assert!(success, "import should succeed");
    assert_eq!(stdout.matches("[added]").count(), 2);

    let (paths, _stderr, _) = run_gif(&["paths"], &target);
    assert_eq!(paths.lines().count(), 2);
    for line in paths.lines() {
        assert!(Path::new(line).exists(), "missing {}", line);
    }
}

#[test]
fn test_cli_metadata_export_skips_local_images() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("store");
    let images = dir.path().join("images");
    std::fs::create_dir(&images).unwrap();
    write_images(&images);
    run_gif(&["import", images.to_str().unwrap()], &store);

    let (stdout, _stderr, success) = run_gif(&["export"], &store);
    assert!(success, "export should succeed");
    assert_eq!(stdout.trim(), "[]");
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_cli_import_unrecognized_file_fails() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("store");
    let junk = dir.path().join("junk.bin");
    std::fs::write(&junk, b"this is neither json nor gzip").unwrap();

    let (_stdout, stderr, success) = run_gif(&["import", junk.to_str().unwrap()], &store);
    assert!(!success, "import of junk should fail");
    assert!(stderr.contains("Unrecognized import format"), "got: {}", stderr);
}

#[test]
fn test_cli_purge_requires_confirmation() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("store");
    let images = dir.path().join("images");
    std::fs::create_dir(&images).unwrap();
    write_images(&images);
    run_gif(&["import", images.to_str().unwrap()], &store);

    let (_stdout, _stderr, success) = run_gif(&["purge"], &store);
    assert!(!success, "purge without --yes should fail");
    assert!(store.exists());

    let (_stdout, _stderr, success) = run_gif(&["purge", "--yes"], &store);
    assert!(success, "purge should succeed");
    assert!(!store.exists());
}
