//! Round-trip tests for the zip reader against writer-built archives.

mod common;

use std::path::Path;
use std::sync::Arc;

use takein::{LocalFileReader, ZipArchive, ZipError};

use common::ZipWriter;

fn open_archive(path: &Path) -> ZipArchive<LocalFileReader> {
    ZipArchive::new(Arc::new(LocalFileReader::open(path).unwrap()))
}

#[tokio::test]
async fn extracts_stored_and_deflated_entries() {
    let dir = tempfile::tempdir().unwrap();
    let zip_path = dir.path().join("parts.zip");

    let mut writer = ZipWriter::new();
    writer.add_stored("a.txt", b"0123456789");
    writer.add_dir("sub/");
    writer.add_deflated("sub/b.txt", &[b'b'; 20]);
    std::fs::write(&zip_path, writer.finish()).unwrap();

    let archive = open_archive(&zip_path);
    let entries = archive.entries().await.unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].name, "a.txt");
    assert!(entries[1].is_directory);

    let dest = dir.path().join("out");
    let stats = archive.extract_all(&dest).await.unwrap();
    assert_eq!(stats.entries, 3);
    assert_eq!(stats.bytes, 30);
    assert_eq!(std::fs::read(dest.join("a.txt")).unwrap(), b"0123456789");
    assert_eq!(std::fs::read(dest.join("sub/b.txt")).unwrap(), vec![b'b'; 20]);
}

#[tokio::test]
async fn creates_parent_directories_without_explicit_entries() {
    let dir = tempfile::tempdir().unwrap();
    let zip_path = dir.path().join("deep.zip");

    let mut writer = ZipWriter::new();
    writer.add_stored("a/b/c.txt", b"deep");
    std::fs::write(&zip_path, writer.finish()).unwrap();

    let dest = dir.path().join("out");
    open_archive(&zip_path).extract_all(&dest).await.unwrap();
    assert_eq!(std::fs::read(dest.join("a/b/c.txt")).unwrap(), b"deep");
}

#[tokio::test]
async fn finds_the_record_behind_an_archive_comment() {
    let dir = tempfile::tempdir().unwrap();
    let zip_path = dir.path().join("commented.zip");

    let mut writer = ZipWriter::new();
    writer.add_stored("a.txt", b"hello");
    std::fs::write(&zip_path, writer.finish_with_comment(b"built by a test")).unwrap();

    let entries = open_archive(&zip_path).entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].uncompressed_size, 5);
}

#[tokio::test]
async fn rejects_files_that_are_not_archives() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not-a.zip");
    std::fs::write(&path, b"this is just text, long enough to scan through").unwrap();

    let err = open_archive(&path).entries().await.unwrap_err();
    assert!(matches!(err, ZipError::NotAnArchive));
}

#[tokio::test]
async fn names_the_entry_with_an_unsupported_method() {
    let dir = tempfile::tempdir().unwrap();
    let zip_path = dir.path().join("exotic.zip");

    let mut writer = ZipWriter::new();
    writer.add_with_method("packed.bin", 14, b"lzma'd"); // LZMA
    std::fs::write(&zip_path, writer.finish()).unwrap();

    let dest = dir.path().join("out");
    let err = open_archive(&zip_path).extract_all(&dest).await.unwrap_err();
    match err {
        ZipError::UnsupportedCompression { name, method } => {
            assert_eq!(name, "packed.bin");
            assert_eq!(method, 14);
        }
        other => panic!("expected UnsupportedCompression, got {other:?}"),
    }
}

#[tokio::test]
async fn refuses_entries_that_escape_the_destination() {
    let dir = tempfile::tempdir().unwrap();
    let zip_path = dir.path().join("slip.zip");

    let mut writer = ZipWriter::new();
    writer.add_stored("../outside.txt", b"nope");
    std::fs::write(&zip_path, writer.finish()).unwrap();

    let dest = dir.path().join("out");
    let err = open_archive(&zip_path).extract_all(&dest).await.unwrap_err();
    assert!(matches!(err, ZipError::UnsafeEntryName(_)));
    assert!(!dir.path().join("outside.txt").exists());
}
