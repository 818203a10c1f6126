//! Integration tests for extracting to and syncing from host folders.

use std::fs;

use tempfile::TempDir;
use wildbits::fs::collect_folder;
use wildbits::{ArchiveHandle, ArchivePath, Endian, Error, validate_extract_path};

mod common;

use common::{npc_pack, open, open_fixture, sarc};

#[test]
fn test_extract_writes_stored_bytes() {
    let archive = open_fixture();
    let dir = TempDir::new().unwrap();

    let result = archive.extract_to(dir.path()).unwrap();
    assert_eq!(result.files_written, 4);

    // Nested archives are written whole, still compressed
    assert_eq!(
        fs::read(dir.path().join("Actor/Pack/Npc.sbactorpack")).unwrap(),
        npc_pack()
    );
    assert_eq!(
        fs::read(dir.path().join("Pack/readme.txt")).unwrap(),
        b"read me"
    );
}

#[test]
fn test_unsplittable_names_survive_and_are_skipped_on_extract() {
    let bytes = sarc(
        Endian::Little,
        4,
        &[("/Root/lead.bin", b"lead"), ("Pack/readme.txt", b"read me")],
    );
    let mut archive = open(&bytes);
    assert_eq!(archive.len(), 2);

    let _ = archive.rename("Pack/readme.txt", "notes.txt").unwrap();
    let reopened = open(&archive.to_bytes().unwrap());
    let names: Vec<String> = reopened
        .root()
        .flatten()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert!(names.contains(&"/Root/lead.bin".to_string()), "got: {:?}", names);
    assert!(names.contains(&"Pack/notes.txt".to_string()), "got: {:?}", names);

    let dir = TempDir::new().unwrap();
    let result = reopened.extract_to(dir.path()).unwrap();
    assert_eq!(result.files_written, 1);
    assert_eq!(result.files_skipped, 1);
    assert!(dir.path().join("Pack/notes.txt").exists());
}

#[test]
fn test_extract_then_sync_roundtrip() {
    let mut archive = open_fixture();
    let dir = TempDir::new().unwrap();
    let _ = archive.extract_to(dir.path()).unwrap();

    fs::write(dir.path().join("Pack/readme.txt"), b"edited").unwrap();
    fs::create_dir_all(dir.path().join("Text")).unwrap();
    fs::write(dir.path().join("Text/msg.txt"), b"new message").unwrap();

    let result = archive.sync_from_folder(dir.path()).unwrap();
    assert_eq!(result.entries_added, 1);
    assert_eq!(result.entries_replaced, 4);

    let reopened = open(&archive.to_bytes().unwrap());
    assert_eq!(reopened.read("Pack/readme.txt", true).unwrap(), b"edited");
    assert_eq!(reopened.read("Text/msg.txt", true).unwrap(), b"new message");
    assert_eq!(
        reopened
            .read("Actor/Pack/Npc.sbactorpack/Actor/ActorLink/Npc.bxml", true)
            .unwrap(),
        b"actor link"
    );
}

#[test]
fn test_sync_into_nested_archive() {
    let mut archive = open_fixture();
    let dir = TempDir::new().unwrap();
    let target = dir
        .path()
        .join("Actor/Pack/Npc.sbactorpack/Model");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("Npc.bfres"), b"new model").unwrap();

    let result = archive.sync_from_folder(dir.path()).unwrap();
    assert_eq!(result.entries_replaced, 1);
    assert_eq!(result.archives_rebuilt, 1);

    let reopened = open(&archive.to_bytes().unwrap());
    assert_eq!(
        reopened
            .read("Actor/Pack/Npc.sbactorpack/Model/Npc.bfres", true)
            .unwrap(),
        b"new model"
    );
    assert!(reopened.get("Actor/Pack/Npc.sbactorpack").unwrap().is_compressed());
}

#[test]
fn test_sync_never_deletes() {
    let mut archive = open_fixture();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("extra.bin"), b"extra").unwrap();

    let _ = archive.sync_from_folder(dir.path()).unwrap();
    assert!(archive.contains("Pack/readme.txt"));
    assert!(archive.contains("Sound/Voice.bars"));
    assert!(archive.contains("extra.bin"));
}

#[test]
fn test_sync_conflict_is_atomic() {
    let mut archive = open_fixture();
    let before = archive.to_bytes().unwrap();

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), b"fine").unwrap();
    // A folder where the archive has a file
    fs::create_dir_all(dir.path().join("Pack/readme.txt")).unwrap();
    fs::write(dir.path().join("Pack/readme.txt/inner.txt"), b"bad").unwrap();

    let err = archive.sync_from_folder(dir.path()).unwrap_err();
    assert!(
        matches!(err, Error::NotADirectory { .. }),
        "Expected NotADirectory, got: {:?}",
        err
    );
    assert_eq!(archive.to_bytes().unwrap(), before);
    assert!(!archive.contains("a.txt"));
}

#[test]
fn test_collect_folder_missing_dir() {
    let dir = TempDir::new().unwrap();
    let err = collect_folder(&dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, Error::Io(_)), "Expected Io, got: {:?}", err);
}

#[test]
fn test_create_from_folder() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("Map")).unwrap();
    fs::write(dir.path().join("Map/A.smubin"), b"a").unwrap();
    fs::write(dir.path().join("Map/B.smubin"), b"b").unwrap();

    let mut archive = ArchiveHandle::new(Endian::Little, 4);
    let result = archive.sync_from_folder(dir.path()).unwrap();
    assert_eq!(result.entries_added, 2);

    let reopened = open(&archive.to_bytes().unwrap());
    assert_eq!(reopened.read("Map/B.smubin", true).unwrap(), b"b");
}

#[test]
fn test_validate_extract_path_stays_inside() {
    let dir = TempDir::new().unwrap();
    let path = ArchivePath::new("Model/Npc.bfres").unwrap();
    let full = validate_extract_path(&path, dir.path()).unwrap();
    assert!(full.starts_with(dir.path()));

    let path = ArchivePath::new("Model\\..\\..\\evil").unwrap();
    assert!(matches!(
        validate_extract_path(&path, dir.path()),
        Err(Error::PathTraversal { .. })
    ));
}
