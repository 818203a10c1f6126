//! CLI command integration tests.
//!
//! These tests drive the library calls the CLI commands are built on,
//! against archives and tables on disk. No subprocesses are spawned.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use wildbits::codec::yaz0;
use wildbits::hash::resource_hash;
use wildbits::{
    ArchiveHandle, Endian, NameDictionary, NodeKind, OpenOptions, ResourceSizeIndex,
};

mod common;

use common::{nested_fixture, npc_pack};

/// Writes the nested fixture to a temporary file.
fn fixture_file() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("TitleBG.pack");
    fs::write(&path, nested_fixture()).expect("Failed to write archive");
    (temp_dir, path)
}

// =============================================================================
// List and Info
// =============================================================================

#[test]
fn test_list_tree() {
    let (_dir, path) = fixture_file();
    let archive = ArchiveHandle::open_path(&path, &OpenOptions::default()).unwrap();

    let tree = archive.tree();
    let names: Vec<&str> = tree.iter().map(|n| n.name.as_str()).collect();
    assert!(names.contains(&"Actor"));
    assert!(names.contains(&"Pack"));
    assert!(names.contains(&"Sound"));
    assert!(tree.iter().map(|n| n.total_nodes()).sum::<usize>() > archive.len());
}

#[test]
fn test_list_nonexistent_file() {
    let err = ArchiveHandle::open_path("/nonexistent/path/Bootup.pack", &OpenOptions::default())
        .unwrap_err();
    assert!(matches!(err, wildbits::Error::Io(_)), "Expected Io, got: {:?}", err);
}

#[test]
fn test_info_nested_archive() {
    let (_dir, path) = fixture_file();
    let archive = ArchiveHandle::open_path(&path, &OpenOptions::default()).unwrap();

    let info = archive.entry_info("Actor/Pack/Npc.sbactorpack").unwrap();
    assert_eq!(info.kind, NodeKind::Archive);
    assert!(info.compressed);
    assert!(info.is_archive);
    assert_eq!(info.stored_size, Some(npc_pack().len() as u64));
    assert_eq!(
        info.decompressed_size,
        yaz0::decompressed_size(&npc_pack()).map(u64::from)
    );
    let meta = info.archive.expect("nested archive layout");
    assert_eq!(meta.endian, Endian::Little);
}

#[test]
fn test_info_directory() {
    let (_dir, path) = fixture_file();
    let archive = ArchiveHandle::open_path(&path, &OpenOptions::default()).unwrap();

    let info = archive.entry_info("Actor/Pack").unwrap();
    assert_eq!(info.kind, NodeKind::Directory);
    assert_eq!(info.stored_size, None);
    assert_eq!(info.child_count, 2);
}

#[test]
fn test_info_json_shape() {
    let (_dir, path) = fixture_file();
    let archive = ArchiveHandle::open_path(&path, &OpenOptions::default()).unwrap();

    let info = archive.entry_info("Pack/readme.txt").unwrap();
    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["path"], "Pack/readme.txt");
    assert_eq!(json["stored_size"], 7);
    assert!(json.get("archive").is_none());
}

// =============================================================================
// Get and Edit
// =============================================================================

#[test]
fn test_get_entry_to_file() {
    let (dir, path) = fixture_file();
    let archive = ArchiveHandle::open_path(&path, &OpenOptions::default()).unwrap();

    let out = dir.path().join("Npc.bxml");
    let data = archive
        .read("Actor/Pack/Npc.sbactorpack/Actor/ActorLink/Npc.bxml", true)
        .unwrap();
    fs::write(&out, &data).unwrap();
    assert_eq!(fs::read(&out).unwrap(), b"actor link");
}

#[test]
fn test_get_directory_is_error() {
    let (_dir, path) = fixture_file();
    let archive = ArchiveHandle::open_path(&path, &OpenOptions::default()).unwrap();
    assert!(archive.read("Actor", true).is_err());
}

#[test]
fn test_edit_saves_in_place() {
    let (_dir, path) = fixture_file();
    let mut archive = ArchiveHandle::open_path(&path, &OpenOptions::default()).unwrap();
    let _ = archive
        .rename("Actor/Pack/Enemy.sbactorpack/Actor/Physics/Enemy.bphysics", "Boss.bphysics")
        .unwrap();
    archive.save(&path).unwrap();

    let reopened = ArchiveHandle::open_path(&path, &OpenOptions::default()).unwrap();
    assert!(reopened.contains("Actor/Pack/Enemy.sbactorpack/Actor/Physics/Boss.bphysics"));
}

#[test]
fn test_create_compressed_from_folder() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("source");
    fs::create_dir_all(source.join("Event")).unwrap();
    fs::write(source.join("Event/Demo.bfevfl"), b"flow").unwrap();

    let mut archive = ArchiveHandle::new(Endian::Big, 4);
    let _ = archive.sync_from_folder(&source).unwrap();
    let out = dir.path().join("Demo.sbeventpack");
    fs::write(&out, yaz0::compress(&archive.to_bytes().unwrap())).unwrap();

    let reopened = ArchiveHandle::open_path(&out, &OpenOptions::default()).unwrap();
    assert!(reopened.is_compressed());
    assert_eq!(reopened.endian(), Endian::Big);
    assert_eq!(reopened.read("Event/Demo.bfevfl", true).unwrap(), b"flow");
}

// =============================================================================
// Size tables
// =============================================================================

#[test]
fn test_rstb_with_names_file() {
    let dir = TempDir::new().unwrap();
    let names_path = dir.path().join("names.txt");
    fs::write(
        &names_path,
        "Actor/Pack/Npc.bactorpack\n\n# comment\nModel/Npc.bfres\n",
    )
    .unwrap();
    let dict = NameDictionary::load_path(&names_path).unwrap();
    assert_eq!(dict.len(), 2);

    let mut table = ResourceSizeIndex::new(Endian::Big);
    table.set_size("Actor/Pack/Npc.bactorpack", 1024);
    table.set_hash_size(0x1234_5678, 64);
    let table_path = dir.path().join("ResourceSizeTable.product.srsizetable");
    fs::write(&table_path, yaz0::compress(&table.to_bytes().unwrap())).unwrap();

    let loaded = ResourceSizeIndex::open(&fs::read(&table_path).unwrap()).unwrap();
    let rows: Vec<(String, u32)> = loaded
        .iter()
        .map(|(hash, size)| (dict.display_name(hash), size))
        .collect();
    assert!(rows.contains(&("Actor/Pack/Npc.bactorpack".to_string(), 1024)));
    assert!(rows.contains(&("0x12345678".to_string(), 64)));
    assert_eq!(
        loaded.lookup(resource_hash("Actor/Pack/Npc.bactorpack")),
        Some(1024)
    );
}

#[test]
fn test_rstb_names_file_missing() {
    let err = NameDictionary::load_path("/nonexistent/names.txt").unwrap_err();
    assert!(matches!(err, wildbits::Error::Io(_)), "Expected Io, got: {:?}", err);
}
