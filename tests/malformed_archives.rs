//! Tests for malformed and corrupted archive handling.
//!
//! Every failure must be reported as an error of the right kind; nothing
//! here may panic.

mod common;

use wildbits::codec::yaz0;
use wildbits::rstb::ResourceSizeIndex;
use wildbits::{ArchiveHandle, Endian, Error, OpenOptions};

use common::sarc;

fn open_err(bytes: &[u8]) -> Error {
    match ArchiveHandle::open(bytes, &OpenOptions::default()) {
        Ok(_) => panic!("Expected error for {} malformed bytes", bytes.len()),
        Err(e) => e,
    }
}

fn valid() -> Vec<u8> {
    sarc(
        Endian::Little,
        4,
        &[("Model/Npc.bfres", b"model data"), ("readme.txt", b"hi")],
    )
}

// =============================================================================
// Header corruption
// =============================================================================

#[test]
fn test_empty_input() {
    let err = open_err(&[]);
    assert!(
        matches!(err, Error::InvalidFormat(_)),
        "Expected InvalidFormat, got: {:?}",
        err
    );
}

#[test]
fn test_wrong_magic() {
    let mut bytes = valid();
    bytes[..4].copy_from_slice(b"SZRC");
    assert!(open_err(&bytes).is_format_error());
}

#[test]
fn test_bad_byte_order_mark() {
    let mut bytes = valid();
    bytes[6] = 0x12;
    bytes[7] = 0x34;
    let err = open_err(&bytes);
    assert!(
        matches!(err, Error::CorruptHeader { offset: 6, .. }),
        "Expected CorruptHeader at BOM, got: {:?}",
        err
    );
}

#[test]
fn test_declared_size_too_large() {
    let mut bytes = valid();
    let len = bytes.len() as u32 + 100;
    bytes[8..12].copy_from_slice(&len.to_le_bytes());
    assert!(matches!(open_err(&bytes), Error::CorruptHeader { .. }));
}

#[test]
fn test_missing_sfat() {
    let mut bytes = valid();
    bytes[0x14..0x18].copy_from_slice(b"XXXX");
    assert!(matches!(open_err(&bytes), Error::CorruptHeader { .. }));
}

#[test]
fn test_node_count_past_end() {
    let mut bytes = valid();
    // SFAT node count
    bytes[0x1A..0x1C].copy_from_slice(&0xFFFFu16.to_le_bytes());
    assert!(open_err(&bytes).is_format_error());
}

#[test]
fn test_every_truncation_fails_cleanly() {
    let bytes = valid();
    for len in 0..bytes.len() {
        let err = open_err(&bytes[..len]);
        assert!(
            err.is_format_error(),
            "truncated to {} bytes: expected format error, got: {:?}",
            len,
            err
        );
    }
}

// =============================================================================
// Yaz0 corruption
// =============================================================================

#[test]
fn test_truncated_yaz0_root() {
    let packed = yaz0::compress(&valid());
    let err = open_err(&packed[..packed.len() / 2]);
    assert!(
        matches!(err, Error::Decompression { .. }),
        "Expected Decompression, got: {:?}",
        err
    );
}

#[test]
fn test_corrupt_nested_yaz0_is_reported() {
    let inner = yaz0::compress(&valid());
    let broken = &inner[..inner.len() - 8];
    let bytes = sarc(Endian::Little, 4, &[("Pack/Inner.sbactorpack", broken)]);
    let err = open_err(&bytes);
    assert!(
        matches!(&err, Error::Decompression { reason } if reason.contains("Pack/Inner.sbactorpack")),
        "Expected Decompression naming the entry, got: {:?}",
        err
    );
}

#[test]
fn test_corrupt_nested_sarc_stays_file() {
    let mut inner = valid();
    inner[0x14..0x18].copy_from_slice(b"XXXX");
    let bytes = sarc(Endian::Big, 4, &[("Broken.pack", inner.as_slice())]);
    let archive = ArchiveHandle::open(&bytes, &OpenOptions::default()).unwrap();
    assert_eq!(
        archive.get("Broken.pack").unwrap().kind(),
        wildbits::NodeKind::File
    );
    assert_eq!(archive.read("Broken.pack", true).unwrap(), inner);
}

// =============================================================================
// Size tables
// =============================================================================

#[test]
fn test_rstb_garbage() {
    for bytes in [&b""[..], b"RST", b"RSTB", b"RSTB\x00\x00\x00\x01\x00\x00\x00\x00"] {
        let err = ResourceSizeIndex::open(bytes).unwrap_err();
        assert!(
            err.is_format_error() || err.is_index_error(),
            "Expected format or index error for {:?}, got: {:?}",
            bytes,
            err
        );
    }
}
