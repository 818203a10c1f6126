//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use wildbits::codec::yaz0;
use wildbits::format::writer::write;
use wildbits::format::{ArchiveMeta, SarcEntry};
use wildbits::{ArchiveHandle, Endian, OpenOptions};

/// Serializes `entries` as one SARC level.
pub fn sarc(endian: Endian, alignment: u32, entries: &[(&str, &[u8])]) -> Vec<u8> {
    let entries: Vec<SarcEntry> = entries
        .iter()
        .map(|(name, data)| SarcEntry::new(*name, *data))
        .collect();
    write(&entries, &ArchiveMeta::new(endian, alignment)).expect("Failed to write SARC")
}

/// Builds a two-level fixture.
///
/// ```text
/// Actor/Pack/Npc.sbactorpack      Yaz0 archive (little-endian)
///   Actor/ActorLink/Npc.bxml
///   Model/Npc.bfres
/// Actor/Pack/Enemy.sbactorpack    plain archive (big-endian)
///   Actor/Physics/Enemy.bphysics
/// Pack/readme.txt
/// Sound/Voice.bars                Yaz0 file
/// ```
pub fn nested_fixture() -> Vec<u8> {
    let npc = npc_pack();
    let enemy = enemy_pack();
    let voice = voice_bars();
    sarc(
        Endian::Little,
        4,
        &[
            ("Actor/Pack/Npc.sbactorpack", npc.as_slice()),
            ("Actor/Pack/Enemy.sbactorpack", enemy.as_slice()),
            ("Pack/readme.txt", b"read me"),
            ("Sound/Voice.bars", voice.as_slice()),
        ],
    )
}

/// Stored bytes of the compressed nested archive in [`nested_fixture`].
pub fn npc_pack() -> Vec<u8> {
    yaz0::compress(&sarc(
        Endian::Little,
        4,
        &[
            ("Actor/ActorLink/Npc.bxml", b"actor link"),
            ("Model/Npc.bfres", &[0x42; 300]),
        ],
    ))
}

/// Stored bytes of the uncompressed nested archive in [`nested_fixture`].
pub fn enemy_pack() -> Vec<u8> {
    sarc(
        Endian::Big,
        8,
        &[("Actor/Physics/Enemy.bphysics", b"physics!")],
    )
}

/// Stored bytes of the compressed plain file in [`nested_fixture`].
pub fn voice_bars() -> Vec<u8> {
    yaz0::compress(b"BARS voice data voice data voice data")
}

/// Opens `bytes` with default options.
pub fn open(bytes: &[u8]) -> ArchiveHandle {
    ArchiveHandle::open(bytes, &OpenOptions::default()).expect("Failed to open archive")
}

/// Opens [`nested_fixture`].
pub fn open_fixture() -> ArchiveHandle {
    open(&nested_fixture())
}
