//! SARC container format: constants, metadata, and the flat-level codec.
//!
//! A SARC archive stores a flat list of `name -> bytes` entries. Names may
//! contain `/`, which the tree layer presents as directories. This module
//! knows nothing about nesting; it parses and writes exactly one level.
//!
//! - [`parser::parse`] / [`parser::try_parse`] turn bytes into [`SarcEntries`]
//! - [`writer::write`] turns entries plus [`ArchiveMeta`] back into bytes

pub mod detect;
pub mod parser;
pub mod reader;
pub mod writer;

use serde::Serialize;

/// SARC header magic.
pub const SARC_MAGIC: &[u8; 4] = b"SARC";

/// SFAT (file allocation table) header magic.
pub const SFAT_MAGIC: &[u8; 4] = b"SFAT";

/// SFNT (file name table) header magic.
pub const SFNT_MAGIC: &[u8; 4] = b"SFNT";

/// Size of the SARC header in bytes.
pub const SARC_HEADER_SIZE: usize = 0x14;

/// Size of the SFAT header in bytes.
pub const SFAT_HEADER_SIZE: usize = 0x0C;

/// Size of one SFAT node in bytes.
pub const SFAT_NODE_SIZE: usize = 0x10;

/// Size of the SFNT header in bytes.
pub const SFNT_HEADER_SIZE: usize = 0x08;

/// Format version written into the SARC header.
pub const SARC_VERSION: u16 = 0x0100;

/// Attribute flag marking an SFAT node that carries a name offset.
pub const NODE_HAS_NAME: u32 = 0x0100_0000;

/// Byte-order mark value as stored in the header.
pub const BOM: u16 = 0xFEFF;

/// Byte order of a container or size table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    /// Big-endian (Wii U).
    Big,
    /// Little-endian (Switch).
    Little,
}

impl Endian {
    /// Reads a `u16` from the first two bytes of `bytes`.
    #[inline]
    pub fn u16_from(self, bytes: [u8; 2]) -> u16 {
        match self {
            Endian::Big => u16::from_be_bytes(bytes),
            Endian::Little => u16::from_le_bytes(bytes),
        }
    }

    /// Reads a `u32` from four bytes.
    #[inline]
    pub fn u32_from(self, bytes: [u8; 4]) -> u32 {
        match self {
            Endian::Big => u32::from_be_bytes(bytes),
            Endian::Little => u32::from_le_bytes(bytes),
        }
    }

    /// Encodes a `u16` in this byte order.
    #[inline]
    pub fn u16_bytes(self, value: u16) -> [u8; 2] {
        match self {
            Endian::Big => value.to_be_bytes(),
            Endian::Little => value.to_le_bytes(),
        }
    }

    /// Encodes a `u32` in this byte order.
    #[inline]
    pub fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self {
            Endian::Big => value.to_be_bytes(),
            Endian::Little => value.to_le_bytes(),
        }
    }

    /// Detects the byte order from a stored BOM.
    pub fn from_bom(bytes: [u8; 2]) -> Option<Self> {
        match bytes {
            [0xFE, 0xFF] => Some(Endian::Big),
            [0xFF, 0xFE] => Some(Endian::Little),
            _ => None,
        }
    }

    /// Returns `true` for big-endian.
    pub fn is_big(self) -> bool {
        matches!(self, Endian::Big)
    }
}

impl std::fmt::Display for Endian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endian::Big => write!(f, "big-endian"),
            Endian::Little => write!(f, "little-endian"),
        }
    }
}

/// Writer layout mode.
///
/// `New` is what current tools emit; `Legacy` reproduces the layout of
/// older first-party archives, which use a larger minimum alignment and
/// apply embedded-header alignment to every payload, nested archives
/// included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveMode {
    /// Modern layout, minimum alignment 4.
    New,
    /// Legacy layout, minimum alignment 8.
    Legacy,
}

impl ArchiveMode {
    /// Selects the mode for a caller-chosen alignment.
    ///
    /// An alignment of 4 selects `New`; anything else selects `Legacy`.
    pub fn for_alignment(alignment: u32) -> Self {
        if alignment == 4 {
            ArchiveMode::New
        } else {
            ArchiveMode::Legacy
        }
    }

    /// Returns the minimum payload alignment of this mode.
    pub fn min_alignment(self) -> u32 {
        match self {
            ArchiveMode::New => 4,
            ArchiveMode::Legacy => 8,
        }
    }
}

/// Layout metadata carried by every archive level.
///
/// Fixed when an archive is opened or created and reused on every re-save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ArchiveMeta {
    /// Byte order of all header fields.
    pub endian: Endian,
    /// Payload alignment in bytes (a power of two).
    pub alignment: u32,
    /// Writer layout mode.
    pub mode: ArchiveMode,
}

impl ArchiveMeta {
    /// Creates metadata for a new archive.
    ///
    /// The alignment is rounded up to a power of two and to the mode's
    /// minimum; the mode follows [`ArchiveMode::for_alignment`].
    ///
    /// ```
    /// use wildbits::format::{ArchiveMeta, ArchiveMode, Endian};
    ///
    /// let meta = ArchiveMeta::new(Endian::Big, 4);
    /// assert_eq!(meta.mode, ArchiveMode::New);
    ///
    /// let meta = ArchiveMeta::new(Endian::Little, 6);
    /// assert_eq!(meta.alignment, 8);
    /// assert_eq!(meta.mode, ArchiveMode::Legacy);
    /// ```
    pub fn new(endian: Endian, alignment: u32) -> Self {
        let mode = ArchiveMode::for_alignment(alignment);
        Self {
            endian,
            alignment: effective_alignment(alignment, mode),
            mode,
        }
    }
}

impl Default for ArchiveMeta {
    fn default() -> Self {
        Self::new(Endian::Little, 4)
    }
}

/// Rounds an alignment up to a power of two no smaller than the mode minimum.
pub(crate) fn effective_alignment(alignment: u32, mode: ArchiveMode) -> u32 {
    alignment
        .max(mode.min_alignment())
        .checked_next_power_of_two()
        .unwrap_or(mode.min_alignment())
}

/// One flat entry of a single archive level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SarcEntry {
    /// Stored name, possibly containing `/`.
    pub name: String,
    /// Stored bytes, verbatim (possibly Yaz0-compressed).
    pub data: Vec<u8>,
}

impl SarcEntry {
    /// Creates an entry.
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// The result of parsing one archive level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SarcEntries {
    /// Layout metadata detected from the header and offsets.
    pub meta: ArchiveMeta,
    /// Entries in on-disk (hash) order.
    pub entries: Vec<SarcEntry>,
}
