//! RSTB resource-size tables.
//!
//! An RSTB maps resource paths to the size the game must reserve when
//! loading them. Most entries are keyed by the CRC-32 of the path; paths
//! whose hash collides with another are stored by name instead.
//!
//! # Format
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0x00 | magic `RSTB` |
//! | 0x04 | u32 hash-entry count |
//! | 0x08 | u32 name-entry count |
//! | 0x0C | hash entries: u32 CRC-32, u32 size |
//! | ... | name entries: 128-byte NUL-padded name, u32 size |
//!
//! Integers are big-endian in Wii U files and little-endian in Switch
//! files. The header carries no byte-order mark; the order is recovered
//! by checking which reading makes the counts fill the file exactly.
//!
//! Hashes are shown by name through a [`NameDictionary`], usually the
//! process-wide one installed with [`install_global`].

mod names;
mod table;

pub use names::{NameDictionary, global, install_global};
pub use table::{MAX_NAME_LEN, ResourceSizeIndex};

/// RSTB magic bytes.
pub const RSTB_MAGIC: &[u8; 4] = b"RSTB";
