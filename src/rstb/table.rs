use std::collections::BTreeMap;

use super::RSTB_MAGIC;
use super::names;
use crate::codec::{unwrap_yaz0, yaz0};
use crate::format::Endian;
use crate::format::reader::ByteReader;
use crate::hash::resource_hash;
use crate::{Error, Result};

const HEADER_SIZE: usize = 12;
const HASH_ENTRY_SIZE: usize = 8;
const NAME_FIELD_SIZE: usize = 128;
const NAME_ENTRY_SIZE: usize = NAME_FIELD_SIZE + 4;

/// Longest name the name section can hold, leaving room for the NUL.
pub const MAX_NAME_LEN: usize = NAME_FIELD_SIZE - 1;

/// A resource-size table.
///
/// Sizes are kept in two maps: the hash table, keyed by the CRC-32 of the
/// resource path, and the name table for paths whose hash collides with
/// another resource. Both are ordered, so iteration and serialization are
/// always sorted.
///
/// A table loaded from Yaz0 input is written back compressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSizeIndex {
    endian: Endian,
    compressed: bool,
    hashes: BTreeMap<u32, u32>,
    names: BTreeMap<String, u32>,
}

impl ResourceSizeIndex {
    /// Creates an empty table written in `endian` byte order.
    pub fn new(endian: Endian) -> Self {
        Self {
            endian,
            compressed: false,
            hashes: BTreeMap::new(),
            names: BTreeMap::new(),
        }
    }

    /// Parses a table, decompressing Yaz0 input first.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidFormat`] if the magic is not `RSTB`.
    /// - [`Error::TruncatedTable`] if neither byte order makes the declared
    ///   entry counts fill the buffer.
    pub fn open(data: &[u8]) -> Result<Self> {
        let (data, compressed) = unwrap_yaz0(data)?;
        let data = data.as_ref();
        if data.get(..4) != Some(&RSTB_MAGIC[..]) {
            return Err(Error::InvalidFormat("missing RSTB magic".into()));
        }

        let endian = detect_endian(data)?;
        let reader = ByteReader::for_table(data, endian);
        let hash_count = reader.u32_at(4)? as usize;
        let name_count = reader.u32_at(8)? as usize;

        let mut table = Self::new(endian);
        table.compressed = compressed;
        let mut offset = HEADER_SIZE;
        for _ in 0..hash_count {
            let hash = reader.u32_at(offset)?;
            let size = reader.u32_at(offset + 4)?;
            table.hashes.insert(hash, size);
            offset += HASH_ENTRY_SIZE;
        }
        for _ in 0..name_count {
            let field = reader.bytes_at(offset, NAME_FIELD_SIZE)?;
            let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
            let name = String::from_utf8_lossy(&field[..end]).into_owned();
            let size = reader.u32_at(offset + NAME_FIELD_SIZE)?;
            table.names.insert(name, size);
            offset += NAME_ENTRY_SIZE;
        }

        log::debug!(
            "loaded RSTB ({}{}): {} hash entries, {} name entries",
            endian,
            if compressed { ", Yaz0" } else { "" },
            hash_count,
            name_count
        );
        Ok(table)
    }

    /// Returns the byte order the table is written in.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Changes the byte order used by [`to_bytes`](Self::to_bytes).
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// Returns `true` if [`to_bytes`](Self::to_bytes) wraps the table in Yaz0.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Chooses whether [`to_bytes`](Self::to_bytes) wraps the table in Yaz0.
    pub fn set_compressed(&mut self, compressed: bool) {
        self.compressed = compressed;
    }

    /// Looks up a size by hash.
    ///
    /// The hash table is consulted first, then the hashes of the names in
    /// the name table.
    pub fn lookup(&self, hash: u32) -> Option<u32> {
        self.hashes.get(&hash).copied().or_else(|| {
            self.names
                .iter()
                .find(|(name, _)| resource_hash(name) == hash)
                .map(|(_, &size)| size)
        })
    }

    /// Looks up the size of a resource path.
    pub fn size_of(&self, name: &str) -> Option<u32> {
        self.names
            .get(name)
            .copied()
            .or_else(|| self.hashes.get(&resource_hash(name)).copied())
    }

    /// Returns `true` if the table has a size for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.size_of(name).is_some()
    }

    /// Sets the size of a resource path.
    ///
    /// Names already stored in the name table are updated there; anything
    /// else goes into the hash table.
    pub fn set_size(&mut self, name: &str, size: u32) {
        match self.names.get_mut(name) {
            Some(slot) => *slot = size,
            None => {
                self.hashes.insert(resource_hash(name), size);
            }
        }
    }

    /// Sets the size stored under a raw hash.
    pub fn set_hash_size(&mut self, hash: u32, size: u32) {
        self.hashes.insert(hash, size);
    }

    /// Stores a size in the name table.
    ///
    /// Used for paths whose hash collides with another resource.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if `name` does not fit the name field.
    pub fn set_named_size(&mut self, name: &str, size: u32) -> Result<()> {
        check_name(name)?;
        self.names.insert(name.to_string(), size);
        Ok(())
    }

    /// Removes a resource path, returning its previous size.
    pub fn remove(&mut self, name: &str) -> Option<u32> {
        self.names
            .remove(name)
            .or_else(|| self.hashes.remove(&resource_hash(name)))
    }

    /// Iterates over the hash table as `(hash, size)`, sorted by hash.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.hashes.iter().map(|(&hash, &size)| (hash, size))
    }

    /// Iterates over the name table as `(name, size)`, sorted by name.
    pub fn names(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.names.iter().map(|(name, &size)| (name.as_str(), size))
    }

    /// Returns the total number of entries in both tables.
    pub fn len(&self) -> usize {
        self.hashes.len() + self.names.len()
    }

    /// Returns `true` if both tables are empty.
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty() && self.names.is_empty()
    }

    /// Resolves a hash to a resource path.
    ///
    /// Names stored in the table take precedence over the global
    /// dictionary.
    pub fn name_for(&self, hash: u32) -> Option<&str> {
        self.names
            .keys()
            .find(|name| resource_hash(name) == hash)
            .map(String::as_str)
            .or_else(|| names::global().and_then(|dict| dict.get(hash)))
    }

    /// Returns a printable name for `hash`, falling back to hex.
    pub fn display_name(&self, hash: u32) -> String {
        match self.name_for(hash) {
            Some(name) => name.to_string(),
            None => format!("0x{:08X}", hash),
        }
    }

    /// Serializes the table in its byte order, Yaz0-compressed if the
    /// table is marked compressed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if a name-table entry is too long.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let e = self.endian;
        let mut out = Vec::with_capacity(
            HEADER_SIZE + self.hashes.len() * HASH_ENTRY_SIZE + self.names.len() * NAME_ENTRY_SIZE,
        );
        out.extend_from_slice(RSTB_MAGIC);
        out.extend_from_slice(&e.u32_bytes(self.hashes.len() as u32));
        out.extend_from_slice(&e.u32_bytes(self.names.len() as u32));
        for (&hash, &size) in &self.hashes {
            out.extend_from_slice(&e.u32_bytes(hash));
            out.extend_from_slice(&e.u32_bytes(size));
        }
        for (name, &size) in &self.names {
            check_name(name)?;
            let mut field = [0u8; NAME_FIELD_SIZE];
            field[..name.len()].copy_from_slice(name.as_bytes());
            out.extend_from_slice(&field);
            out.extend_from_slice(&e.u32_bytes(size));
        }
        if self.compressed {
            return Ok(yaz0::compress(&out));
        }
        Ok(out)
    }
}

fn check_name(name: &str) -> Result<()> {
    let reason = if name.len() > MAX_NAME_LEN {
        "longer than 127 bytes"
    } else if name.as_bytes().contains(&0) {
        "contains a NUL byte"
    } else {
        return Ok(());
    };
    Err(Error::InvalidName {
        name: name.to_string(),
        reason,
    })
}

/// Picks the byte order whose entry counts exactly fill `data`.
fn detect_endian(data: &[u8]) -> Result<Endian> {
    let expected = |endian: Endian| -> Option<u64> {
        let reader = ByteReader::for_table(data, endian);
        let hashes = u64::from(reader.u32_at(4).ok()?);
        let names = u64::from(reader.u32_at(8).ok()?);
        Some(HEADER_SIZE as u64 + hashes * HASH_ENTRY_SIZE as u64 + names * NAME_ENTRY_SIZE as u64)
    };

    let actual = data.len() as u64;
    let big = expected(Endian::Big);
    let little = expected(Endian::Little);
    for (endian, size) in [(Endian::Big, big), (Endian::Little, little)] {
        if size == Some(actual) {
            return Ok(endian);
        }
    }

    let needed = big.into_iter().chain(little).min().unwrap_or(HEADER_SIZE as u64);
    Err(Error::TruncatedTable {
        offset: HEADER_SIZE as u64,
        needed: needed.saturating_sub(HEADER_SIZE as u64) as usize,
        available: data.len().saturating_sub(HEADER_SIZE),
    })
}
