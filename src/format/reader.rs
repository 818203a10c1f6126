//! Bounds-checked, endian-aware reading of in-memory binary data.

use super::Endian;
use crate::{Error, Result};

/// How running off the end of the buffer is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Truncation {
    /// Report as a corrupt container header.
    Header,
    /// Report as a truncated size table.
    Table,
}

/// A read-only view over a byte buffer with a fixed byte order.
///
/// All reads take absolute offsets and never panic; reading past the end
/// yields an error whose kind depends on how the reader was created.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    endian: Endian,
    truncation: Truncation,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader for container headers.
    ///
    /// Out-of-range reads produce [`Error::CorruptHeader`].
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            endian,
            truncation: Truncation::Header,
        }
    }

    /// Creates a reader for size tables.
    ///
    /// Out-of-range reads produce [`Error::TruncatedTable`].
    pub fn for_table(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            endian,
            truncation: Truncation::Table,
        }
    }

    /// Returns the byte order of this reader.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Returns the length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `len` bytes starting at `offset`.
    pub fn bytes_at(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| self.truncated(offset, len))
    }

    /// Reads a `u16` at `offset`.
    pub fn u16_at(&self, offset: usize) -> Result<u16> {
        let bytes = self.bytes_at(offset, 2)?;
        Ok(self.endian.u16_from([bytes[0], bytes[1]]))
    }

    /// Reads a `u32` at `offset`.
    pub fn u32_at(&self, offset: usize) -> Result<u32> {
        let bytes = self.bytes_at(offset, 4)?;
        Ok(self
            .endian
            .u32_from([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a NUL-terminated UTF-8 string starting at `offset`.
    ///
    /// The string must terminate before `limit`.
    pub fn cstr_at(&self, offset: usize, limit: usize) -> Result<&'a str> {
        let limit = limit.min(self.data.len());
        let region = self
            .data
            .get(offset..limit)
            .ok_or_else(|| self.truncated(offset, 1))?;
        let end = region
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::corrupt_header(offset as u64, "unterminated name"))?;
        std::str::from_utf8(&region[..end])
            .map_err(|_| Error::corrupt_header(offset as u64, "name is not valid UTF-8"))
    }

    fn truncated(&self, offset: usize, needed: usize) -> Error {
        match self.truncation {
            Truncation::Header => Error::corrupt_header(
                offset as u64,
                format!(
                    "unexpected end of data (need {} bytes, have {})",
                    needed,
                    self.data.len().saturating_sub(offset)
                ),
            ),
            Truncation::Table => Error::TruncatedTable {
                offset: offset as u64,
                needed,
                available: self.data.len().saturating_sub(offset),
            },
        }
    }
}

/// Rounds `value` up to a multiple of `alignment` (a power of two).
#[inline]
pub(crate) fn align_up(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}
