//! SARC writing.
//!
//! The SFAT node table must be sorted by name hash; readers binary-search
//! it. Entries are therefore always emitted in `(hash, name)` order no
//! matter how the caller ordered them, and payloads follow the same order.

use std::collections::HashSet;

use super::detect::is_sarc;
use super::reader::align_up;
use super::{
    ArchiveMeta, ArchiveMode, BOM, Endian, NODE_HAS_NAME, SARC_HEADER_SIZE, SARC_MAGIC,
    SARC_VERSION, SFAT_HEADER_SIZE, SFAT_MAGIC, SFAT_NODE_SIZE, SFNT_HEADER_SIZE, SFNT_MAGIC,
    SarcEntry,
};
use crate::hash::{DEFAULT_HASH_MULTIPLIER, sarc_name_hash};
use crate::{Error, Result};

/// Largest alignment honored from an embedded binary header (64 KiB).
const MAX_EMBEDDED_ALIGNMENT_SHIFT: u8 = 16;

/// Serializes entries into one SARC level.
///
/// # Errors
///
/// Returns [`Error::EntryExists`] for duplicate names,
/// [`Error::InvalidArchivePath`] for empty names or names containing NUL,
/// and [`Error::InvalidFormat`] if the archive would not fit the 32-bit
/// offsets of the format.
pub fn write(entries: &[SarcEntry], meta: &ArchiveMeta) -> Result<Vec<u8>> {
    let endian = meta.endian;

    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if entry.name.is_empty() || entry.name.contains('\0') {
            return Err(Error::InvalidArchivePath(format!(
                "entry name {:?} cannot be stored",
                entry.name
            )));
        }
        if !seen.insert(entry.name.as_str()) {
            return Err(Error::exists(entry.name.clone()));
        }
    }
    if entries.len() > u16::MAX as usize {
        return Err(Error::InvalidFormat(format!(
            "{} entries exceed the SFAT limit of {}",
            entries.len(),
            u16::MAX
        )));
    }

    let mut order: Vec<(u32, &SarcEntry)> = entries
        .iter()
        .map(|e| (sarc_name_hash(&e.name, DEFAULT_HASH_MULTIPLIER), e))
        .collect();
    order.sort_by(|(ha, a), (hb, b)| ha.cmp(hb).then_with(|| a.name.cmp(&b.name)));

    // Name table
    let mut names = Vec::new();
    let mut name_offsets = Vec::with_capacity(order.len());
    for (_, entry) in &order {
        name_offsets.push(names.len());
        names.extend_from_slice(entry.name.as_bytes());
        names.push(0);
        names.resize(align_up(names.len(), 4), 0);
    }

    // Payload layout
    let alignments: Vec<usize> = order
        .iter()
        .map(|(_, e)| entry_alignment(&e.data, meta) as usize)
        .collect();
    let max_alignment = alignments
        .iter()
        .copied()
        .max()
        .unwrap_or(meta.alignment as usize)
        .max(meta.alignment as usize);

    let sfat = SARC_HEADER_SIZE;
    let sfnt = sfat + SFAT_HEADER_SIZE + order.len() * SFAT_NODE_SIZE;
    let names_start = sfnt + SFNT_HEADER_SIZE;
    let data_offset = align_up(names_start + names.len(), max_alignment);

    let mut spans = Vec::with_capacity(order.len());
    let mut cursor = 0usize;
    for ((_, entry), &alignment) in order.iter().zip(&alignments) {
        let begin = align_up(cursor, alignment);
        let end = begin + entry.data.len();
        spans.push((begin, end));
        cursor = end;
    }
    let total = data_offset + cursor;
    if total > u32::MAX as usize {
        return Err(Error::InvalidFormat(
            "archive exceeds the 4 GiB limit of 32-bit offsets".into(),
        ));
    }

    let mut out = Vec::with_capacity(total);

    // SARC header
    out.extend_from_slice(SARC_MAGIC);
    out.extend_from_slice(&endian.u16_bytes(SARC_HEADER_SIZE as u16));
    out.extend_from_slice(&endian.u16_bytes(BOM));
    out.extend_from_slice(&endian.u32_bytes(total as u32));
    out.extend_from_slice(&endian.u32_bytes(data_offset as u32));
    out.extend_from_slice(&endian.u16_bytes(SARC_VERSION));
    out.extend_from_slice(&endian.u16_bytes(0));

    // SFAT header and nodes
    out.extend_from_slice(SFAT_MAGIC);
    out.extend_from_slice(&endian.u16_bytes(SFAT_HEADER_SIZE as u16));
    out.extend_from_slice(&endian.u16_bytes(order.len() as u16));
    out.extend_from_slice(&endian.u32_bytes(DEFAULT_HASH_MULTIPLIER));

    let mut previous_hash = None;
    let mut collisions = 0u32;
    for (i, (hash, entry)) in order.iter().enumerate() {
        collisions = if previous_hash == Some(*hash) {
            collisions + 1
        } else {
            1
        };
        previous_hash = Some(*hash);
        if collisions > 0xFF {
            return Err(Error::InvalidFormat(format!(
                "too many hash collisions at '{}'",
                entry.name
            )));
        }

        let name_field = name_offsets[i] / 4;
        if name_field > 0x00FF_FFFF {
            return Err(Error::InvalidFormat("name table exceeds 64 MiB".into()));
        }
        let attributes = (collisions * NODE_HAS_NAME) | name_field as u32;
        let (begin, end) = spans[i];

        out.extend_from_slice(&endian.u32_bytes(*hash));
        out.extend_from_slice(&endian.u32_bytes(attributes));
        out.extend_from_slice(&endian.u32_bytes(begin as u32));
        out.extend_from_slice(&endian.u32_bytes(end as u32));
    }

    // SFNT header and names
    out.extend_from_slice(SFNT_MAGIC);
    out.extend_from_slice(&endian.u16_bytes(SFNT_HEADER_SIZE as u16));
    out.extend_from_slice(&endian.u16_bytes(0));
    out.extend_from_slice(&names);

    // Data
    out.resize(data_offset, 0);
    for ((_, entry), (begin, _)) in order.iter().zip(&spans) {
        out.resize(data_offset + begin, 0);
        out.extend_from_slice(&entry.data);
    }
    debug_assert_eq!(out.len(), total);

    log::trace!(
        "wrote SARC: {} entries, {} bytes, {}, alignment {}",
        order.len(),
        total,
        endian,
        meta.alignment
    );
    Ok(out)
}

/// Returns the alignment a payload needs inside an archive with `meta`.
fn entry_alignment(data: &[u8], meta: &ArchiveMeta) -> u32 {
    let base = meta.alignment;
    let nested = is_sarc(data);
    if meta.mode == ArchiveMode::Legacy || !nested {
        if let Some(embedded) = binary_header_alignment(data) {
            return base.max(embedded);
        }
    }
    base
}

/// Reads the alignment declared by a "new binary" file header.
///
/// Such headers carry a BOM at 0x0C, an alignment shift at 0x0E and the
/// total file size at 0x1C. The alignment is honored only when the
/// declared size matches the payload.
pub(super) fn binary_header_alignment(data: &[u8]) -> Option<u32> {
    if data.len() < 0x20 {
        return None;
    }
    let endian = Endian::from_bom([data[0x0C], data[0x0D]])?;
    let size = endian.u32_from([data[0x1C], data[0x1D], data[0x1E], data[0x1F]]);
    if size as usize != data.len() {
        return None;
    }
    let shift = data[0x0E];
    (shift <= MAX_EMBEDDED_ALIGNMENT_SHIFT).then(|| 1u32 << shift)
}
