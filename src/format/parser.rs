//! SARC parsing.

use std::collections::HashSet;

use super::detect::is_sarc;
use super::reader::{ByteReader, align_up};
use super::writer::binary_header_alignment;
use super::{
    ArchiveMeta, ArchiveMode, Endian, SARC_HEADER_SIZE, SFAT_HEADER_SIZE, SFAT_MAGIC,
    SFAT_NODE_SIZE, SFNT_HEADER_SIZE, SFNT_MAGIC, SarcEntries, SarcEntry,
};
use crate::hash::sarc_name_hash;
use crate::{Error, Result};

/// Alignment reported for archives whose padding gives no better evidence.
const FALLBACK_ALIGNMENT: u32 = 4;

/// Largest alignment the padding of a layout is taken as evidence for.
const MAX_INFERRED_ALIGNMENT: usize = 0x10000;

/// Where one payload sits, relative to the start of the data section.
#[derive(Debug, Clone, Copy)]
struct Span {
    begin: usize,
    end: usize,
    /// Alignment requested by the payload's own binary header.
    embedded: u32,
}

/// Parses one SARC level into its flat entries.
///
/// Entry bytes are copied verbatim; compressed entries stay compressed.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] if the magic is missing and
/// [`Error::CorruptHeader`] for inconsistent headers, out-of-range offsets,
/// unnamed or duplicate entries.
pub fn parse(data: &[u8]) -> Result<SarcEntries> {
    if data.len() < SARC_HEADER_SIZE || !is_sarc(data) {
        return Err(Error::InvalidFormat("missing SARC magic".into()));
    }

    let endian = Endian::from_bom([data[6], data[7]])
        .ok_or_else(|| Error::corrupt_header(6, "invalid byte-order mark"))?;
    let r = ByteReader::new(data, endian);

    let header_size = r.u16_at(4)? as usize;
    if header_size != SARC_HEADER_SIZE {
        return Err(Error::corrupt_header(
            4,
            format!("unexpected SARC header size {:#x}", header_size),
        ));
    }
    let file_size = r.u32_at(8)? as usize;
    if file_size > data.len() {
        return Err(Error::corrupt_header(
            8,
            format!(
                "declared size {:#x} exceeds buffer length {:#x}",
                file_size,
                data.len()
            ),
        ));
    }
    let data_offset = r.u32_at(0x0C)? as usize;
    if data_offset > file_size {
        return Err(Error::corrupt_header(0x0C, "data offset past end of archive"));
    }

    // File allocation table
    let sfat = SARC_HEADER_SIZE;
    if r.bytes_at(sfat, 4)? != SFAT_MAGIC {
        return Err(Error::corrupt_header(sfat as u64, "missing SFAT magic"));
    }
    if r.u16_at(sfat + 4)? as usize != SFAT_HEADER_SIZE {
        return Err(Error::corrupt_header(
            sfat as u64 + 4,
            "unexpected SFAT header size",
        ));
    }
    let node_count = r.u16_at(sfat + 6)? as usize;
    let multiplier = r.u32_at(sfat + 8)?;
    let nodes_start = sfat + SFAT_HEADER_SIZE;

    // File name table
    let sfnt = nodes_start + node_count * SFAT_NODE_SIZE;
    if r.bytes_at(sfnt, 4)? != SFNT_MAGIC {
        return Err(Error::corrupt_header(sfnt as u64, "missing SFNT magic"));
    }
    if r.u16_at(sfnt + 4)? as usize != SFNT_HEADER_SIZE {
        return Err(Error::corrupt_header(
            sfnt as u64 + 4,
            "unexpected SFNT header size",
        ));
    }
    let names_start = sfnt + SFNT_HEADER_SIZE;
    if names_start > data_offset {
        return Err(Error::corrupt_header(
            0x0C,
            "data section overlaps the name table",
        ));
    }

    let mut entries = Vec::with_capacity(node_count);
    let mut spans = Vec::with_capacity(node_count);
    let mut names_end = names_start;
    let mut seen = HashSet::with_capacity(node_count);

    for index in 0..node_count {
        let node = nodes_start + index * SFAT_NODE_SIZE;
        let hash = r.u32_at(node)?;
        let attributes = r.u32_at(node + 4)?;
        let begin = r.u32_at(node + 8)? as usize;
        let end = r.u32_at(node + 12)? as usize;

        if attributes >> 24 == 0 {
            return Err(Error::corrupt_header(
                node as u64 + 4,
                "unnamed entries are not supported",
            ));
        }
        let name_offset = names_start + (attributes & 0x00FF_FFFF) as usize * 4;
        let name = r.cstr_at(name_offset, data_offset)?;
        names_end = names_end.max(align_up(name_offset + name.len() + 1, 4));

        if sarc_name_hash(name, multiplier) != hash {
            log::warn!(
                "SFAT hash mismatch for '{}': stored {:#010x}, computed {:#010x}",
                name,
                hash,
                sarc_name_hash(name, multiplier)
            );
        }
        if !seen.insert(name) {
            return Err(Error::corrupt_header(
                node as u64,
                format!("duplicate entry name '{}'", name),
            ));
        }

        if begin > end {
            return Err(Error::corrupt_header(
                node as u64 + 8,
                format!("entry '{}' ends before it begins", name),
            ));
        }
        let start = data_offset + begin;
        let stop = data_offset + end;
        if stop > file_size {
            return Err(Error::corrupt_header(
                node as u64 + 12,
                format!("entry '{}' extends past end of archive", name),
            ));
        }

        let payload = &data[start..stop];
        spans.push(Span {
            begin,
            end,
            embedded: binary_header_alignment(payload).unwrap_or(0),
        });
        entries.push(SarcEntry::new(name, payload));
    }

    let alignment = infer_alignment(&mut spans, names_end, data_offset);
    log::trace!(
        "parsed SARC: {} entries, {}, inferred alignment {}",
        entries.len(),
        endian,
        alignment
    );

    Ok(SarcEntries {
        meta: ArchiveMeta {
            endian,
            alignment,
            mode: ArchiveMode::for_alignment(alignment),
        },
        entries,
    })
}

/// Probes whether `data` is a well-formed SARC.
///
/// Returns `None` instead of an error so that callers can decide the kind
/// of a node as a pure function of its content.
pub fn try_parse(data: &[u8]) -> Option<SarcEntries> {
    if !is_sarc(data) {
        return None;
    }
    match parse(data) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::trace!("SARC magic present but parse failed: {}", e);
            None
        }
    }
}

/// Infers the payload alignment from the padding of the layout.
///
/// SARC does not store its alignment, so the result is the smallest power
/// of two (at least [`FALLBACK_ALIGNMENT`]) whose padding reproduces every
/// observed gap: before the data section and between consecutive payloads.
/// Gaps already explained by a payload's embedded alignment, and layouts no
/// aligned writer could produce, give no evidence. Offsets that merely
/// happen to fall on larger boundaries never raise the result, so writing
/// the entries back with it reproduces the same layout.
fn infer_alignment(spans: &mut [Span], names_end: usize, data_offset: usize) -> u32 {
    spans.sort_by_key(|s| (s.begin, s.end));
    let embedded_max = spans.iter().map(|s| s.embedded).max().unwrap_or(0);

    let mut alignment = FALLBACK_ALIGNMENT;
    if let Some(required) = padding_alignment(names_end, data_offset) {
        if required > embedded_max {
            alignment = alignment.max(required);
        }
    }

    let mut cursor = 0usize;
    for span in spans.iter() {
        if let Some(required) = padding_alignment(cursor, span.begin) {
            if required > span.embedded && data_offset % required as usize == 0 {
                alignment = alignment.max(required);
            }
        }
        cursor = cursor.max(span.end);
    }
    alignment
}

/// Returns the smallest alignment that pads `from` up to exactly `to`.
///
/// `None` if `to` lies before `from` or no power of two explains the gap.
fn padding_alignment(from: usize, to: usize) -> Option<u32> {
    let gap = to.checked_sub(from)?;
    let required = (gap + 1)
        .checked_next_power_of_two()?
        .max(FALLBACK_ALIGNMENT as usize);
    if required > MAX_INFERRED_ALIGNMENT || to % required != 0 {
        return None;
    }
    u32::try_from(required).ok()
}
