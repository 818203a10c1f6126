//! Builds an [`ArchiveLevel`] tree from SARC bytes.
//!
//! Every entry is probed by content: if its bytes (after removing a Yaz0
//! wrapper) parse as SARC, the entry becomes a nested archive and is
//! expanded recursively; otherwise it is an opaque file. Extensions are
//! never consulted.
//!
//! With the `parallel` feature, sibling entries are probed concurrently.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{position, ArchiveLevel, ArchiveNode, NestedArchive, NodeContent};
use crate::codec::yaz0::{self, YAZ0_HEADER_SIZE};
use crate::format::parser::{parse, try_parse};
use crate::format::{SarcEntries, SarcEntry, SARC_MAGIC};
use crate::options::OpenOptions;
use crate::{Error, Result};

/// Parses `data` as SARC and builds its tree.
///
/// # Errors
///
/// Returns a format error if `data` is not a valid SARC, if an entry name
/// cannot be represented as a path, or if a Yaz0-wrapped nested archive is
/// corrupt.
pub fn build(data: &[u8], options: &OpenOptions) -> Result<ArchiveLevel> {
    let parsed = parse(data)?;
    build_level(parsed, options, 0)
}

/// Builds the tree of an already parsed level found at `depth`.
pub(crate) fn build_level(
    parsed: SarcEntries,
    options: &OpenOptions,
    depth: usize,
) -> Result<ArchiveLevel> {
    let SarcEntries { meta, entries } = parsed;

    #[cfg(feature = "parallel")]
    let classified = entries
        .into_par_iter()
        .map(|entry| classify(entry, options, depth))
        .collect::<Result<Vec<_>>>()?;

    #[cfg(not(feature = "parallel"))]
    let classified = entries
        .into_iter()
        .map(|entry| classify(entry, options, depth))
        .collect::<Result<Vec<_>>>()?;

    let mut level = ArchiveLevel::new(meta);
    for (path, content) in classified {
        insert(&mut level.children, &path, content)?;
    }
    Ok(level)
}

/// Decides whether one entry is a file or a nested archive.
fn classify(
    entry: SarcEntry,
    options: &OpenOptions,
    depth: usize,
) -> Result<(String, NodeContent)> {
    let SarcEntry { name, data } = entry;
    let compressed = yaz0::is_compressed(&data);

    if !options.detect_nested || !may_hold_sarc(&data, compressed) {
        return Ok((name, NodeContent::File { data, compressed }));
    }

    let parsed = if compressed {
        let raw = yaz0::decompress(&data).map_err(|e| match e {
            Error::Decompression { reason } => Error::Decompression {
                reason: format!("entry '{}': {}", name, reason),
            },
            other => other,
        })?;
        try_parse(&raw)
    } else {
        try_parse(&data)
    };

    let Some(parsed) = parsed else {
        return Ok((name, NodeContent::File { data, compressed }));
    };

    if depth >= options.max_depth {
        log::warn!(
            "'{}' is a nested archive beyond depth limit {}; keeping it opaque",
            name,
            options.max_depth
        );
        return Ok((name, NodeContent::File { data, compressed }));
    }

    log::trace!(
        "'{}' is a nested archive ({} entries, {})",
        name,
        parsed.entries.len(),
        parsed.meta.endian
    );
    let level = build_level(parsed, options, depth + 1)?;
    Ok((
        name,
        NodeContent::Archive(Box::new(NestedArchive {
            stored: data,
            compressed,
            level,
            dirty: false,
        })),
    ))
}

/// Cheap pre-check before a full parse.
///
/// A Yaz0 stream holding SARC must open with four literal bytes spelling
/// the magic, since there is no history to refer back to yet.
fn may_hold_sarc(data: &[u8], compressed: bool) -> bool {
    if !compressed {
        return data.starts_with(SARC_MAGIC);
    }
    let body = &data[YAZ0_HEADER_SIZE..];
    body.len() > 4 && body[0] & 0xF0 == 0xF0 && &body[1..5] == SARC_MAGIC
}

/// Inserts a classified entry at `path`, creating directories on the way.
///
/// A name with empty segments (a leading, trailing or doubled `/`) cannot
/// be split into directories. It is kept whole as one top-level node so the
/// entry survives re-saves; such a node is not addressable by path.
fn insert(children: &mut Vec<ArchiveNode>, path: &str, content: NodeContent) -> Result<()> {
    if path.is_empty() {
        return Err(Error::InvalidFormat("empty entry name".into()));
    }
    let segments: Vec<&str> = path.split('/').collect();
    if segments.iter().any(|s| *s == "." || *s == "..") {
        return Err(Error::InvalidFormat(format!(
            "entry name '{}' is not a valid path",
            path
        )));
    }
    if segments.iter().any(|s| s.is_empty()) {
        log::warn!(
            "entry name '{}' has empty segments; keeping it as a single node",
            path
        );
        return push_leaf(children, path, path, content);
    }
    let Some((leaf, dirs)) = segments.split_last() else {
        return Err(Error::InvalidFormat("empty entry name".into()));
    };

    let mut level = children;
    for dir in dirs {
        let index = match position(level, dir) {
            Some(i) => i,
            None => {
                level.push(ArchiveNode::directory(*dir));
                level.len() - 1
            }
        };
        level = match &mut level[index].content {
            NodeContent::Directory { children } => children,
            _ => {
                return Err(Error::InvalidFormat(format!(
                    "entry '{}' is stored below file '{}'",
                    path, dir
                )));
            }
        };
    }

    push_leaf(level, path, leaf, content)
}

fn push_leaf(
    level: &mut Vec<ArchiveNode>,
    path: &str,
    leaf: &str,
    content: NodeContent,
) -> Result<()> {
    if position(level, leaf).is_some() {
        return Err(Error::InvalidFormat(format!(
            "entry '{}' collides with a directory of the same name",
            path
        )));
    }
    level.push(ArchiveNode {
        name: leaf.to_string(),
        content,
    });
    Ok(())
}
