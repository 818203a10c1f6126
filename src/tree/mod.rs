//! In-memory archive tree.
//!
//! A SARC level stores flat `name -> bytes` entries. The tree splits names
//! on `/` into [`Directory`](NodeKind::Directory) nodes and expands entries
//! whose content parses as SARC into [`Archive`](NodeKind::Archive) nodes
//! with their own sub-tree. Directories exist only in memory; they are
//! flattened back into entry names when a level is written.
//!
//! Nested archives keep the bytes they were stored with. Until a mutation
//! marks one dirty, those bytes are written back verbatim.

pub mod builder;
pub mod resolve;
pub mod view;

use serde::Serialize;

use crate::codec::yaz0;
use crate::format::writer::write;
use crate::format::{ArchiveMeta, SarcEntry};
use crate::Result;

/// Kind of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Opaque payload bytes.
    File,
    /// Grouping synthesized from `/` in entry names.
    Directory,
    /// Payload that is itself a SARC archive.
    Archive,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::File => write!(f, "file"),
            NodeKind::Directory => write!(f, "directory"),
            NodeKind::Archive => write!(f, "archive"),
        }
    }
}

/// One named node of an archive tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveNode {
    pub(crate) name: String,
    pub(crate) content: NodeContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeContent {
    File { data: Vec<u8>, compressed: bool },
    Directory { children: Vec<ArchiveNode> },
    Archive(Box<NestedArchive>),
}

/// A nested archive and the bytes it is stored with in its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NestedArchive {
    /// Bytes as stored in the parent, Yaz0-wrapped when `compressed`.
    pub(crate) stored: Vec<u8>,
    pub(crate) compressed: bool,
    pub(crate) level: ArchiveLevel,
    /// Set when something inside changed and `stored` is stale.
    pub(crate) dirty: bool,
}

impl ArchiveNode {
    pub(crate) fn file(name: impl Into<String>, data: Vec<u8>, compressed: bool) -> Self {
        Self {
            name: name.into(),
            content: NodeContent::File { data, compressed },
        }
    }

    pub(crate) fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: NodeContent::Directory {
                children: Vec::new(),
            },
        }
    }

    /// Returns the node name (a single path segment).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the kind of this node.
    pub fn kind(&self) -> NodeKind {
        match self.content {
            NodeContent::File { .. } => NodeKind::File,
            NodeContent::Directory { .. } => NodeKind::Directory,
            NodeContent::Archive(_) => NodeKind::Archive,
        }
    }

    /// Returns the bytes this node is stored with, `None` for directories.
    pub fn stored_bytes(&self) -> Option<&[u8]> {
        match &self.content {
            NodeContent::File { data, .. } => Some(data),
            NodeContent::Archive(nested) => Some(&nested.stored),
            NodeContent::Directory { .. } => None,
        }
    }

    /// Returns `true` if the stored bytes are Yaz0-compressed.
    pub fn is_compressed(&self) -> bool {
        match &self.content {
            NodeContent::File { compressed, .. } => *compressed,
            NodeContent::Archive(nested) => nested.compressed,
            NodeContent::Directory { .. } => false,
        }
    }

    /// Returns the children of a directory or nested archive.
    ///
    /// Files have no children.
    pub fn children(&self) -> &[ArchiveNode] {
        match &self.content {
            NodeContent::Directory { children } => children,
            NodeContent::Archive(nested) => &nested.level.children,
            NodeContent::File { .. } => &[],
        }
    }

    /// Returns the layout of a nested archive.
    pub fn archive_meta(&self) -> Option<&ArchiveMeta> {
        match &self.content {
            NodeContent::Archive(nested) => Some(&nested.level.meta),
            _ => None,
        }
    }

    /// Returns the size of the payload once any Yaz0 wrapping is removed.
    pub fn decompressed_size(&self) -> Option<u64> {
        let stored = self.stored_bytes()?;
        if self.is_compressed() {
            yaz0::decompressed_size(stored).map(u64::from)
        } else {
            Some(stored.len() as u64)
        }
    }
}

/// The nodes of one archive level together with its layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLevel {
    pub(crate) meta: ArchiveMeta,
    pub(crate) children: Vec<ArchiveNode>,
}

impl ArchiveLevel {
    /// Creates an empty level.
    pub fn new(meta: ArchiveMeta) -> Self {
        Self {
            meta,
            children: Vec::new(),
        }
    }

    /// Returns the layout of this level.
    pub fn meta(&self) -> &ArchiveMeta {
        &self.meta
    }

    /// Returns the top-level nodes of this level.
    pub fn children(&self) -> &[ArchiveNode] {
        &self.children
    }

    /// Flattens this level back into entries, joining directory names.
    ///
    /// Files and nested archives contribute their stored bytes.
    pub fn flatten(&self) -> Vec<SarcEntry> {
        let mut entries = Vec::new();
        flatten_into(&self.children, "", &mut entries);
        entries
    }

    /// Writes this level as SARC bytes.
    pub fn to_sarc(&self) -> Result<Vec<u8>> {
        write(&self.flatten(), &self.meta)
    }

    /// Counts files and nested archives below this level, not descending
    /// into nested archives.
    pub fn entry_count(&self) -> usize {
        fn count(children: &[ArchiveNode]) -> usize {
            children
                .iter()
                .map(|c| match &c.content {
                    NodeContent::Directory { children } => count(children),
                    _ => 1,
                })
                .sum()
        }
        count(&self.children)
    }
}

fn flatten_into(children: &[ArchiveNode], prefix: &str, out: &mut Vec<SarcEntry>) {
    for child in children {
        let path = if prefix.is_empty() {
            child.name.clone()
        } else {
            format!("{}/{}", prefix, child.name)
        };
        match &child.content {
            NodeContent::File { data, .. } => out.push(SarcEntry::new(path, data.clone())),
            NodeContent::Archive(nested) => out.push(SarcEntry::new(path, nested.stored.clone())),
            NodeContent::Directory { children } => flatten_into(children, &path, out),
        }
    }
}

/// Returns the index of the child called `name`.
pub(crate) fn position(children: &[ArchiveNode], name: &str) -> Option<usize> {
    children.iter().position(|c| c.name == name)
}
