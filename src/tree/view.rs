//! Serializable projections of the tree for display.

use serde::Serialize;

use super::{ArchiveLevel, ArchiveNode, NodeKind};
use crate::format::ArchiveMeta;
use crate::ArchivePath;

/// One node of the exported tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    /// Node name.
    pub name: String,
    /// Node kind.
    pub kind: NodeKind,
    /// Stored size in bytes; absent for directories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Whether the stored bytes are Yaz0-compressed.
    pub compressed: bool,
    /// Child nodes of directories and nested archives.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeView>,
}

impl NodeView {
    /// Projects `node` and everything below it.
    pub fn from_node(node: &ArchiveNode) -> Self {
        Self {
            name: node.name().to_string(),
            kind: node.kind(),
            size: node.stored_bytes().map(|b| b.len() as u64),
            compressed: node.is_compressed(),
            children: node.children().iter().map(NodeView::from_node).collect(),
        }
    }

    /// Counts this node and all descendants.
    pub fn total_nodes(&self) -> usize {
        1 + self.children.iter().map(NodeView::total_nodes).sum::<usize>()
    }
}

/// Projects the top-level nodes of `level`.
pub fn tree_view(level: &ArchiveLevel) -> Vec<NodeView> {
    level.children().iter().map(NodeView::from_node).collect()
}

/// Metadata about one entry, addressed by virtual path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    /// The virtual path that was queried.
    pub path: String,
    /// Node kind.
    pub kind: NodeKind,
    /// Size of the stored bytes; absent for directories.
    pub stored_size: Option<u64>,
    /// Size once Yaz0 wrapping is removed; absent for directories.
    pub decompressed_size: Option<u64>,
    /// Whether the stored bytes are Yaz0-compressed.
    pub compressed: bool,
    /// Whether the entry is itself an archive.
    pub is_archive: bool,
    /// Number of direct children.
    pub child_count: usize,
    /// Layout of a nested archive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<ArchiveMeta>,
}

impl EntryInfo {
    pub(crate) fn new(path: &ArchivePath, node: &ArchiveNode) -> Self {
        Self {
            path: path.to_string(),
            kind: node.kind(),
            stored_size: node.stored_bytes().map(|b| b.len() as u64),
            decompressed_size: node.decompressed_size(),
            compressed: node.is_compressed(),
            is_archive: node.kind() == NodeKind::Archive,
            child_count: node.children().len(),
            archive: node.archive_meta().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::yaz0;
    use crate::format::writer::write;
    use crate::format::{Endian, SarcEntry};
    use crate::options::OpenOptions;
    use crate::tree::builder::build;
    use crate::tree::resolve::resolve;

    fn level() -> ArchiveLevel {
        let meta = ArchiveMeta::new(Endian::Big, 4);
        let inner = write(&[SarcEntry::new("y.bin", b"leaf".to_vec())], &meta).unwrap();
        let outer = write(
            &[
                SarcEntry::new("x.spack", yaz0::compress(&inner)),
                SarcEntry::new("Dir/a.txt", b"abc".to_vec()),
            ],
            &meta,
        )
        .unwrap();
        build(&outer, &OpenOptions::default()).unwrap()
    }

    #[test]
    fn test_tree_view_shape() {
        let views = tree_view(&level());
        let total: usize = views.iter().map(NodeView::total_nodes).sum();
        // x.spack, y.bin, Dir, a.txt
        assert_eq!(total, 4);
        let dir = views.iter().find(|v| v.name == "Dir").unwrap();
        assert_eq!(dir.kind, NodeKind::Directory);
        assert_eq!(dir.size, None);
    }

    #[test]
    fn test_tree_view_json() {
        let views = tree_view(&level());
        let json = serde_json::to_value(&views).unwrap();
        let archive = json
            .as_array()
            .unwrap()
            .iter()
            .find(|v| v["name"] == "x.spack")
            .unwrap();
        assert_eq!(archive["kind"], "archive");
        assert_eq!(archive["compressed"], true);
        assert_eq!(archive["children"][0]["name"], "y.bin");
    }

    #[test]
    fn test_entry_info() {
        let level = level();
        let path = ArchivePath::new("x.spack").unwrap();
        let info = EntryInfo::new(&path, resolve(&level, &path).unwrap());
        assert!(info.is_archive);
        assert!(info.compressed);
        assert_eq!(info.child_count, 1);
        assert_ne!(info.decompressed_size, info.stored_size);
        assert_eq!(info.archive.unwrap().endian, Endian::Big);

        let path = ArchivePath::new("Dir/a.txt").unwrap();
        let info = EntryInfo::new(&path, resolve(&level, &path).unwrap());
        assert_eq!(info.kind, NodeKind::File);
        assert_eq!(info.stored_size, Some(3));
        assert_eq!(info.decompressed_size, Some(3));
    }
}
