//! Virtual path resolution.
//!
//! A path is walked one segment at a time. Directories and nested archives
//! both have children, so `outer.pack/sub.pack/leaf.bin` needs no marker at
//! archive boundaries. A plain file in the middle of a path ends the walk
//! with [`Error::PathThroughFile`].

use super::{position, ArchiveLevel, ArchiveNode, NodeContent};
use crate::{ArchivePath, Error, Result};

/// Resolves `path` to the node it names.
///
/// # Errors
///
/// Returns [`Error::EntryNotFound`] if a segment is missing and
/// [`Error::PathThroughFile`] if the path continues past a file.
pub fn resolve<'a>(level: &'a ArchiveLevel, path: &ArchivePath) -> Result<&'a ArchiveNode> {
    let (siblings, leaf) = resolve_parent(level, path)?;
    siblings
        .iter()
        .find(|c| c.name() == leaf)
        .ok_or_else(|| Error::not_found(path.as_str()))
}

/// Resolves the parent of `path`.
///
/// Returns the children of the containing directory or archive together
/// with the leaf name. The leaf itself need not exist.
pub fn resolve_parent<'a, 'p>(
    level: &'a ArchiveLevel,
    path: &'p ArchivePath,
) -> Result<(&'a [ArchiveNode], &'p str)> {
    let segments: Vec<&str> = path.components().collect();
    let Some((leaf, dirs)) = segments.split_last() else {
        return Err(Error::not_found(path.as_str()));
    };

    let mut children: &[ArchiveNode] = &level.children;
    for (i, segment) in dirs.iter().enumerate() {
        let node = children
            .iter()
            .find(|c| c.name() == *segment)
            .ok_or_else(|| Error::not_found(path.as_str()))?;
        children = match &node.content {
            NodeContent::Directory { children } => children,
            NodeContent::Archive(nested) => &nested.level.children,
            NodeContent::File { .. } => {
                return Err(Error::PathThroughFile {
                    path: path.to_string(),
                    file: segments[..=i].join("/"),
                });
            }
        };
    }
    Ok((children, leaf))
}

/// Mutable counterpart of [`resolve_parent`] used by the editor.
///
/// Every nested archive crossed on the way is marked dirty. With `create`,
/// missing directories are created and a file in the way is a conflict
/// rather than a lookup failure.
pub(crate) fn parent_mut<'a>(
    level: &'a mut ArchiveLevel,
    path: &ArchivePath,
    create: bool,
) -> Result<&'a mut Vec<ArchiveNode>> {
    let segments: Vec<&str> = path.components().collect();
    let dirs = &segments[..segments.len().saturating_sub(1)];

    let mut children = &mut level.children;
    for (i, segment) in dirs.iter().enumerate() {
        let index = match position(children, segment) {
            Some(index) => index,
            None if create => {
                children.push(ArchiveNode::directory(*segment));
                children.len() - 1
            }
            None => return Err(Error::not_found(path.as_str())),
        };
        children = match &mut children[index].content {
            NodeContent::Directory { children } => children,
            NodeContent::Archive(nested) => {
                nested.dirty = true;
                &mut nested.level.children
            }
            NodeContent::File { .. } => {
                let file = segments[..=i].join("/");
                return Err(if create {
                    Error::NotADirectory { path: file }
                } else {
                    Error::PathThroughFile {
                        path: path.to_string(),
                        file,
                    }
                });
            }
        };
    }
    Ok(children)
}

/// Removes directories along `dirs` that were left without children.
///
/// Nested archives are never removed, even when empty.
pub(crate) fn prune_empty(children: &mut Vec<ArchiveNode>, dirs: &[&str]) {
    let Some((first, rest)) = dirs.split_first() else {
        return;
    };
    let Some(index) = position(children, first) else {
        return;
    };
    let now_empty = match &mut children[index].content {
        NodeContent::Directory { children } => {
            prune_empty(children, rest);
            children.is_empty()
        }
        NodeContent::Archive(nested) => {
            prune_empty(&mut nested.level.children, rest);
            false
        }
        NodeContent::File { .. } => false,
    };
    if now_empty {
        log::debug!("pruning empty directory '{}'", first);
        children.remove(index);
    }
}
