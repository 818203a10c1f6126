//! Mutation engine.
//!
//! Operations never touch the live tree. They run against a working copy;
//! every nested archive crossed by a mutated path is marked dirty, dirty
//! archives are re-serialized innermost first, and the root is serialized
//! once to prove the result is writable. Only then does the caller swap the
//! working copy in.

use serde::Serialize;

use crate::archive::ArchiveHandle;
use crate::archive_path::validate_segment;
use crate::codec::yaz0;
use crate::options::SaveOptions;
use crate::tree::resolve::{parent_mut, prune_empty};
use crate::tree::{position, ArchiveLevel, ArchiveNode, NodeContent};
use crate::{ArchivePath, Error, Result};

use super::operation::Operation;

/// Result of an edit operation.
#[must_use = "edit result should be checked to verify operation completed as expected"]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditResult {
    /// Number of entries that were renamed.
    pub entries_renamed: usize,
    /// Number of entries that were deleted.
    pub entries_deleted: usize,
    /// Number of new entries added.
    pub entries_added: usize,
    /// Number of existing entries whose bytes were replaced.
    pub entries_replaced: usize,
    /// Number of nested archives that were re-serialized.
    pub archives_rebuilt: usize,
    /// Size of the serialized root archive, before any Yaz0 wrapping.
    pub archive_size: u64,
}

impl EditResult {
    /// Returns the number of entries changed in any way.
    pub fn total_changes(&self) -> usize {
        self.entries_renamed + self.entries_deleted + self.entries_added + self.entries_replaced
    }
}

/// Applies `operations` to a copy of `root`.
///
/// Returns the new tree; `root` is left untouched whether or not this
/// succeeds.
pub(crate) fn apply_to(
    root: &ArchiveLevel,
    operations: &[Operation],
    save: &SaveOptions,
) -> Result<(ArchiveLevel, EditResult)> {
    let mut working = root.clone();
    let mut result = EditResult::default();

    for op in operations {
        log::trace!("{} '{}'", op.operation_type(), op.target_path());
        apply_one(&mut working, op, &mut result)?;
    }

    refresh(&mut working.children, save, &mut result.archives_rebuilt)?;
    result.archive_size = working.to_sarc()?.len() as u64;

    log::debug!(
        "applied {} operation(s): {} renamed, {} deleted, {} added, {} replaced, {} archive(s) rebuilt",
        operations.len(),
        result.entries_renamed,
        result.entries_deleted,
        result.entries_added,
        result.entries_replaced,
        result.archives_rebuilt
    );
    Ok((working, result))
}

fn apply_one(level: &mut ArchiveLevel, op: &Operation, result: &mut EditResult) -> Result<()> {
    match op {
        Operation::Rename { path, new_name } => {
            validate_segment(new_name)?;
            let siblings = parent_mut(level, path, false)?;
            let leaf = path.file_name();
            let index = position(siblings, leaf).ok_or_else(|| Error::not_found(path.as_str()))?;
            if position(siblings, new_name).is_some() {
                let target = match path.parent() {
                    Some(parent) => format!("{}/{}", parent, new_name),
                    None => new_name.clone(),
                };
                return Err(Error::exists(target));
            }
            // Renamed entries move to the end of their siblings
            let mut node = siblings.remove(index);
            node.set_name(new_name.as_str());
            siblings.push(node);
            result.entries_renamed += 1;
        }
        Operation::Delete { path } => {
            let siblings = parent_mut(level, path, false)?;
            let index = position(siblings, path.file_name())
                .ok_or_else(|| Error::not_found(path.as_str()))?;
            siblings.remove(index);
            let segments: Vec<&str> = path.components().collect();
            prune_empty(&mut level.children, &segments[..segments.len() - 1]);
            result.entries_deleted += 1;
        }
        Operation::Add { path, data } => {
            let siblings = parent_mut(level, path, true)?;
            let leaf = path.file_name();
            if position(siblings, leaf).is_some() {
                return Err(Error::exists(path.as_str()));
            }
            siblings.push(new_file(leaf, data));
            result.entries_added += 1;
        }
        Operation::Replace { path, data } => {
            let siblings = parent_mut(level, path, true)?;
            let leaf = path.file_name();
            match position(siblings, leaf) {
                Some(index) => {
                    let node = &mut siblings[index];
                    if let NodeContent::Directory { .. } = node.content {
                        return Err(Error::exists(path.as_str()));
                    }
                    // Collapses nested archives; detection happens on the next open
                    *node = new_file(leaf, data);
                    result.entries_replaced += 1;
                }
                None => {
                    siblings.push(new_file(leaf, data));
                    result.entries_added += 1;
                }
            }
        }
    }
    Ok(())
}

fn new_file(name: &str, data: &[u8]) -> ArchiveNode {
    ArchiveNode::file(name, data.to_vec(), yaz0::is_compressed(data))
}

/// Re-serializes dirty nested archives, innermost first.
///
/// Clean archives cannot contain dirty ones, so they are skipped without
/// descending and keep their stored bytes.
fn refresh(children: &mut [ArchiveNode], save: &SaveOptions, rebuilt: &mut usize) -> Result<()> {
    for child in children {
        match &mut child.content {
            NodeContent::Directory { children } => refresh(children, save, rebuilt)?,
            NodeContent::Archive(nested) if nested.dirty => {
                refresh(&mut nested.level.children, save, rebuilt)?;
                let raw = nested.level.to_sarc()?;
                let compress = nested.compressed && save.keep_compressed;
                nested.stored = if compress {
                    let alignment = yaz0::Yaz0Header::parse(&nested.stored)
                        .map(|h| h.alignment)
                        .unwrap_or(0);
                    yaz0::compress_with_alignment(&raw, alignment)
                } else {
                    raw
                };
                nested.compressed = compress;
                nested.dirty = false;
                *rebuilt += 1;
                log::debug!(
                    "rebuilt nested archive '{}' ({} bytes{})",
                    child.name,
                    nested.stored.len(),
                    if compress { ", Yaz0" } else { "" }
                );
            }
            NodeContent::Archive(_) => {
                log::trace!("passing '{}' through unchanged", child.name);
            }
            NodeContent::File { .. } => {}
        }
    }
    Ok(())
}

/// Queues operations against an open archive and applies them as one batch.
///
/// # Example
///
/// ```rust,no_run
/// use wildbits::{ArchiveHandle, ArchivePath, OpenOptions};
///
/// # fn main() -> wildbits::Result<()> {
/// let mut archive = ArchiveHandle::open_path("Title.pack", &OpenOptions::default())?;
///
/// let mut editor = archive.edit();
/// editor.rename("Actor/Pack/Npc.sbactorpack/Model/Npc.bfres", "Npc_Old.bfres")?;
/// editor.delete("Actor/Pack/Unused.sbactorpack")?;
/// editor.add(ArchivePath::new("Actor/Pack/New.txt")?, b"Hello!")?;
///
/// let result = editor.apply()?;
/// println!("{} changes, {} archives rebuilt", result.total_changes(), result.archives_rebuilt);
/// archive.save("Title.pack")?;
/// # Ok(())
/// # }
/// ```
pub struct ArchiveEditor<'a> {
    archive: &'a mut ArchiveHandle,
    operations: Vec<Operation>,
}

impl<'a> ArchiveEditor<'a> {
    /// Creates a new editor for the given archive.
    pub fn new(archive: &'a mut ArchiveHandle) -> Self {
        Self {
            archive,
            operations: Vec::new(),
        }
    }

    /// Returns the number of pending operations.
    pub fn pending_operations(&self) -> usize {
        self.operations.len()
    }

    /// Returns whether there are any pending operations.
    pub fn has_pending_operations(&self) -> bool {
        !self.operations.is_empty()
    }

    /// Clears all pending operations.
    pub fn clear_operations(&mut self) {
        self.operations.clear();
    }

    /// Queues a rename. `new_name` replaces the last segment of `path`.
    pub fn rename(&mut self, path: &str, new_name: &str) -> Result<()> {
        validate_segment(new_name)?;
        self.operations.push(Operation::Rename {
            path: ArchivePath::new(path)?,
            new_name: new_name.to_string(),
        });
        Ok(())
    }

    /// Queues a delete.
    pub fn delete(&mut self, path: &str) -> Result<()> {
        self.operations.push(Operation::Delete {
            path: ArchivePath::new(path)?,
        });
        Ok(())
    }

    /// Queues an add.
    pub fn add(&mut self, path: ArchivePath, data: impl Into<Vec<u8>>) -> Result<()> {
        self.operations.push(Operation::Add {
            path,
            data: data.into(),
        });
        Ok(())
    }

    /// Queues a replace (add if absent).
    pub fn replace(&mut self, path: ArchivePath, data: impl Into<Vec<u8>>) -> Result<()> {
        self.operations.push(Operation::Replace {
            path,
            data: data.into(),
        });
        Ok(())
    }

    /// Queues an already built operation.
    pub fn push(&mut self, op: Operation) {
        self.operations.push(op);
    }

    /// Applies all pending operations atomically.
    ///
    /// If any operation fails, none of them take effect.
    pub fn apply(self) -> Result<EditResult> {
        self.archive.apply(self.operations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::writer::write;
    use crate::format::{ArchiveMeta, Endian, SarcEntry};
    use crate::options::OpenOptions;
    use crate::tree::builder::build;
    use crate::tree::resolve::resolve;
    use crate::tree::NodeKind;

    fn meta() -> ArchiveMeta {
        ArchiveMeta::new(Endian::Big, 4)
    }

    fn tree() -> ArchiveLevel {
        let inner = write(
            &[
                SarcEntry::new("y.bin", b"leaf".to_vec()),
                SarcEntry::new("Dir/only.bin", b"only".to_vec()),
            ],
            &meta(),
        )
        .unwrap();
        let sibling = write(&[SarcEntry::new("s.bin", b"sib".to_vec())], &meta()).unwrap();
        let outer = write(
            &[
                SarcEntry::new("x.pack", inner),
                SarcEntry::new("sibling.pack", sibling),
                SarcEntry::new("top.bin", b"top".to_vec()),
            ],
            &meta(),
        )
        .unwrap();
        build(&outer, &OpenOptions::default()).unwrap()
    }

    fn path(s: &str) -> ArchivePath {
        ArchivePath::new(s).unwrap()
    }

    fn run(level: &ArchiveLevel, op: Operation) -> Result<(ArchiveLevel, EditResult)> {
        apply_to(level, &[op], &SaveOptions::default())
    }

    #[test]
    fn test_rename_moves_to_end() {
        let (tree, result) = run(
            &tree(),
            Operation::Rename {
                path: path("x.pack/y.bin"),
                new_name: "renamed.bin".into(),
            },
        )
        .unwrap();
        assert_eq!(result.entries_renamed, 1);
        assert_eq!(result.archives_rebuilt, 1);

        let x = resolve(&tree, &path("x.pack")).unwrap();
        assert_eq!(x.children().last().unwrap().name(), "renamed.bin");
        assert!(resolve(&tree, &path("x.pack/y.bin")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_rename_conflict() {
        let err = run(
            &tree(),
            Operation::Rename {
                path: path("x.pack/y.bin"),
                new_name: "Dir".into(),
            },
        )
        .unwrap_err();
        match err {
            Error::EntryExists { path } => assert_eq!(path, "x.pack/Dir"),
            e => panic!("Expected EntryExists, got: {:?}", e),
        }
    }

    #[test]
    fn test_rename_rejects_separator() {
        let err = run(
            &tree(),
            Operation::Rename {
                path: path("top.bin"),
                new_name: "a/b".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArchivePath(_)));
    }

    #[test]
    fn test_delete_prunes_empty_directory() {
        let (tree, _) = run(
            &tree(),
            Operation::Delete {
                path: path("x.pack/Dir/only.bin"),
            },
        )
        .unwrap();
        assert!(resolve(&tree, &path("x.pack/Dir")).is_err());
        assert!(resolve(&tree, &path("x.pack/y.bin")).is_ok());
    }

    #[test]
    fn test_add_creates_directories() {
        let (tree, result) = run(
            &tree(),
            Operation::Add {
                path: path("x.pack/New/Deeper/file.bin"),
                data: b"new".to_vec(),
            },
        )
        .unwrap();
        assert_eq!(result.entries_added, 1);
        let node = resolve(&tree, &path("x.pack/New/Deeper/file.bin")).unwrap();
        assert_eq!(node.stored_bytes(), Some(&b"new"[..]));
    }

    #[test]
    fn test_add_existing_conflicts() {
        let err = run(
            &tree(),
            Operation::Add {
                path: path("top.bin"),
                data: vec![],
            },
        )
        .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_add_through_file_conflicts() {
        let err = run(
            &tree(),
            Operation::Add {
                path: path("top.bin/child"),
                data: vec![],
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotADirectory { .. }));
    }

    #[test]
    fn test_replace_collapses_archive() {
        let (tree, result) = run(
            &tree(),
            Operation::Replace {
                path: path("x.pack"),
                data: b"flat".to_vec(),
            },
        )
        .unwrap();
        assert_eq!(result.entries_replaced, 1);
        assert_eq!(result.archives_rebuilt, 0);
        assert_eq!(resolve(&tree, &path("x.pack")).unwrap().kind(), NodeKind::File);
    }

    #[test]
    fn test_replace_missing_adds() {
        let (_, result) = run(
            &tree(),
            Operation::Replace {
                path: path("fresh.bin"),
                data: b"x".to_vec(),
            },
        )
        .unwrap();
        assert_eq!(result.entries_added, 1);
        assert_eq!(result.entries_replaced, 0);
    }

    #[test]
    fn test_replace_directory_conflicts() {
        let err = run(
            &tree(),
            Operation::Replace {
                path: path("x.pack/Dir"),
                data: vec![],
            },
        )
        .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_clean_sibling_passes_through() {
        let before = tree();
        let sibling_before = resolve(&before, &path("sibling.pack"))
            .unwrap()
            .stored_bytes()
            .unwrap()
            .to_vec();
        let (after, _) = run(
            &before,
            Operation::Delete {
                path: path("x.pack/y.bin"),
            },
        )
        .unwrap();
        let sibling_after = resolve(&after, &path("sibling.pack"))
            .unwrap()
            .stored_bytes()
            .unwrap();
        assert_eq!(sibling_after, &sibling_before[..]);
    }

    #[test]
    fn test_batch_is_atomic() {
        let before = tree();
        let ops = vec![
            Operation::Delete {
                path: path("top.bin"),
            },
            Operation::Delete {
                path: path("missing.bin"),
            },
        ];
        let err = apply_to(&before, &ops, &SaveOptions::default()).unwrap_err();
        assert!(err.is_not_found());
        assert!(resolve(&before, &path("top.bin")).is_ok());
    }

    #[test]
    fn test_compressed_nested_recompressed() {
        let inner = write(&[SarcEntry::new("y.bin", b"leaf".to_vec())], &meta()).unwrap();
        let outer = write(
            &[SarcEntry::new("x.spack", yaz0::compress(&inner))],
            &meta(),
        )
        .unwrap();
        let level = build(&outer, &OpenOptions::default()).unwrap();
        let op = Operation::Add {
            path: path("x.spack/z.bin"),
            data: b"zz".to_vec(),
        };

        let (kept, _) = apply_to(&level, &[op.clone()], &SaveOptions::default()).unwrap();
        let node = resolve(&kept, &path("x.spack")).unwrap();
        assert!(node.is_compressed());
        assert!(yaz0::is_compressed(node.stored_bytes().unwrap()));

        let (plain, _) = apply_to(&level, &[op], &SaveOptions::new().keep_compressed(false)).unwrap();
        let node = resolve(&plain, &path("x.spack")).unwrap();
        assert!(!node.is_compressed());
        assert!(node.stored_bytes().unwrap().starts_with(b"SARC"));
    }
}
