//! The open-document handle.
//!
//! [`ArchiveHandle`] owns the tree of one root archive plus the layout it
//! was opened or created with. Reads resolve virtual paths against the
//! tree; edits go through the mutation engine and replace the tree only
//! when they fully succeed. Saving projects the tree to bytes without
//! changing it.

use std::path::Path;

use crate::codec::yaz0;
use crate::edit::{apply_to, ArchiveEditor, EditResult, Operation};
use crate::format::{ArchiveMeta, ArchiveMode, Endian};
use crate::options::{OpenOptions, SaveOptions};
use crate::tree::builder::build;
use crate::tree::resolve::resolve;
use crate::tree::view::{tree_view, EntryInfo, NodeView};
use crate::tree::{ArchiveLevel, ArchiveNode, NodeContent};
use crate::{ArchivePath, Error, Result};

/// An open SARC archive and its expanded tree.
///
/// # Example
///
/// ```rust
/// use wildbits::{ArchiveHandle, Endian, OpenOptions};
///
/// let mut archive = ArchiveHandle::new(Endian::Big, 4);
/// let _ = archive.add("Model/Npc.bfres", b"model".to_vec()).unwrap();
/// let bytes = archive.to_bytes().unwrap();
///
/// let reopened = ArchiveHandle::open(&bytes, &OpenOptions::default()).unwrap();
/// assert_eq!(reopened.endian(), Endian::Big);
/// assert_eq!(reopened.read("Model/Npc.bfres", true).unwrap(), b"model");
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveHandle {
    root: ArchiveLevel,
    /// Yaz0 header alignment when the whole file was compressed.
    root_yaz0: Option<u32>,
    save: SaveOptions,
}

impl ArchiveHandle {
    /// Creates an empty archive.
    ///
    /// An alignment of 4 selects the modern layout, anything else the
    /// legacy one; see [`ArchiveMeta::new`].
    pub fn new(endian: Endian, alignment: u32) -> Self {
        Self {
            root: ArchiveLevel::new(ArchiveMeta::new(endian, alignment)),
            root_yaz0: None,
            save: SaveOptions::default(),
        }
    }

    /// Opens an archive from bytes, decompressing a Yaz0 wrapper first.
    ///
    /// # Errors
    ///
    /// Returns a format error if the bytes are not a SARC archive.
    pub fn open(data: &[u8], options: &OpenOptions) -> Result<Self> {
        let (root, root_yaz0) = match yaz0::Yaz0Header::parse(data) {
            Some(header) => {
                let raw = yaz0::decompress(data)?;
                (build(&raw, options)?, Some(header.alignment))
            }
            None => (build(data, options)?, None),
        };
        log::debug!(
            "opened archive: {} entries, {}, alignment {}{}",
            root.entry_count(),
            root.meta.endian,
            root.meta.alignment,
            if root_yaz0.is_some() { ", Yaz0" } else { "" }
        );
        Ok(Self {
            root,
            root_yaz0,
            save: SaveOptions::default(),
        })
    }

    /// Opens an archive from a file.
    pub fn open_path(path: impl AsRef<Path>, options: &OpenOptions) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::open(&data, options)
    }

    /// Sets the save options.
    pub fn with_save_options(mut self, save: SaveOptions) -> Self {
        self.save = save;
        self
    }

    /// Replaces the save options of an open handle.
    pub fn set_save_options(&mut self, save: SaveOptions) {
        self.save = save;
    }

    /// Returns the save options.
    pub fn save_options(&self) -> &SaveOptions {
        &self.save
    }

    /// Returns the root layout.
    pub fn meta(&self) -> &ArchiveMeta {
        &self.root.meta
    }

    /// Returns the root byte order.
    pub fn endian(&self) -> Endian {
        self.root.meta.endian
    }

    /// Returns the root payload alignment.
    pub fn alignment(&self) -> u32 {
        self.root.meta.alignment
    }

    /// Returns the root layout mode.
    pub fn mode(&self) -> ArchiveMode {
        self.root.meta.mode
    }

    /// Returns `true` if the file was Yaz0-compressed when opened.
    pub fn is_compressed(&self) -> bool {
        self.root_yaz0.is_some()
    }

    /// Returns the root level of the tree.
    pub fn root(&self) -> &ArchiveLevel {
        &self.root
    }

    /// Returns the number of entries stored in the root archive.
    pub fn len(&self) -> usize {
        self.root.entry_count()
    }

    /// Returns `true` if the root archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Serializes the archive.
    ///
    /// The root is recompressed if it was opened compressed and
    /// [`SaveOptions::keep_compressed`] is set.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let raw = self.root.to_sarc()?;
        Ok(match self.root_yaz0 {
            Some(alignment) if self.save.keep_compressed => {
                yaz0::compress_with_alignment(&raw, alignment)
            }
            _ => raw,
        })
    }

    /// Serializes the archive and writes it to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), &bytes)?;
        log::debug!("saved {} bytes to {}", bytes.len(), path.as_ref().display());
        Ok(())
    }

    /// Returns a serializable projection of the whole tree.
    pub fn tree(&self) -> Vec<NodeView> {
        tree_view(&self.root)
    }

    /// Returns the node at `path`.
    pub fn get(&self, path: &str) -> Result<&ArchiveNode> {
        resolve(&self.root, &ArchivePath::new(path)?)
    }

    /// Returns `true` if `path` resolves to a node.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_ok()
    }

    /// Returns metadata about the node at `path`.
    pub fn entry_info(&self, path: &str) -> Result<EntryInfo> {
        let path = ArchivePath::new(path)?;
        let node = resolve(&self.root, &path)?;
        Ok(EntryInfo::new(&path, node))
    }

    /// Returns the bytes of the file or nested archive at `path`.
    ///
    /// With `decompress`, Yaz0-compressed bytes are decompressed; otherwise
    /// the stored form is returned.
    ///
    /// # Errors
    ///
    /// Fails with a not-found error if the path does not resolve and with
    /// [`Error::InvalidArchivePath`] if it names a directory.
    pub fn read(&self, path: &str, decompress: bool) -> Result<Vec<u8>> {
        let node = self.get(path)?;
        let stored = match &node.content {
            NodeContent::File { data, .. } => data,
            NodeContent::Archive(nested) => &nested.stored,
            NodeContent::Directory { .. } => {
                return Err(Error::InvalidArchivePath(format!(
                    "'{}' is a directory",
                    path
                )));
            }
        };
        if decompress && node.is_compressed() {
            yaz0::decompress(stored)
        } else {
            Ok(stored.clone())
        }
    }

    /// Renames the entry at `path` to `new_name`, keeping it in place.
    ///
    /// The renamed entry moves to the end of its siblings.
    pub fn rename(&mut self, path: &str, new_name: &str) -> Result<EditResult> {
        self.apply(vec![Operation::Rename {
            path: ArchivePath::new(path)?,
            new_name: new_name.to_string(),
        }])
    }

    /// Deletes the entry at `path`.
    pub fn delete(&mut self, path: &str) -> Result<EditResult> {
        self.apply(vec![Operation::Delete {
            path: ArchivePath::new(path)?,
        }])
    }

    /// Adds a new file at `path`, creating directories as needed.
    pub fn add(&mut self, path: &str, data: impl Into<Vec<u8>>) -> Result<EditResult> {
        self.apply(vec![Operation::Add {
            path: ArchivePath::new(path)?,
            data: data.into(),
        }])
    }

    /// Overwrites the file or nested archive at `path`, adding it if absent.
    pub fn replace(&mut self, path: &str, data: impl Into<Vec<u8>>) -> Result<EditResult> {
        self.apply(vec![Operation::Replace {
            path: ArchivePath::new(path)?,
            data: data.into(),
        }])
    }

    /// Applies a batch of operations atomically.
    ///
    /// Either every operation takes effect and all affected archives are
    /// rebuilt, or the handle is left exactly as it was.
    pub fn apply(&mut self, operations: Vec<Operation>) -> Result<EditResult> {
        let (root, result) = apply_to(&self.root, &operations, &self.save)?;
        self.root = root;
        Ok(result)
    }

    /// Starts queueing operations for a single batch.
    pub fn edit(&mut self) -> ArchiveEditor<'_> {
        ArchiveEditor::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::parser::parse;
    use crate::tree::NodeKind;

    fn nested_handle() -> ArchiveHandle {
        let mut inner = ArchiveHandle::new(Endian::Little, 8);
        let _ = inner.add("y.bin", b"leaf".to_vec()).unwrap();
        let inner_bytes = inner.to_bytes().unwrap();

        let mut outer = ArchiveHandle::new(Endian::Big, 4);
        let _ = outer.add("x.pack", inner_bytes).unwrap();
        let _ = outer.add("Dir/readme.txt", b"hi".to_vec()).unwrap();
        ArchiveHandle::open(&outer.to_bytes().unwrap(), &OpenOptions::default()).unwrap()
    }

    #[test]
    fn test_new_is_empty() {
        let handle = ArchiveHandle::new(Endian::Little, 4);
        assert!(handle.is_empty());
        assert_eq!(handle.mode(), ArchiveMode::New);
        let parsed = parse(&handle.to_bytes().unwrap()).unwrap();
        assert!(parsed.entries.is_empty());
    }

    #[test]
    fn test_nested_keeps_own_meta() {
        let handle = nested_handle();
        let info = handle.entry_info("x.pack").unwrap();
        assert_eq!(info.kind, NodeKind::Archive);
        assert_eq!(info.archive.unwrap().endian, Endian::Little);
        assert_eq!(handle.endian(), Endian::Big);
    }

    #[test]
    fn test_read_and_contains() {
        let handle = nested_handle();
        assert_eq!(handle.read("x.pack/y.bin", false).unwrap(), b"leaf");
        assert!(handle.contains("Dir/readme.txt"));
        assert!(!handle.contains("Dir/missing.txt"));
        assert!(handle.read("Dir", false).is_err());
    }

    #[test]
    fn test_edit_inside_nested_reaches_root() {
        let mut handle = nested_handle();
        let result = handle.replace("x.pack/y.bin", b"changed".to_vec()).unwrap();
        assert_eq!(result.archives_rebuilt, 1);

        let reopened = ArchiveHandle::open(&handle.to_bytes().unwrap(), &OpenOptions::default()).unwrap();
        assert_eq!(reopened.read("x.pack/y.bin", false).unwrap(), b"changed");
        assert_eq!(
            reopened.entry_info("x.pack").unwrap().archive.unwrap().endian,
            Endian::Little
        );
    }

    #[test]
    fn test_failed_edit_leaves_handle_unchanged() {
        let mut handle = nested_handle();
        let before = handle.to_bytes().unwrap();
        assert!(handle.rename("x.pack/missing", "other").is_err());
        assert!(handle.add("Dir/readme.txt", b"dup".to_vec()).is_err());
        assert_eq!(handle.to_bytes().unwrap(), before);
    }

    #[test]
    fn test_compressed_root_roundtrip() {
        let mut handle = ArchiveHandle::new(Endian::Big, 4);
        let _ = handle.add("a.txt", b"aaaaaaaaaaaaaaaaaaaaaaaa".to_vec()).unwrap();
        let packed = yaz0::compress(&handle.to_bytes().unwrap());

        let reopened = ArchiveHandle::open(&packed, &OpenOptions::default()).unwrap();
        assert!(reopened.is_compressed());
        assert!(yaz0::is_compressed(&reopened.to_bytes().unwrap()));

        let plain = reopened.with_save_options(SaveOptions::new().keep_compressed(false));
        assert!(plain.to_bytes().unwrap().starts_with(b"SARC"));
    }

    #[test]
    fn test_editor_batch() {
        let mut handle = nested_handle();
        let mut editor = handle.edit();
        editor.delete("Dir/readme.txt").unwrap();
        editor.rename("x.pack/y.bin", "z.bin").unwrap();
        assert_eq!(editor.pending_operations(), 2);
        let result = editor.apply().unwrap();
        assert_eq!(result.total_changes(), 2);
        assert!(!handle.contains("Dir"));
        assert!(handle.contains("x.pack/z.bin"));
    }
}
