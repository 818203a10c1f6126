//! Moving archive contents to and from host directories.
//!
//! - [`ArchiveHandle::extract_to`] writes one host file per leaf. Nested
//!   archives are written as single files holding their stored bytes, not
//!   expanded.
//! - [`ArchiveHandle::sync_from_folder`] mirrors a host directory into the
//!   archive. Every regular file becomes a replace-or-add at the matching
//!   virtual path; nothing is ever deleted.
//!
//! # Example
//!
//! ```rust,no_run
//! use wildbits::{ArchiveHandle, OpenOptions};
//!
//! # fn main() -> wildbits::Result<()> {
//! let mut archive = ArchiveHandle::open_path("Title.pack", &OpenOptions::default())?;
//!
//! let extracted = archive.extract_to("work/Title")?;
//! println!("wrote {} files", extracted.files_written);
//!
//! // ... edit files under work/Title ...
//!
//! let result = archive.sync_from_folder("work/Title")?;
//! println!("{} replaced, {} added", result.entries_replaced, result.entries_added);
//! archive.save("Title.pack")?;
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::Path;

use serde::Serialize;
use walkdir::WalkDir;

use crate::archive::ArchiveHandle;
use crate::edit::{EditResult, Operation};
use crate::safety::validate_extract_path;
use crate::tree::{ArchiveNode, NodeContent};
use crate::{ArchivePath, Result};

/// Result of extracting an archive to a host directory.
#[must_use = "extract result should be checked to verify operation completed as expected"]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractResult {
    /// Number of files written.
    pub files_written: usize,
    /// Total bytes written.
    pub bytes_written: u64,
    /// Entries whose stored names cannot be mapped to a host path.
    pub files_skipped: usize,
}

impl ArchiveHandle {
    /// Writes every file and nested archive of the root level below `dir`.
    ///
    /// Stored bytes are written as-is, so compressed entries stay
    /// compressed. `dir` is created if missing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::PathTraversal`] if an entry would land outside
    /// `dir`, and [`crate::Error::Io`] for host failures.
    pub fn extract_to(&self, dir: impl AsRef<Path>) -> Result<ExtractResult> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let mut result = ExtractResult::default();
        extract_nodes(self.root().children(), "", dir, &mut result)?;
        log::debug!(
            "extracted {} files ({} bytes) to {}",
            result.files_written,
            result.bytes_written,
            dir.display()
        );
        Ok(result)
    }

    /// Replaces or adds every regular file found below `dir`.
    ///
    /// Paths are taken relative to `dir` with `/` separators. Entries that
    /// exist only in the archive are left alone. All files are applied as
    /// one atomic batch.
    pub fn sync_from_folder(&mut self, dir: impl AsRef<Path>) -> Result<EditResult> {
        let operations = collect_folder(dir.as_ref())?;
        log::debug!(
            "syncing {} files from {}",
            operations.len(),
            dir.as_ref().display()
        );
        self.apply(operations)
    }
}

fn extract_nodes(
    children: &[ArchiveNode],
    prefix: &str,
    dir: &Path,
    result: &mut ExtractResult,
) -> Result<()> {
    for child in children {
        let virtual_path = if prefix.is_empty() {
            child.name().to_string()
        } else {
            format!("{}/{}", prefix, child.name())
        };
        let data = match &child.content {
            NodeContent::Directory { children } => {
                extract_nodes(children, &virtual_path, dir, result)?;
                continue;
            }
            NodeContent::File { data, .. } => data,
            NodeContent::Archive(nested) => &nested.stored,
        };

        let path = match ArchivePath::new(&virtual_path) {
            Ok(path) => path,
            Err(e) => {
                log::warn!("skipping '{}': {}", virtual_path, e);
                result.files_skipped += 1;
                continue;
            }
        };
        let target = validate_extract_path(&path, dir)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, data)?;
        result.files_written += 1;
        result.bytes_written += data.len() as u64;
    }
    Ok(())
}

/// Builds one replace operation per regular file below `dir`.
///
/// Files are visited in file-name order. Symlinks are not followed and are
/// skipped along with other non-regular files.
pub fn collect_folder(dir: &Path) -> Result<Vec<Operation>> {
    let mut operations = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if !file_type.is_file() {
            log::warn!("skipping non-regular file {}", entry.path().display());
            continue;
        }

        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        let path = ArchivePath::from_host(relative)?;
        let data = fs::read(entry.path())?;
        log::trace!("{} -> {}", entry.path().display(), path);
        operations.push(Operation::Replace { path, data });
    }
    Ok(operations)
}
