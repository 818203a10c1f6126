//! Path validation for writing archive entries to the host.

use std::path::{Component, Path, PathBuf};

use crate::{ArchivePath, Error, Result};

/// Validates that `archive_path` stays inside `dest_root` once joined.
///
/// [`ArchivePath`] already rejects `..` and absolute paths. This adds the
/// host-specific checks: segments containing a backslash or drive colon
/// are refused, and the joined path is resolved against the deepest
/// existing ancestor so that symlinked directories cannot redirect the
/// write elsewhere.
///
/// `dest_root` must exist.
///
/// # Returns
///
/// The full path to write to, or [`Error::PathTraversal`].
pub fn validate_extract_path(archive_path: &ArchivePath, dest_root: &Path) -> Result<PathBuf> {
    let traversal = || Error::PathTraversal {
        path: archive_path.to_string(),
    };

    if archive_path
        .components()
        .any(|segment| segment.contains('\\') || segment.contains(':'))
    {
        return Err(traversal());
    }

    let full_path = dest_root.join(archive_path.as_str());
    if full_path
        .strip_prefix(dest_root)
        .map_err(|_| traversal())?
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(traversal());
    }

    let canonical_dest = dest_root.canonicalize()?;

    // Canonicalize the deepest existing ancestor, then re-append the rest
    let mut ancestor = full_path.as_path();
    let mut pending = Vec::new();
    while !ancestor.exists() {
        if let Some(name) = ancestor.file_name() {
            pending.push(name.to_os_string());
        }
        match ancestor.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => ancestor = parent,
            _ => return Err(traversal()),
        }
    }
    let mut resolved = ancestor.canonicalize()?;
    for name in pending.into_iter().rev() {
        resolved.push(name);
    }

    if !resolved.starts_with(&canonical_dest) {
        return Err(traversal());
    }
    Ok(full_path)
}
