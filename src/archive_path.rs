//! Virtual path type with validation.
//!
//! An [`ArchivePath`] addresses any node of an archive tree, including
//! nodes inside nested archives: `Pack/Actor.sbactorpack/Model/Npc.bfres`
//! walks through the `Pack` directory, into the nested `Actor.sbactorpack`
//! archive, and down to the model file. No marker is needed at the archive
//! boundary; resolution decides segment by segment.

use crate::{Error, Result};
use std::fmt;
use std::path::{Component, Path};

/// Maximum length for virtual paths (in bytes).
const MAX_PATH_LENGTH: usize = 32768;

/// A validated, slash-separated virtual path.
///
/// `ArchivePath` validates that:
/// - No NUL bytes are present
/// - The path is not absolute (does not start with `/`)
/// - No empty segments exist (no `//` or trailing `/`)
/// - No `.` or `..` segments are present
///
/// # Examples
///
/// ```
/// use wildbits::ArchivePath;
///
/// let path = ArchivePath::new("Pack/Title.sarc/Model/Tree.bfres").unwrap();
/// assert_eq!(path.file_name(), "Tree.bfres");
///
/// assert!(ArchivePath::new("../secret").is_err());
/// assert!(ArchivePath::new("/absolute/path").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchivePath(String);

impl ArchivePath {
    /// Creates a new `ArchivePath` from a string, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArchivePath`] if the path is empty, absolute,
    /// contains NUL bytes, empty segments, or `.`/`..` segments.
    pub fn new(s: &str) -> Result<Self> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }

    /// Builds a virtual path from a relative host path.
    ///
    /// Host separators are normalized to `/`. Used when mirroring a host
    /// directory into an archive.
    pub fn from_host(relative: &Path) -> Result<Self> {
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_str().ok_or_else(|| {
                        Error::InvalidArchivePath(format!(
                            "host path '{}' is not valid UTF-8",
                            relative.display()
                        ))
                    })?;
                    segments.push(part);
                }
                Component::CurDir => {}
                _ => {
                    return Err(Error::InvalidArchivePath(format!(
                        "host path '{}' is not relative",
                        relative.display()
                    )));
                }
            }
        }
        Self::new(&segments.join("/"))
    }

    /// Validates a virtual path string.
    fn validate(s: &str) -> Result<()> {
        if s.contains('\0') {
            return Err(Error::InvalidArchivePath("contains NUL byte".into()));
        }

        if s.is_empty() {
            return Err(Error::InvalidArchivePath("empty path".into()));
        }

        if s.len() > MAX_PATH_LENGTH {
            return Err(Error::InvalidArchivePath(format!(
                "path exceeds maximum length of {} bytes",
                MAX_PATH_LENGTH
            )));
        }

        if s.starts_with('/') {
            return Err(Error::InvalidArchivePath(
                "absolute path not allowed".into(),
            ));
        }

        if s.ends_with('/') {
            return Err(Error::InvalidArchivePath(
                "trailing slash not allowed".into(),
            ));
        }

        for segment in s.split('/') {
            validate_segment(segment)?;
        }

        Ok(())
    }

    /// Returns the path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins this path with another segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting path would be invalid.
    pub fn join(&self, other: &str) -> Result<Self> {
        let joined = format!("{}/{}", self.0, other);
        Self::new(&joined)
    }

    /// Returns the parent of this path, if any.
    ///
    /// Returns `None` if this path is a single segment.
    pub fn parent(&self) -> Option<Self> {
        self.0
            .rfind('/')
            .map(|idx| Self(self.0[..idx].to_string()))
    }

    /// Returns the file name (last segment) of this path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns an iterator over the path segments.
    ///
    /// ```
    /// use wildbits::ArchivePath;
    ///
    /// let path = ArchivePath::new("a/b/c.bin").unwrap();
    /// let components: Vec<_> = path.components().collect();
    /// assert_eq!(components, vec!["a", "b", "c.bin"]);
    /// ```
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Returns the number of segments.
    pub fn depth(&self) -> usize {
        self.components().count()
    }
}

/// Validates a single entry name (one path segment).
///
/// Used by rename, where the new name must not introduce separators.
pub fn validate_segment(segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(Error::InvalidArchivePath(
            "empty segment (consecutive slashes)".into(),
        ));
    }
    if segment.contains('/') {
        return Err(Error::InvalidArchivePath(format!(
            "name '{}' must not contain '/'",
            segment
        )));
    }
    if segment.contains('\0') {
        return Err(Error::InvalidArchivePath("contains NUL byte".into()));
    }
    if segment == "." {
        return Err(Error::InvalidArchivePath("'.' segment not allowed".into()));
    }
    if segment == ".." {
        return Err(Error::InvalidArchivePath(
            "'..' segment not allowed (path traversal)".into(),
        ));
    }
    Ok(())
}

impl AsRef<str> for ArchivePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for ArchivePath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ArchivePath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}
