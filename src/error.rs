//! Error types for archive tree and size table operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when opening, editing, or saving SARC archives and RSTB
//! resource-size tables, along with a convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! Every fallible operation returns `Result<T, Error>`. A failed edit never
//! changes the open document, so callers can report the error and carry on
//! with the previous state.
//!
//! ```rust,no_run
//! use wildbits::{ArchiveHandle, Error, OpenOptions};
//!
//! fn rename_model(path: &str) -> wildbits::Result<()> {
//!     let mut archive = ArchiveHandle::open_path(path, &OpenOptions::default())?;
//!     match archive.rename("Actor/Pack/Npc.sbactorpack/Model/Npc.bfres", "Npc_Old.bfres") {
//!         Ok(_) => {}
//!         Err(e) if e.is_not_found() => eprintln!("nothing to rename: {}", e),
//!         Err(e @ Error::EntryExists { .. }) => eprintln!("name taken: {}", e),
//!         Err(e) => return Err(e),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Error Kinds
//!
//! | Kind | Variants | Typical Cause |
//! |------|----------|---------------|
//! | Format | [`InvalidFormat`][Error::InvalidFormat], [`CorruptHeader`][Error::CorruptHeader] | Bytes are not a SARC/RSTB |
//! | Not found | [`EntryNotFound`][Error::EntryNotFound], [`PathThroughFile`][Error::PathThroughFile] | Virtual path does not resolve |
//! | Conflict | [`EntryExists`][Error::EntryExists], [`NotADirectory`][Error::NotADirectory] | Name collision on rename/add |
//! | I/O | [`Io`][Error::Io] | Host file system |
//! | Index | [`TruncatedTable`][Error::TruncatedTable] | Truncated size table |

use std::io;

/// The main error type for archive operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading or writing host files.
    ///
    /// I/O failures are surfaced verbatim and never retried.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The data does not start with a recognized header.
    ///
    /// The string describes what was expected vs. found.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// The header was recognized but its contents are inconsistent.
    #[error("Corrupt header at offset {offset:#x}: {reason}")]
    CorruptHeader {
        /// The byte offset where the inconsistency was detected.
        offset: u64,
        /// A description of the problem.
        reason: String,
    },

    /// Yaz0 data could not be decompressed.
    #[error("Yaz0 decompression failed: {reason}")]
    Decompression {
        /// A description of the failure.
        reason: String,
    },

    /// A virtual path does not resolve to an entry.
    #[error("Entry not found: {path}")]
    EntryNotFound {
        /// The path that was not found.
        path: String,
    },

    /// A virtual path continues past a plain file.
    ///
    /// `outer.pack/readme.txt/child` fails this way when `readme.txt` is a
    /// file rather than a directory or nested archive.
    #[error("Entry not found: {path} (path continues past file '{file}')")]
    PathThroughFile {
        /// The full path that was requested.
        path: String,
        /// The file segment the walk stopped at.
        file: String,
    },

    /// An entry with the target name already exists.
    #[error("Entry already exists: {path}")]
    EntryExists {
        /// The path that already exists.
        path: String,
    },

    /// A directory segment is required but a file occupies that name.
    #[error("Cannot place entries under file '{path}'")]
    NotADirectory {
        /// The path of the blocking file.
        path: String,
    },

    /// Extracting an entry would write outside the destination directory.
    #[error("Path traversal detected: {path}")]
    PathTraversal {
        /// The offending virtual path.
        path: String,
    },

    /// A virtual path or entry name is malformed.
    #[error("Invalid archive path: {0}")]
    InvalidArchivePath(String),

    /// A size table ended before the declared number of entries.
    #[error("Truncated size table: need {needed} bytes at offset {offset:#x}, have {available}")]
    TruncatedTable {
        /// Offset of the record that could not be read.
        offset: u64,
        /// Bytes needed to read the record.
        needed: usize,
        /// Bytes available in the buffer.
        available: usize,
    },

    /// A resource name cannot be stored in the size table name section.
    #[error("Invalid resource name '{name}': {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why the name was rejected.
        reason: &'static str,
    },

    /// The process-wide name dictionary was already installed.
    #[error("global name dictionary is already installed")]
    DictionaryInstalled,
}

impl Error {
    /// Returns `true` if the bytes did not match an expected header.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidFormat(_) | Error::CorruptHeader { .. } | Error::Decompression { .. }
        )
    }

    /// Returns `true` if a virtual path did not resolve.
    ///
    /// # Example
    ///
    /// ```rust
    /// use wildbits::Error;
    ///
    /// let err = Error::EntryNotFound { path: "a/b".into() };
    /// assert!(err.is_not_found());
    /// ```
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::EntryNotFound { .. } | Error::PathThroughFile { .. }
        )
    }

    /// Returns `true` if the operation collided with an existing entry.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::EntryExists { .. } | Error::NotADirectory { .. })
    }

    /// Returns `true` if a size table was truncated or its records are unreadable.
    pub fn is_index_error(&self) -> bool {
        matches!(self, Error::TruncatedTable { .. })
    }

    /// Returns the virtual path associated with this error, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::EntryNotFound { path }
            | Error::PathThroughFile { path, .. }
            | Error::EntryExists { path }
            | Error::NotADirectory { path }
            | Error::PathTraversal { path } => Some(path.as_str()),
            _ => None,
        }
    }

    /// Creates a CorruptHeader error.
    pub fn corrupt_header(offset: u64, reason: impl Into<String>) -> Self {
        Error::CorruptHeader {
            offset,
            reason: reason.into(),
        }
    }

    /// Creates an EntryNotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Error::EntryNotFound { path: path.into() }
    }

    /// Creates an EntryExists error.
    pub fn exists(path: impl Into<String>) -> Self {
        Error::EntryExists { path: path.into() }
    }
}

/// A specialized Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;
