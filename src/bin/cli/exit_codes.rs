//! Exit codes for the CLI tool.

use wildbits::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Archive or table format error
pub const BAD_ARCHIVE: i32 = 3;
/// Virtual path did not resolve
pub const NOT_FOUND: i32 = 4;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Name collision on rename or add
pub const CONFLICT: i32 = 6;
/// Ctrl+C (128 + SIGINT)
pub const USER_INTERRUPT: i32 = 130;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    FatalError,
    BadArchive,
    NotFound,
    IoError,
    Conflict,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::NotFound => NOT_FOUND,
            Self::IoError => IO_ERROR,
            Self::Conflict => CONFLICT,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts a wildbits error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    if error.is_format_error() || error.is_index_error() {
        return ExitCode::BadArchive;
    }
    if error.is_not_found() {
        return ExitCode::NotFound;
    }
    if error.is_conflict() {
        return ExitCode::Conflict;
    }
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::InvalidArchivePath(_) | Error::InvalidName { .. } => ExitCode::BadArgs,
        _ => ExitCode::FatalError,
    }
}
