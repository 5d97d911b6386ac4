//! Storage error handling
//!
//! Provides typed errors for record store operations with descriptive
//! messages and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use super::codec::CodecError;

/// Errors that can occur during record store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to create the directory holding the entries file
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A stored record could not be decoded
    #[error("Malformed record #{record} in '{path}': {source}")]
    MalformedRecord {
        path: PathBuf,
        /// Position of the record among non-empty records, starting at 0
        record: usize,
        #[source]
        source: CodecError,
    },

    /// Post text is empty or whitespace only
    #[error("Post content cannot be empty")]
    EmptyContent,

    /// Post text contains a reserved separator character
    #[error("Post content contains reserved character U+{code:04X}")]
    InvalidContent { character: char, code: u32 },
}

impl StoreError {
    /// Create an error for a failed read, classified by its kind
    pub fn from_read(error: io::Error, path: PathBuf) -> Self {
        match classify(&error) {
            Some(kind) => kind.into_error(error, path),
            None => StoreError::ReadError {
                path,
                source: error,
            },
        }
    }

    /// Create an error for a failed write, classified by its kind
    pub fn from_write(error: io::Error, path: PathBuf) -> Self {
        match classify(&error) {
            Some(kind) => kind.into_error(error, path),
            None => StoreError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Create an `InvalidContent` error for a reserved character
    pub fn invalid_content(character: char) -> Self {
        StoreError::InvalidContent {
            character,
            code: u32::from(character),
        }
    }

    /// Whether this error came from the filesystem
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            StoreError::CreateDirectory { .. }
                | StoreError::PermissionDenied { .. }
                | StoreError::DiskFull { .. }
                | StoreError::ReadError { .. }
                | StoreError::WriteError { .. }
        )
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors leave the store untouched; the caller may retry
    /// with different input or after fixing the environment.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StoreError::EmptyContent
                | StoreError::InvalidContent { .. }
                | StoreError::DiskFull { .. }
                | StoreError::PermissionDenied { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::DiskFull { .. } => Some("Free up disk space and try again."),
            StoreError::PermissionDenied { .. } => {
                Some("Check file and directory permissions. You may need to run with different permissions or change ownership.")
            }
            StoreError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            StoreError::MalformedRecord { .. } => {
                Some("The entries file was modified outside of microblog. Restore it from a backup or remove the damaged record by hand.")
            }
            StoreError::EmptyContent => Some("Write some text and post again."),
            StoreError::InvalidContent { .. } => {
                Some("Remove control characters from the text and post again.")
            }
            _ => None,
        }
    }
}

enum IoClass {
    PermissionDenied,
    DiskFull,
}

impl IoClass {
    fn into_error(self, source: io::Error, path: PathBuf) -> StoreError {
        match self {
            IoClass::PermissionDenied => StoreError::PermissionDenied { path, source },
            IoClass::DiskFull => StoreError::DiskFull { path, source },
        }
    }
}

fn classify(error: &io::Error) -> Option<IoClass> {
    match error.kind() {
        io::ErrorKind::PermissionDenied => Some(IoClass::PermissionDenied),
        _ if is_disk_full_error(error) => Some(IoClass::DiskFull),
        _ => None,
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    // StorageFull is not stable on every toolchain, so match the message
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for record store operations
pub type StoreResult<T> = Result<T, StoreError>;
