//! Error types for attachment collection and index persistence.
//!
//! Only failures against durable storage (and configuration / record
//! decoding) surface as [`AttachmentError`]. Problems with individual
//! attachment references are recovered locally and reported as
//! [`crate::diagnostics::ScanWarning`] values instead.

use std::path::PathBuf;

/// Result type for attachment operations.
pub type AttachmentResult<T> = Result<T, AttachmentError>;

/// Errors that abort a collection pass or a record operation.
#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    /// Copy or directory creation against the attachment store failed.
    #[error("storage I/O error at {}: {source}", path.display())]
    StorageIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be read or is not supported.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// The persisted index record could not be read or written.
    #[error("index record error: {message}")]
    Record { message: String },
}

impl AttachmentError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StorageIo {
            path: path.into(),
            source,
        }
    }

    /// Returns true if this error came from the attachment store.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageIo { .. })
    }

    /// Suggested exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Record { .. } => 3,
            Self::StorageIo { .. } => 4,
        }
    }
}
