//! Error types for backup store operations.

use std::path::PathBuf;

use refvault_store::StoreError;
use thiserror::Error;

/// Errors that can occur while creating, reading, or writing a document.
#[derive(Debug, Error)]
pub enum BackupError {
    /// The configured file name has no extension separator.
    #[error("file name has no extension: {file_name}")]
    MissingExtension { file_name: String },

    /// `create` found an existing primary document.
    #[error("document already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    /// `write` found no latest backup; the chain was never created.
    #[error("backup chain not initialized, missing {}", path.display())]
    MissingBackupChain { path: PathBuf },

    /// `read` found no primary document.
    #[error("document not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Rotation was asked to run without a latest backup to archive.
    #[error("cannot rotate backups, missing {}", path.display())]
    RotationPrecondition { path: PathBuf },

    /// Invalid configuration text.
    #[error("invalid config: {0}")]
    Config(String),

    /// Encoding the document failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error from the file system.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for backup operations.
pub type BackupResult<T> = std::result::Result<T, BackupError>;
