//! Error types for reference store operations.

use thiserror::Error;

/// Errors that can occur during reference store operations.
///
/// Data-quality problems in loaded documents are never errors; they are
/// recorded as diagnostics on the store instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A reference with this id is already indexed.
    #[error("duplicate reference id: {id}")]
    DuplicateId { id: String },

    /// The payload carries a key reserved for the record header.
    #[error("reference {id} has reserved payload field: {field}")]
    ReservedField { id: String, field: String },

    /// Serialization failure while encoding the document envelope.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
