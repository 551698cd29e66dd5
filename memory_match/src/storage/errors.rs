//! Storage error types.

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](super::KeyValueStore) backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key contains characters the backend cannot store
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Backend refused the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
