//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An object with this name already exists.
    #[error("object already exists: {name}")]
    AlreadyExists {
        /// Name of the conflicting object.
        name: String,
    },

    /// No object with this name exists.
    #[error("object not found: {name}")]
    NotFound {
        /// Name of the missing object.
        name: String,
    },

    /// The object name cannot be used by this store.
    #[error("invalid object name: {name:?}")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// A stored object could not be read back.
    #[error("storage corrupted: {0}")]
    Corrupted(String),

    /// The store is temporarily unable to serve the request.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

impl StorageError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Returns true if retrying the same request may succeed.
    ///
    /// `AlreadyExists` and `NotFound` are not retryable as-is: an upsert
    /// handles them by switching between create and update.
    pub fn is_retryable(&self) -> bool {
        match self {
            StorageError::Unavailable { .. } => true,
            StorageError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::Interrupted
                    | io::ErrorKind::WouldBlock
                    | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}
