//! Error types for catsplit core.

use catsplit_codec::CodecError;
use catsplit_storage::StorageError;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while building, publishing or reading back a
/// partition set.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The compressor failed to write, flush or finish. Fatal for the build.
    #[error("encoding error: {0}")]
    Codec(#[from] CodecError),

    /// Storage error outside of a descriptor upsert.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A single document does not fit in an empty storage object.
    ///
    /// Documents are never split, so the whole build fails.
    #[error(
        "segment {index} ({size} bytes) does not fit within the {ceiling} byte capacity once encoded"
    )]
    OversizeSegment {
        /// Position of the segment in the content.
        index: usize,
        /// Uncompressed size of the segment.
        size: usize,
        /// Capacity ceiling the segment was probed against.
        ceiling: usize,
    },

    /// A sealed descriptor ended up larger than the storage object limit.
    #[error("descriptor {name} is {size} bytes, exceeding the {limit} byte limit")]
    CapacityExceeded {
        /// Descriptor name.
        name: String,
        /// Total descriptor size (metadata plus payload).
        size: usize,
        /// Storage object size limit.
        limit: usize,
    },

    /// Persisting a descriptor failed.
    #[error("failed to persist {name} after {attempts} attempt(s): {source}")]
    Persistence {
        /// Name of the descriptor that could not be stored.
        name: String,
        /// Number of attempts made.
        attempts: u32,
        /// The last storage error.
        #[source]
        source: StorageError,
    },

    /// The configuration cannot produce a valid partition set.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// A set of descriptors is not a complete, ordered partition set.
    #[error("invalid descriptor set: {message}")]
    InvalidDescriptorSet {
        /// Description of the problem.
        message: String,
    },
}

impl CoreError {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid descriptor set error.
    pub fn invalid_descriptor_set(message: impl Into<String>) -> Self {
        Self::InvalidDescriptorSet {
            message: message.into(),
        }
    }

    /// Returns the descriptor name if this is a persistence failure, so the
    /// caller can retry that descriptor alone.
    pub fn failed_descriptor(&self) -> Option<&str> {
        match self {
            CoreError::Persistence { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversize_display() {
        let err = CoreError::OversizeSegment {
            index: 3,
            size: 2_000_000,
            ceiling: 1_048_563,
        };
        let message = err.to_string();
        assert!(message.contains("segment 3"));
        assert!(message.contains("1048563"));
    }

    #[test]
    fn persistence_carries_name() {
        let err = CoreError::Persistence {
            name: "catalog-partition-2".into(),
            attempts: 3,
            source: StorageError::unavailable("throttled"),
        };
        assert_eq!(err.failed_descriptor(), Some("catalog-partition-2"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(CoreError::invalid_config("x").failed_descriptor().is_none());
    }
}
