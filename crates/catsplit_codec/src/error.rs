//! Error types for the codec crate.

use std::io;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while compressing or decompressing partition payloads.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The underlying compressor failed a write, flush or finish.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failed to encode data.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode a payload.
    #[error("decoding failed: {message}")]
    DecodingFailed {
        /// Description of the decoding error.
        message: String,
    },

    /// Decoded payload is not valid UTF-8.
    #[error("invalid UTF-8 in decoded payload")]
    InvalidUtf8,
}

impl CodecError {
    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Create a decoding failed error.
    pub fn decoding_failed(message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CodecError::encoding_failed("sealed twice");
        assert_eq!(err.to_string(), "encoding failed: sealed twice");

        let err = CodecError::InvalidUtf8;
        assert_eq!(err.to_string(), "invalid UTF-8 in decoded payload");
    }

    #[test]
    fn io_error_converts() {
        let io = io::Error::new(io::ErrorKind::Other, "disk on fire");
        let err: CodecError = io.into();
        assert!(matches!(err, CodecError::Io(_)));
    }
}
