//! Error types for IronArc operations.
//!
//! Every error is detected at the point of violation and surfaced to the
//! caller immediately; the decoders never retry internally and never return
//! partial output without a signaled error.

use std::io;
use thiserror::Error;

/// The main error type for IronArc operations.
#[derive(Debug, Error)]
pub enum IronArcError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input ended before a required byte could be produced.
    ///
    /// Raised during header parsing, range-coder renormalization, or any
    /// other forced read from an exhausted source.
    #[error("Truncated input: expected {needed} more bytes")]
    TruncatedInput {
        /// Number of bytes that were required but not available.
        needed: usize,
    },

    /// A back-reference distance exceeds the bytes produced so far or the
    /// declared dictionary size.
    #[error("Invalid back-reference distance: {distance} exceeds history size {available}")]
    InvalidDistance {
        /// The offending zero-based distance.
        distance: u64,
        /// Bytes of history actually available.
        available: u64,
    },

    /// Malformed header or out-of-range format parameters.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Corrupted data detected mid-stream.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Uncompressed byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// A format feature this library does not support.
    #[error("Unsupported feature: {feature}")]
    Unsupported {
        /// Description of the unsupported feature.
        feature: String,
    },
}

/// Result type alias for IronArc operations.
pub type Result<T> = std::result::Result<T, IronArcError>;

impl IronArcError {
    /// Create a truncated input error.
    pub fn truncated(needed: usize) -> Self {
        Self::TruncatedInput { needed }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: u64, available: u64) -> Self {
        Self::InvalidDistance {
            distance,
            available,
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an unsupported feature error.
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IronArcError::truncated(5);
        assert!(err.to_string().contains("5 more bytes"));

        let err = IronArcError::invalid_distance(10, 0);
        assert!(err.to_string().contains("10"));

        let err = IronArcError::invalid_header("bad properties byte");
        assert!(err.to_string().contains("bad properties byte"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: IronArcError = io_err.into();
        assert!(matches!(err, IronArcError::Io(_)));
    }
}
