//! # Error Types
//!
//! Errors shared across subsystems.

use thiserror::Error;

/// Errors raised while encoding or decoding opaque payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Payload could not be decoded into the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// Value could not be encoded.
    #[error("encoding failed: {0}")]
    Encoding(String),
}
