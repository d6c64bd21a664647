//! Error types for HashVault core primitives.

use thiserror::Error;

/// Errors raised while hashing content or encoding canonical data.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The input stream failed before it was exhausted.
    #[error("stream read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The input grew past the configured size ceiling.
    #[error("payload exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
