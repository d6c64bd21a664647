//! Error types for the Vault.

use hashvault_core::CoreError;
use hashvault_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Missing or unacceptable input. The message is client-safe.
    #[error("{0}")]
    Validation(String),

    /// No record under the requested id.
    #[error("Submission not found: {0}")]
    NotFound(String),

    /// The upload stream failed before it was exhausted.
    #[error("stream read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The upload grew past the configured ceiling.
    #[error("payload exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    /// Every id drawn within the retry budget was already taken.
    #[error("no free submission id after {attempts} attempts")]
    ConflictExhausted { attempts: u32 },

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Encoding or digest error from the core.
    #[error("core error: {0}")]
    Core(CoreError),
}

impl From<CoreError> for VaultError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Io(e) => Self::Io(e),
            CoreError::PayloadTooLarge { limit } => Self::PayloadTooLarge { limit },
            other => Self::Core(other),
        }
    }
}

impl VaultError {
    /// Whether the caller can reasonably try the same request again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::ConflictExhausted { .. })
    }
}

/// Result type for Vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
