//! Error types for the auth module.

use thiserror::Error;

use crate::capability::Capability;

/// Errors that can occur during authentication.
///
/// Display strings are safe to show to clients except for `Store` and
/// `Crypto`, which callers must log instead.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Signup input failed validation. Each entry names one violation.
    #[error("Validation failed")]
    Validation(Vec<String>),

    /// Username or email already registered. The reply does not say which;
    /// signup logs the specific clash.
    #[error("Account already exists")]
    AccountExists,

    /// Login without an identifier or password.
    #[error("Username/email and password are required")]
    MissingCredentials,

    /// Unknown identifier or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No bearer token was presented.
    #[error("Authentication required")]
    MissingToken,

    /// Token is malformed or its signature does not verify.
    #[error("Invalid session token")]
    InvalidToken,

    /// Token signature is valid but it has expired.
    #[error("Session expired")]
    Expired,

    /// The session lacks the capability the operation needs.
    #[error("Missing capability: {0}")]
    Forbidden(Capability),

    /// Password hashing or signing failed.
    #[error("crypto failure: {0}")]
    Crypto(String),

    /// Storage error.
    #[error("store error: {0}")]
    Store(#[from] hashvault_store::StoreError),
}

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;
