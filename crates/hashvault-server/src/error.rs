//! # API Error Types
//!
//! Maps vault and auth errors onto HTTP status codes and a flat JSON body:
//!
//! ```json
//! { "error": "Validation failed", "details": ["Password must be at least 6 characters"] }
//! ```
//!
//! Internal failures are logged and rendered as a generic message.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hashvault::VaultError;
use hashvault_auth::AuthError;

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

/// Error returned by every handler.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or unacceptable input (400).
    #[error("{0}")]
    BadRequest(String),

    /// Input failed validation, one entry per violation (400).
    #[error("Validation failed")]
    Invalid(Vec<String>),

    /// Missing, malformed or expired credentials (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but lacking a capability (403).
    #[error("{0}")]
    Forbidden(String),

    /// Unknown submission (404).
    #[error("{0}")]
    NotFound(String),

    /// Identity already registered (409).
    #[error("{0}")]
    Conflict(String),

    /// Upload over the configured ceiling (413).
    #[error("File too large")]
    PayloadTooLarge { limit: Option<u64> },

    /// Anything else (500). Logged, never shown.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Internal(_) => ErrorBody {
                error: "Internal server error".to_string(),
                message: None,
                details: None,
            },
            Self::Invalid(details) => ErrorBody {
                error: self.to_string(),
                message: None,
                details: Some(details.clone()),
            },
            Self::PayloadTooLarge { limit } => ErrorBody {
                error: self.to_string(),
                message: limit.map(|bytes| {
                    format!("Maximum file size is {} MB", bytes / (1024 * 1024))
                }),
                details: None,
            },
            other => ErrorBody {
                error: other.to_string(),
                message: None,
                details: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(ref detail) = self {
            tracing::error!(error = %detail, "internal server error");
        }
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<VaultError> for ApiError {
    fn from(err: VaultError) -> Self {
        match err {
            VaultError::Validation(msg) => Self::BadRequest(msg),
            VaultError::NotFound(_) => Self::NotFound(err.to_string()),
            VaultError::PayloadTooLarge { limit } => Self::PayloadTooLarge { limit: Some(limit) },
            VaultError::Io(e) => {
                tracing::warn!(error = %e, "upload stream failed");
                Self::BadRequest("Failed to read uploaded file".to_string())
            }
            VaultError::ConflictExhausted { .. } | VaultError::Store(_) | VaultError::Core(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(details) => Self::Invalid(details),
            AuthError::AccountExists => Self::Conflict(err.to_string()),
            AuthError::MissingCredentials => Self::BadRequest(err.to_string()),
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::Expired => Self::Unauthorized(err.to_string()),
            AuthError::Forbidden(_) => Self::Forbidden(err.to_string()),
            AuthError::Crypto(_) | AuthError::Store(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge { limit: None }
        } else {
            Self::BadRequest(err.body_text())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(_: JsonRejection) -> Self {
        Self::BadRequest("Request body must be JSON".to_string())
    }
}
