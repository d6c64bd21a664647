//! Upload metadata: vault configuration, filename policy, submit requests.

use std::collections::BTreeSet;

use crate::error::{Result, VaultError};

/// Content type recorded when the client sends none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Filename recorded when sanitizing leaves nothing.
pub const FALLBACK_FILENAME: &str = "uploaded_file";

/// Default upload ceiling: 60 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 60 * 1024 * 1024;

/// Default number of ids tried before giving up on a submit.
pub const DEFAULT_ID_RETRY_BUDGET: u32 = 5;

const DEFAULT_EXTENSIONS: &[&str] = &[
    "txt", "pdf", "png", "jpg", "jpeg", "gif", "zip", "rar", "doc", "docx", "ppt", "pptx", "xls",
    "xlsx", "py", "js", "html", "css", "json", "csv", "md",
];

/// Configuration for the Vault.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Fresh ids drawn per submit before `ConflictExhausted`.
    pub id_retry_budget: u32,
    /// Uploads longer than this are rejected while streaming.
    pub max_upload_bytes: u64,
    /// Lowercase extensions accepted on submit. Empty accepts anything.
    pub allowed_extensions: BTreeSet<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            id_retry_budget: DEFAULT_ID_RETRY_BUDGET,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl VaultConfig {
    /// Whether `filename` carries an accepted extension.
    pub fn extension_allowed(&self, filename: &str) -> bool {
        if self.allowed_extensions.is_empty() {
            return true;
        }
        match filename.rsplit_once('.') {
            Some((_, ext)) => self.allowed_extensions.contains(&ext.to_ascii_lowercase()),
            None => false,
        }
    }

    /// Validate a client filename and return the sanitized form to store.
    pub fn check_filename(&self, raw: &str) -> Result<String> {
        if raw.trim().is_empty() {
            return Err(VaultError::Validation("No file selected".into()));
        }
        if !self.extension_allowed(raw) {
            return Err(VaultError::Validation("File type not allowed".into()));
        }
        Ok(sanitize_filename(raw))
    }

    /// Validate the submitting team and return it trimmed.
    pub fn check_team(&self, raw: &str) -> Result<String> {
        let team = raw.trim();
        if team.is_empty() {
            return Err(VaultError::Validation("No team provided".into()));
        }
        Ok(team.to_string())
    }
}

/// Reduce a client filename to a safe ASCII basename.
///
/// Path separators become spaces, whitespace runs become `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped and leading or trailing `.`/`_` are
/// trimmed. An empty result becomes [`FALLBACK_FILENAME`].
pub fn sanitize_filename(raw: &str) -> String {
    let spaced: String = raw
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Client-supplied metadata for one submit.
#[derive(Debug, Clone, Default)]
pub struct SubmitRequest {
    /// Submitting team, stored as the record owner.
    pub team: String,
    /// Filename as the client sent it.
    pub filename: String,
    pub content_type: Option<String>,
    /// Authenticated username, when the caller presented a session.
    pub submitted_by: Option<String>,
}

impl SubmitRequest {
    pub fn new(team: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            filename: filename.into(),
            ..Self::default()
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn submitted_by(mut self, username: impl Into<String>) -> Self {
        self.submitted_by = Some(username.into());
        self
    }
}

/// A submit request after validation.
#[derive(Debug, Clone)]
pub(crate) struct CheckedRequest {
    pub owner: String,
    pub filename: String,
    pub content_type: String,
    pub submitted_by: Option<String>,
}

impl SubmitRequest {
    pub(crate) fn check(&self, config: &VaultConfig) -> Result<CheckedRequest> {
        let owner = config.check_team(&self.team)?;
        let filename = config.check_filename(&self.filename)?;

        let content_type = self
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let submitted_by = self
            .submitted_by
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string);

        Ok(CheckedRequest {
            owner,
            filename,
            content_type,
            submitted_by,
        })
    }
}
