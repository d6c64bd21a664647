//! Response bodies.
//!
//! Digests render as lowercase hex, timestamps as RFC 3339 UTC.

use serde::{Deserialize, Serialize};

use hashvault::{ChainReport, Stats, Verification};
use hashvault_auth::Session;
use hashvault_core::{millis_to_rfc3339, Account, Anchor, LedgerEntry};

/// The hash-chain link of a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorView {
    pub seq: u64,
    pub anchored_at: String,
    pub anchor_hash: String,
    pub previous_anchor_hash: Option<String>,
}

impl From<&Anchor> for AnchorView {
    fn from(anchor: &Anchor) -> Self {
        Self {
            seq: anchor.seq,
            anchored_at: millis_to_rfc3339(anchor.anchored_at),
            anchor_hash: anchor.anchor_hash.to_hex(),
            previous_anchor_hash: anchor.prev_anchor_hash.map(|d| d.to_hex()),
        }
    }
}

/// A committed submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionView {
    pub submission_id: String,
    pub file_hash: String,
    pub filename: String,
    pub file_size: u64,
    pub timestamp: String,
    pub content_type: String,
    pub team: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,
    pub blockchain_anchor: AnchorView,
}

impl From<&LedgerEntry> for SubmissionView {
    fn from(entry: &LedgerEntry) -> Self {
        let record = &entry.record;
        Self {
            submission_id: record.id.to_string(),
            file_hash: record.digest.to_hex(),
            filename: record.filename.clone(),
            file_size: record.size,
            timestamp: millis_to_rfc3339(record.created_at),
            content_type: record.content_type.clone(),
            team: record.owner.clone(),
            submitted_by: record.submitted_by.clone(),
            blockchain_anchor: AnchorView::from(&entry.anchor),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationView {
    pub verified: bool,
    pub status: String,
    pub submission_id: String,
    pub original_hash: String,
    pub uploaded_hash: String,
    /// Creation time of the original submission.
    pub timestamp: String,
    pub blockchain_anchor: AnchorView,
}

impl From<&Verification> for VerificationView {
    fn from(v: &Verification) -> Self {
        Self {
            verified: v.verified,
            status: v.status().to_string(),
            submission_id: v.submission_id().to_string(),
            original_hash: v.original_hash.to_hex(),
            uploaded_hash: v.uploaded_hash.to_hex(),
            timestamp: millis_to_rfc3339(v.timestamp()),
            blockchain_anchor: AnchorView::from(&v.entry.anchor),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsView {
    pub total_hashes: u64,
    pub active_nodes: u32,
    pub system_health: String,
    pub network_status: String,
}

impl From<Stats> for StatsView {
    fn from(stats: Stats) -> Self {
        Self {
            total_hashes: stats.total_hashes,
            active_nodes: stats.active_nodes,
            system_health: stats.system_health.to_string(),
            network_status: stats.network_status.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

impl From<&Account> for UserView {
    fn from(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role.as_str().to_string(),
            created_at: millis_to_rfc3339(account.created_at),
        }
    }
}

/// Login and signup response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub message: String,
    pub token: String,
    pub expires_at: String,
    pub user: UserView,
}

impl SessionView {
    pub fn new(message: &str, session: &Session) -> Self {
        Self {
            message: message.to_string(),
            token: session.token.clone(),
            expires_at: millis_to_rfc3339(session.expires_at),
            user: UserView::from(&session.account),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeView {
    pub user: UserView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionListView {
    pub count: usize,
    /// Total records in the ledger, which may exceed `count`.
    pub total: u64,
    pub submissions: Vec<SubmissionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditView {
    pub length: u64,
    pub valid: bool,
    pub head_anchor_hash: Option<String>,
    pub first_broken_seq: Option<u64>,
}

impl From<&ChainReport> for AuditView {
    fn from(report: &ChainReport) -> Self {
        Self {
            length: report.length,
            valid: report.valid,
            head_anchor_hash: report.head.map(|d| d.to_hex()),
            first_broken_seq: report.first_broken_seq,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthView {
    pub status: String,
    pub message: String,
}
