//! Submission records and their anchors.
//!
//! A record is immutable once committed. The ledger assigns the anchor in
//! the same atomic step that makes the record visible.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::canonical::{anchor_bytes, ANCHOR_DOMAIN};
use crate::types::{Digest, SubmissionId};

/// Metadata committed for one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    /// Submitting team.
    pub owner: String,
    pub filename: String,
    pub content_type: String,
    /// Exact number of bytes hashed.
    pub size: u64,
    pub digest: Digest,
    /// Unix milliseconds.
    pub created_at: i64,
    /// Authenticated username, when the caller presented a session.
    pub submitted_by: Option<String>,
}

/// Hash-chain link for a committed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// 1-based position in the ledger. Gap-free.
    pub seq: u64,
    /// Unix milliseconds.
    pub anchored_at: i64,
    pub prev_anchor_hash: Option<Digest>,
    pub anchor_hash: Digest,
}

impl Anchor {
    /// Compute the anchor for `record` at position `seq` after `prev`.
    pub fn compute(
        record: &SubmissionRecord,
        seq: u64,
        anchored_at: i64,
        prev: Option<Digest>,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(ANCHOR_DOMAIN);
        hasher.update(anchor_bytes(record, seq, anchored_at, prev.as_ref()));

        Self {
            seq,
            anchored_at,
            prev_anchor_hash: prev,
            anchor_hash: Digest(hasher.finalize().into()),
        }
    }
}

/// A committed record together with its anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub record: SubmissionRecord,
    pub anchor: Anchor,
}

impl LedgerEntry {
    /// Recompute the anchor hash from the stored fields and compare.
    pub fn anchor_is_intact(&self) -> bool {
        let expected = Anchor::compute(
            &self.record,
            self.anchor.seq,
            self.anchor.anchored_at,
            self.anchor.prev_anchor_hash,
        );
        expected.anchor_hash == self.anchor.anchor_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::hash_bytes;

    fn record(id: &str, content: &[u8]) -> SubmissionRecord {
        let outcome = hash_bytes(content);
        SubmissionRecord {
            id: SubmissionId::normalize(id),
            owner: "team".into(),
            filename: "a.txt".into(),
            content_type: "text/plain".into(),
            size: outcome.size,
            digest: outcome.digest,
            created_at: 1_000,
            submitted_by: None,
        }
    }

    #[test]
    fn test_anchor_chain_links() {
        let r1 = record("HV-0000000000000001", b"one");
        let r2 = record("HV-0000000000000002", b"two");

        let a1 = Anchor::compute(&r1, 1, 10, None);
        let a2 = Anchor::compute(&r2, 2, 11, Some(a1.anchor_hash));

        assert_eq!(a2.prev_anchor_hash, Some(a1.anchor_hash));
        assert_ne!(a1.anchor_hash, a2.anchor_hash);
    }

    #[test]
    fn test_tampered_entry_detected() {
        let r = record("HV-0000000000000001", b"one");
        let anchor = Anchor::compute(&r, 1, 10, None);
        let mut entry = LedgerEntry { record: r, anchor };
        assert!(entry.anchor_is_intact());

        entry.record.digest = hash_bytes(b"uno").digest;
        assert!(!entry.anchor_is_intact());
    }
}
