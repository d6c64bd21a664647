//! Hash-chain audit over ledger entries.

use hashvault_core::{Digest, LedgerEntry};

/// Outcome of auditing the whole ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    /// Number of entries examined.
    pub length: u64,
    /// Anchor hash of the last entry.
    pub head: Option<Digest>,
    pub valid: bool,
    /// Seq of the first entry that fails, if any.
    pub first_broken_seq: Option<u64>,
}

/// Check `entries` (ascending by seq) for contiguous seq numbers, correct
/// back-links and anchors that match the stored fields.
pub fn audit_entries(entries: &[LedgerEntry]) -> ChainReport {
    let mut prev: Option<Digest> = None;
    let mut first_broken_seq = None;

    for (i, entry) in entries.iter().enumerate() {
        let expected_seq = i as u64 + 1;
        let intact = entry.anchor.seq == expected_seq
            && entry.anchor.prev_anchor_hash == prev
            && entry.anchor_is_intact();

        if !intact {
            first_broken_seq = Some(expected_seq);
            break;
        }
        prev = Some(entry.anchor.anchor_hash);
    }

    ChainReport {
        length: entries.len() as u64,
        head: entries.last().map(|e| e.anchor.anchor_hash),
        valid: first_broken_seq.is_none(),
        first_broken_seq,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashvault_core::{hash_bytes, Anchor, SubmissionId, SubmissionRecord};

    fn chain(n: u64) -> Vec<LedgerEntry> {
        let mut entries = Vec::new();
        let mut prev = None;
        for seq in 1..=n {
            let outcome = hash_bytes(&seq.to_be_bytes());
            let record = SubmissionRecord {
                id: SubmissionId::normalize(&format!("HV-{seq:016X}")),
                owner: "TEAM".into(),
                filename: "f.txt".into(),
                content_type: "text/plain".into(),
                size: outcome.size,
                digest: outcome.digest,
                created_at: seq as i64,
                submitted_by: None,
            };
            let anchor = Anchor::compute(&record, seq, seq as i64, prev);
            prev = Some(anchor.anchor_hash);
            entries.push(LedgerEntry { record, anchor });
        }
        entries
    }

    #[test]
    fn test_empty_chain_is_valid() {
        let report = audit_entries(&[]);
        assert!(report.valid);
        assert_eq!(report.length, 0);
        assert_eq!(report.head, None);
    }

    #[test]
    fn test_intact_chain() {
        let entries = chain(5);
        let report = audit_entries(&entries);
        assert!(report.valid);
        assert_eq!(report.length, 5);
        assert_eq!(report.head, Some(entries[4].anchor.anchor_hash));
    }

    #[test]
    fn test_edited_digest_detected() {
        let mut entries = chain(5);
        entries[2].record.digest = hash_bytes(b"forged").digest;
        let report = audit_entries(&entries);
        assert!(!report.valid);
        assert_eq!(report.first_broken_seq, Some(3));
    }

    #[test]
    fn test_removed_entry_detected() {
        let mut entries = chain(5);
        entries.remove(1);
        let report = audit_entries(&entries);
        assert!(!report.valid);
        assert_eq!(report.first_broken_seq, Some(2));
    }

    #[test]
    fn test_reordered_entries_detected() {
        let mut entries = chain(4);
        entries.swap(2, 3);
        assert_eq!(audit_entries(&entries).first_broken_seq, Some(3));
    }
}
