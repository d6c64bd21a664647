//! The Vault: submit, verify and inspect anchored file fingerprints.

use std::sync::Arc;

use hashvault_core::{
    digests_match, now_millis, Digest, HashOutcome, IdIssuer, LedgerEntry, RandomIdIssuer,
    SubmissionId, SubmissionRecord,
};
use hashvault_store::{InsertResult, Ledger};

use crate::audit::{audit_entries, ChainReport};
use crate::error::{Result, VaultError};
use crate::source::{hash_source, ChunkSource};
use crate::upload::{SubmitRequest, VaultConfig};

/// Verification status when the digests agree.
pub const STATUS_MATCH: &str = "MATCH — Integrity Confirmed";

/// Verification status when the digests differ.
pub const STATUS_MISMATCH: &str = "MISMATCH — Tampering Detected";

/// Result of re-hashing a file against an anchored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub verified: bool,
    pub original_hash: Digest,
    pub uploaded_hash: Digest,
    /// The record that was checked, with its anchor.
    pub entry: LedgerEntry,
}

impl Verification {
    /// Human-readable status. Depends only on `verified`.
    pub fn status(&self) -> &'static str {
        if self.verified {
            STATUS_MATCH
        } else {
            STATUS_MISMATCH
        }
    }

    pub fn submission_id(&self) -> &SubmissionId {
        &self.entry.record.id
    }

    /// Creation time of the original record, Unix milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.entry.record.created_at
    }
}

/// Service telemetry snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub total_hashes: u64,
    pub active_nodes: u32,
    pub system_health: &'static str,
    pub network_status: &'static str,
}

/// The main Vault struct.
///
/// Provides a unified API for:
/// - Submitting uploads for hashing and anchoring
/// - Verifying uploads against anchored records
/// - Listing records and auditing the hash chain
pub struct Vault<L: Ledger> {
    /// The ledger backend.
    ledger: Arc<L>,
    /// Source of fresh submission ids.
    issuer: Arc<dyn IdIssuer>,
    /// Configuration.
    config: VaultConfig,
}

impl<L: Ledger> Vault<L> {
    /// Create a vault drawing ids from the OS CSPRNG.
    pub fn new(ledger: Arc<L>, config: VaultConfig) -> Self {
        Self::with_issuer(ledger, Arc::new(RandomIdIssuer), config)
    }

    /// Create a vault with a specific id issuer.
    pub fn with_issuer(ledger: Arc<L>, issuer: Arc<dyn IdIssuer>, config: VaultConfig) -> Self {
        Self {
            ledger,
            issuer,
            config,
        }
    }

    /// Get the ledger reference.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submit
    // ─────────────────────────────────────────────────────────────────────────

    /// Hash an upload under the configured size ceiling.
    pub async fn hash<S>(&self, source: &mut S) -> Result<HashOutcome>
    where
        S: ChunkSource + ?Sized,
    {
        hash_source(source, Some(self.config.max_upload_bytes)).await
    }

    /// Hash `source` and commit a record for it.
    ///
    /// Metadata is validated before any byte is read. Nothing is written
    /// unless hashing completes.
    pub async fn submit<S>(&self, request: SubmitRequest, source: &mut S) -> Result<LedgerEntry>
    where
        S: ChunkSource + ?Sized,
    {
        request.check(&self.config)?;
        let outcome = self.hash(source).await?;
        self.submit_hashed(request, outcome).await
    }

    /// Commit a record for an upload that was already hashed.
    ///
    /// Draws a fresh id and retries on collision up to `id_retry_budget`
    /// times.
    pub async fn submit_hashed(
        &self,
        request: SubmitRequest,
        outcome: HashOutcome,
    ) -> Result<LedgerEntry> {
        let checked = request.check(&self.config)?;
        let created_at = now_millis();
        let budget = self.config.id_retry_budget.max(1);

        for attempt in 1..=budget {
            let record = SubmissionRecord {
                id: self.issuer.issue(),
                owner: checked.owner.clone(),
                filename: checked.filename.clone(),
                content_type: checked.content_type.clone(),
                size: outcome.size,
                digest: outcome.digest,
                created_at,
                submitted_by: checked.submitted_by.clone(),
            };

            match self.ledger.put(&record).await? {
                InsertResult::Inserted(anchor) => {
                    tracing::info!(
                        submission_id = %record.id,
                        owner = %record.owner,
                        size = record.size,
                        seq = anchor.seq,
                        "submission anchored"
                    );
                    return Ok(LedgerEntry { record, anchor });
                }
                InsertResult::Conflict => {
                    tracing::warn!(
                        submission_id = %record.id,
                        attempt,
                        budget,
                        "submission id collision, drawing a new id"
                    );
                }
            }
        }

        tracing::error!(attempts = budget, "submission id retry budget exhausted");
        Err(VaultError::ConflictExhausted { attempts: budget })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup & Verify
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch a record by a client-supplied id.
    ///
    /// The id is trimmed and uppercased first. Unknown or ill-formed ids
    /// yield `NotFound`.
    pub async fn lookup(&self, raw_id: &str) -> Result<LedgerEntry> {
        if raw_id.trim().is_empty() {
            return Err(VaultError::Validation("No submission_id provided".into()));
        }
        let id = SubmissionId::normalize(raw_id);
        tracing::debug!(submission_id = %id, "lookup");

        self.ledger
            .get(&id)
            .await?
            .ok_or_else(|| VaultError::NotFound(raw_id.trim().to_string()))
    }

    /// Re-hash `source` and compare against the record for `raw_id`.
    ///
    /// The record is fetched first. When it is absent, `source` is never
    /// read. Nothing is written.
    pub async fn verify<S>(&self, raw_id: &str, source: &mut S) -> Result<Verification>
    where
        S: ChunkSource + ?Sized,
    {
        let entry = self.lookup(raw_id).await?;
        let outcome = self.hash(source).await?;
        Ok(compare(entry, outcome.digest))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inspection
    // ─────────────────────────────────────────────────────────────────────────

    /// Most recent records first.
    pub async fn list(&self, limit: usize) -> Result<Vec<LedgerEntry>> {
        Ok(self.ledger.list_recent(limit).await?)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(self.ledger.count().await?)
    }

    pub async fn stats(&self) -> Result<Stats> {
        Ok(Stats {
            total_hashes: self.ledger.count().await?,
            active_nodes: 1,
            system_health: "100%",
            network_status: "Online",
        })
    }

    /// Recompute every anchor and check the chain links. Read-only.
    pub async fn audit_chain(&self) -> Result<ChainReport> {
        let entries = self.ledger.entries().await?;
        let report = audit_entries(&entries);
        if !report.valid {
            tracing::error!(
                first_broken_seq = ?report.first_broken_seq,
                length = report.length,
                "ledger chain audit failed"
            );
        }
        Ok(report)
    }
}

/// Compare a freshly computed digest against a stored record.
pub fn compare(entry: LedgerEntry, uploaded: Digest) -> Verification {
    let original = entry.record.digest;
    let verified = digests_match(&original.to_hex(), &uploaded.to_hex());
    Verification {
        verified,
        original_hash: original,
        uploaded_hash: uploaded,
        entry,
    }
}
