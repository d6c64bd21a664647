//! End-to-end behavior of the Vault over real ledgers.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use hashvault::core::{hash_bytes, Anchor, LedgerEntry, SubmissionId, SubmissionRecord};
use hashvault::store::{InsertResult, Ledger, MemoryStore, SqliteStore};
use hashvault::{
    BufferedChunks, SubmitRequest, Vault, VaultConfig, VaultError, STATUS_MATCH, STATUS_MISMATCH,
};
use hashvault_testkit::{
    million_a, ConstantIssuer, FailingSource, ScriptedIssuer, SequenceIssuer, TestFixture,
    WatchedSource, EMPTY_DIGEST,
};

#[tokio::test]
async fn roundtrip_confirms_integrity() {
    let fixture = TestFixture::new();
    let data = b"final report, version 3";

    let entry = fixture.submit_bytes("ALPHA_TEAM", "report.pdf", data).await.unwrap();
    let check = fixture
        .verify_bytes(entry.record.id.as_str(), data)
        .await
        .unwrap();

    assert!(check.verified);
    assert_eq!(check.status(), STATUS_MATCH);
    assert_eq!(check.uploaded_hash, check.original_hash);
    assert_eq!(check.uploaded_hash, hash_bytes(data).digest);
    assert_eq!(check.timestamp(), entry.record.created_at);
    assert_eq!(check.submission_id(), &entry.record.id);
    assert_eq!(check.entry.anchor, entry.anchor);
}

#[tokio::test]
async fn one_byte_difference_is_tampering() {
    let fixture = TestFixture::new();
    let original = b"quarterly numbers: 1200".to_vec();
    let mut altered = original.clone();
    altered[20] ^= 0x01;

    let entry = fixture.submit_bytes("BETA", "numbers.csv", &original).await.unwrap();
    let check = fixture
        .verify_bytes(entry.record.id.as_str(), &altered)
        .await
        .unwrap();

    assert!(!check.verified);
    assert_eq!(check.status(), STATUS_MISMATCH);
    assert_ne!(check.uploaded_hash, check.original_hash);
}

#[tokio::test]
async fn unknown_id_is_not_found_without_hashing() {
    let fixture = TestFixture::new();
    fixture.submit_bytes("ALPHA", "a.txt", b"x").await.unwrap();

    let mut source = WatchedSource::new(b"anything at all");
    let err = fixture
        .vault
        .verify("HV-DOESNOTEXIST", &mut source)
        .await
        .unwrap_err();

    assert!(matches!(err, VaultError::NotFound(ref id) if id == "HV-DOESNOTEXIST"));
    assert!(!source.was_read());
}

#[tokio::test]
async fn empty_file_has_known_digest() {
    let fixture = TestFixture::new();
    let entry = fixture.submit_bytes("ALPHA", "empty.txt", b"").await.unwrap();

    assert_eq!(entry.record.digest.to_hex(), EMPTY_DIGEST);
    assert_eq!(entry.record.size, 0);
}

#[tokio::test]
async fn large_upload_size_matches_bytes_read() {
    let fixture = TestFixture::new();
    let (data, expected) = million_a();

    let chunks: BufferedChunks = data
        .chunks(64 * 1024)
        .map(bytes::Bytes::copy_from_slice)
        .collect();
    let mut source = chunks;
    let entry = fixture
        .vault
        .submit(SubmitRequest::new("ALPHA", "big.txt"), &mut source)
        .await
        .unwrap();

    assert_eq!(entry.record.digest.to_hex(), expected);
    assert_eq!(entry.record.size, data.len() as u64);
}

#[tokio::test]
async fn validation_happens_before_reading() {
    let fixture = TestFixture::new();

    for request in [
        SubmitRequest::new("", "a.txt"),
        SubmitRequest::new("ALPHA", ""),
        SubmitRequest::new("ALPHA", "setup.exe"),
    ] {
        let mut source = WatchedSource::new(b"payload");
        let err = fixture.vault.submit(request, &mut source).await.unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
        assert!(!source.was_read());
    }

    assert_eq!(fixture.vault.count().await.unwrap(), 0);
}

#[tokio::test]
async fn failed_stream_commits_nothing() {
    let fixture = TestFixture::new();
    let mut source = FailingSource::new(b"half of the file");

    let err = fixture
        .vault
        .submit(SubmitRequest::new("ALPHA", "a.txt"), &mut source)
        .await
        .unwrap_err();

    assert!(matches!(err, VaultError::Io(_)));
    assert!(err.is_retryable());
    assert_eq!(fixture.vault.count().await.unwrap(), 0);
}

#[tokio::test]
async fn oversized_upload_commits_nothing() {
    let config = VaultConfig {
        max_upload_bytes: 16,
        ..VaultConfig::default()
    };
    let fixture = TestFixture::with_issuer(Arc::new(SequenceIssuer::new()), config);

    let err = fixture
        .submit_bytes("ALPHA", "a.txt", &[0u8; 17])
        .await
        .unwrap_err();

    assert!(matches!(err, VaultError::PayloadTooLarge { limit: 16 }));
    assert_eq!(fixture.vault.count().await.unwrap(), 0);
}

#[tokio::test]
async fn metadata_is_recorded() {
    let fixture = TestFixture::new();
    let mut source = BufferedChunks::from(b"{}".to_vec());
    let entry = fixture
        .vault
        .submit(
            SubmitRequest::new(" GAMMA ", "../secret/config file.json")
                .content_type("application/json")
                .submitted_by("alice"),
            &mut source,
        )
        .await
        .unwrap();

    assert_eq!(entry.record.owner, "GAMMA");
    assert_eq!(entry.record.filename, "secret_config_file.json");
    assert_eq!(entry.record.content_type, "application/json");
    assert_eq!(entry.record.submitted_by.as_deref(), Some("alice"));
}

#[tokio::test]
async fn collision_draws_a_new_id() {
    let taken = "HV-00000000000000AA";
    let issuer = Arc::new(ScriptedIssuer::new([taken, taken, "HV-00000000000000BB"]));
    let fixture = TestFixture::with_issuer(issuer.clone(), VaultConfig::default());

    let first = fixture.submit_bytes("ALPHA", "a.txt", b"one").await.unwrap();
    assert_eq!(first.record.id.as_str(), taken);

    let second = fixture.submit_bytes("BETA", "b.txt", b"two").await.unwrap();
    assert_eq!(second.record.id.as_str(), "HV-00000000000000BB");
    assert_eq!(issuer.issued(), 3);

    // The first record was not overwritten.
    let check = fixture.verify_bytes(taken, b"one").await.unwrap();
    assert!(check.verified);
    assert_eq!(fixture.vault.count().await.unwrap(), 2);
}

#[tokio::test]
async fn collision_budget_is_bounded() {
    let fixture = TestFixture::with_issuer(
        Arc::new(ConstantIssuer::new("HV-1111111111111111")),
        VaultConfig::default(),
    );
    fixture.submit_bytes("ALPHA", "a.txt", b"one").await.unwrap();

    let err = fixture
        .submit_bytes("ALPHA", "b.txt", b"two")
        .await
        .unwrap_err();

    assert!(matches!(err, VaultError::ConflictExhausted { attempts: 5 }));
    assert_eq!(fixture.vault.count().await.unwrap(), 1);
}

async fn concurrent_submits(n: usize) {
    let fixture = Arc::new(TestFixture::new());

    let mut handles = Vec::with_capacity(n);
    for i in 0..n {
        let fixture = fixture.clone();
        handles.push(tokio::spawn(async move {
            let body = format!("payload number {i}");
            fixture
                .submit_bytes("LOAD", "load.txt", body.as_bytes())
                .await
                .unwrap()
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let entry = handle.await.unwrap();
        assert!(ids.insert(entry.record.id), "duplicate id issued");
    }

    assert_eq!(ids.len(), n);
    assert_eq!(fixture.vault.count().await.unwrap(), n as u64);

    let report = fixture.vault.audit_chain().await.unwrap();
    assert!(report.valid);
    assert_eq!(report.length, n as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ten_concurrent_submits_get_distinct_ids() {
    concurrent_submits(10).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn thousand_concurrent_submits_get_distinct_ids() {
    concurrent_submits(1000).await;
}

#[tokio::test]
async fn sqlite_backed_vault_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vault.db");

    let id = {
        let vault = Vault::new(
            Arc::new(SqliteStore::open(&path).unwrap()),
            VaultConfig::default(),
        );
        let entry = vault
            .submit(
                SubmitRequest::new("ALPHA", "a.txt"),
                &mut BufferedChunks::from(b"persisted".to_vec()),
            )
            .await
            .unwrap();
        entry.record.id
    };

    let vault = Vault::new(
        Arc::new(SqliteStore::open(&path).unwrap()),
        VaultConfig::default(),
    );
    let check = vault
        .verify(id.as_str(), &mut BufferedChunks::from(b"persisted".to_vec()))
        .await
        .unwrap();
    assert!(check.verified);

    let report = vault.audit_chain().await.unwrap();
    assert!(report.valid);
    assert_eq!(report.length, 1);
}

#[tokio::test]
async fn list_returns_newest_first() {
    let fixture = TestFixture::with_issuer(Arc::new(SequenceIssuer::new()), VaultConfig::default());
    for i in 0..4u8 {
        fixture.submit_bytes("ALPHA", "a.txt", &[i]).await.unwrap();
    }

    let listed = fixture.vault.list(2).await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|e| e.record.id.as_str()).collect();
    assert_eq!(ids, vec!["HV-0000000000000004", "HV-0000000000000003"]);
}

/// A ledger whose stored rows were edited behind the vault's back.
struct EditedLedger {
    inner: MemoryStore,
    edit_seq: u64,
}

#[async_trait]
impl Ledger for EditedLedger {
    async fn put(&self, record: &SubmissionRecord) -> hashvault::store::Result<InsertResult> {
        self.inner.put(record).await
    }

    async fn get(&self, id: &SubmissionId) -> hashvault::store::Result<Option<LedgerEntry>> {
        self.inner.get(id).await
    }

    async fn count(&self) -> hashvault::store::Result<u64> {
        self.inner.count().await
    }

    async fn list_recent(&self, limit: usize) -> hashvault::store::Result<Vec<LedgerEntry>> {
        self.inner.list_recent(limit).await
    }

    async fn head(&self) -> hashvault::store::Result<Option<Anchor>> {
        self.inner.head().await
    }

    async fn entries(&self) -> hashvault::store::Result<Vec<LedgerEntry>> {
        let mut entries = self.inner.entries().await?;
        for entry in entries.iter_mut() {
            if entry.anchor.seq == self.edit_seq {
                entry.record.digest = hash_bytes(b"swapped file").digest;
            }
        }
        Ok(entries)
    }
}

#[tokio::test]
async fn audit_pinpoints_edited_row() {
    let ledger = Arc::new(EditedLedger {
        inner: MemoryStore::new(),
        edit_seq: 3,
    });
    let vault = Vault::new(ledger, VaultConfig::default());

    for i in 0..5u8 {
        vault
            .submit(
                SubmitRequest::new("ALPHA", "a.txt"),
                &mut BufferedChunks::from(vec![i]),
            )
            .await
            .unwrap();
    }

    let report = vault.audit_chain().await.unwrap();
    assert!(!report.valid);
    assert_eq!(report.first_broken_seq, Some(3));
    assert_eq!(report.length, 5);
}
