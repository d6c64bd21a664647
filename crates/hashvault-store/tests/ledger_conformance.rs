//! Behavior every `Ledger` backend must share.
//!
//! Each check runs against both the in-memory and the SQLite store.

use std::collections::HashSet;
use std::sync::Arc;

use hashvault_core::{hash_bytes, SubmissionId, SubmissionRecord};
use hashvault_store::{InsertResult, Ledger, MemoryStore, SqliteStore};

fn record(n: u32) -> SubmissionRecord {
    let content = format!("submission body {n}");
    let outcome = hash_bytes(content.as_bytes());
    SubmissionRecord {
        id: SubmissionId::normalize(&format!("HV-{:016X}", n)),
        owner: format!("TEAM-{}", n % 7),
        filename: format!("file-{n}.txt"),
        content_type: "text/plain".into(),
        size: outcome.size,
        digest: outcome.digest,
        created_at: 1_700_000_000_000 + n as i64,
        submitted_by: None,
    }
}

async fn assert_chain_valid<L: Ledger>(ledger: &L, expected_len: u64) {
    let entries = ledger.entries().await.unwrap();
    assert_eq!(entries.len() as u64, expected_len);

    let mut prev = None;
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.anchor.seq, i as u64 + 1, "seq must be gap-free");
        assert_eq!(entry.anchor.prev_anchor_hash, prev, "chain broken at {}", i + 1);
        assert!(entry.anchor_is_intact(), "anchor mismatch at {}", i + 1);
        prev = Some(entry.anchor.anchor_hash);
    }
}

async fn concurrent_puts<L: Ledger + 'static>(ledger: Arc<L>, n: u32) {
    let mut handles = Vec::with_capacity(n as usize);
    for i in 0..n {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            let rec = record(i);
            match ledger.put(&rec).await.unwrap() {
                InsertResult::Inserted(anchor) => (rec.id, anchor.seq),
                InsertResult::Conflict => panic!("distinct ids must not conflict"),
            }
        }));
    }

    let mut ids = HashSet::new();
    let mut seqs = HashSet::new();
    for handle in handles {
        let (id, seq) = handle.await.unwrap();
        assert!(ids.insert(id));
        assert!(seqs.insert(seq));
    }

    assert_eq!(ledger.count().await.unwrap(), n as u64);
    assert_eq!(seqs, (1..=n as u64).collect::<HashSet<_>>());
    assert_chain_valid(ledger.as_ref(), n as u64).await;
}

async fn racing_same_id<L: Ledger + 'static>(ledger: Arc<L>) {
    let contenders = 16;
    let mut handles = Vec::new();
    for i in 0..contenders {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            let mut rec = record(i);
            rec.id = SubmissionId::normalize("HV-AAAAAAAAAAAAAAAA");
            ledger.put(&rec).await.unwrap()
        }));
    }

    let mut inserted = 0;
    for handle in handles {
        if let InsertResult::Inserted(_) = handle.await.unwrap() {
            inserted += 1;
        }
    }

    assert_eq!(inserted, 1, "exactly one put per id may win");
    assert_eq!(ledger.count().await.unwrap(), 1);
}

async fn unknown_id_is_absent<L: Ledger>(ledger: &L) {
    ledger.put(&record(1)).await.unwrap();
    let missing = SubmissionId::normalize("HV-0000000000000000");
    assert!(ledger.get(&missing).await.unwrap().is_none());
    let garbage = SubmissionId::normalize("not-an-id");
    assert!(ledger.get(&garbage).await.unwrap().is_none());
}

async fn empty_ledger<L: Ledger>(ledger: &L) {
    assert_eq!(ledger.count().await.unwrap(), 0);
    assert!(ledger.head().await.unwrap().is_none());
    assert!(ledger.list_recent(10).await.unwrap().is_empty());
    assert!(ledger.entries().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_concurrent_small() {
    concurrent_puts(Arc::new(MemoryStore::new()), 10).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_concurrent_large() {
    concurrent_puts(Arc::new(MemoryStore::new()), 1000).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_concurrent_small() {
    concurrent_puts(Arc::new(SqliteStore::open_memory().unwrap()), 10).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_concurrent_large() {
    concurrent_puts(Arc::new(SqliteStore::open_memory().unwrap()), 1000).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_racing_same_id() {
    racing_same_id(Arc::new(MemoryStore::new())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_racing_same_id() {
    racing_same_id(Arc::new(SqliteStore::open_memory().unwrap())).await;
}

#[tokio::test]
async fn unknown_ids() {
    unknown_id_is_absent(&MemoryStore::new()).await;
    unknown_id_is_absent(&SqliteStore::open_memory().unwrap()).await;
}

#[tokio::test]
async fn empty_ledgers() {
    empty_ledger(&MemoryStore::new()).await;
    empty_ledger(&SqliteStore::open_memory().unwrap()).await;
}

#[tokio::test]
async fn backends_agree_on_record_shape() {
    let memory = MemoryStore::new();
    let sqlite = SqliteStore::open_memory().unwrap();

    for i in 0..5 {
        memory.put(&record(i)).await.unwrap();
        sqlite.put(&record(i)).await.unwrap();
    }

    let from_memory = memory.entries().await.unwrap();
    let from_sqlite = sqlite.entries().await.unwrap();
    for (m, s) in from_memory.iter().zip(&from_sqlite) {
        assert_eq!(m.record, s.record);
        assert_eq!(m.anchor.seq, s.anchor.seq);
    }
}
