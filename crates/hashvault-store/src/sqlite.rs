//! SQLite implementation of the store traits.
//!
//! This is the primary storage backend for HashVault. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use hashvault_core::{
    now_millis, Account, Anchor, Digest, LedgerEntry, Role, SubmissionId, SubmissionRecord,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{AccountInsert, AccountStore, InsertResult, Ledger};

const ENTRY_COLUMNS: &str = "seq, submission_id, owner, filename, content_type, file_size, \
     file_hash, created_at, submitted_by, anchored_at, prev_anchor_hash, anchor_hash";

const ACCOUNT_COLUMNS: &str = "username, email, password_hash, role, created_at";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the locked connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn invalid_column(index: usize, name: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(index, name.into(), rusqlite::types::Type::Text)
}

fn parse_digest(index: usize, name: &str, hex: &str) -> rusqlite::Result<Digest> {
    Digest::from_hex(hex).map_err(|_| invalid_column(index, name))
}

// Columns in ENTRY_COLUMNS order.
fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<LedgerEntry> {
    let seq: i64 = row.get(0)?;
    let id: String = row.get(1)?;
    let size: i64 = row.get(5)?;
    let digest_hex: String = row.get(6)?;
    let prev_hex: Option<String> = row.get(10)?;
    let anchor_hex: String = row.get(11)?;

    let record = SubmissionRecord {
        id: SubmissionId::normalize(&id),
        owner: row.get(2)?,
        filename: row.get(3)?,
        content_type: row.get(4)?,
        size: size as u64,
        digest: parse_digest(6, "file_hash", &digest_hex)?,
        created_at: row.get(7)?,
        submitted_by: row.get(8)?,
    };

    let prev_anchor_hash = match prev_hex {
        Some(hex) => Some(parse_digest(10, "prev_anchor_hash", &hex)?),
        None => None,
    };

    let anchor = Anchor {
        seq: seq as u64,
        anchored_at: row.get(9)?,
        prev_anchor_hash,
        anchor_hash: parse_digest(11, "anchor_hash", &anchor_hex)?,
    };

    Ok(LedgerEntry { record, anchor })
}

fn row_to_account(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    let role: String = row.get(3)?;
    Ok(Account {
        username: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        role: role.parse::<Role>().map_err(|_| invalid_column(3, "role"))?,
        created_at: row.get(4)?,
    })
}

#[async_trait]
impl Ledger for SqliteStore {
    async fn put(&self, record: &SubmissionRecord) -> Result<InsertResult> {
        let record = record.clone();

        self.blocking(move |conn| {
            // IMMEDIATE takes the write lock up front so the head we read
            // is still the head when we insert.
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let head: Option<(i64, String)> = tx
                .query_row(
                    "SELECT seq, anchor_hash FROM submissions ORDER BY seq DESC LIMIT 1",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let (seq, prev) = match head {
                Some((seq, hex)) => {
                    let prev = Digest::from_hex(&hex)
                        .map_err(|e| StoreError::InvalidData(e.to_string()))?;
                    (seq as u64 + 1, Some(prev))
                }
                None => (1, None),
            };

            let anchor = Anchor::compute(&record, seq, now_millis(), prev);

            let changed = tx.execute(
                "INSERT INTO submissions (
                    seq, submission_id, owner, filename, content_type, file_size,
                    file_hash, created_at, submitted_by, anchored_at,
                    prev_anchor_hash, anchor_hash
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                ON CONFLICT(submission_id) DO NOTHING",
                params![
                    anchor.seq as i64,
                    record.id.as_str(),
                    record.owner,
                    record.filename,
                    record.content_type,
                    record.size as i64,
                    record.digest.to_hex(),
                    record.created_at,
                    record.submitted_by,
                    anchor.anchored_at,
                    anchor.prev_anchor_hash.map(|d| d.to_hex()),
                    anchor.anchor_hash.to_hex(),
                ],
            )?;

            if changed == 0 {
                tx.rollback()?;
                return Ok(InsertResult::Conflict);
            }

            tx.commit()?;
            Ok(InsertResult::Inserted(anchor))
        })
        .await
    }

    async fn get(&self, id: &SubmissionId) -> Result<Option<LedgerEntry>> {
        let id = id.clone();

        self.blocking(move |conn| {
            conn.query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM submissions WHERE submission_id = ?1"),
                params![id.as_str()],
                row_to_entry,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        self.blocking(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM submissions", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<LedgerEntry>> {
        self.blocking(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM submissions ORDER BY seq DESC LIMIT ?1"
            ))?;
            let entries = stmt
                .query_map(params![limit as i64], row_to_entry)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
        .await
    }

    async fn head(&self) -> Result<Option<Anchor>> {
        self.blocking(|conn| {
            conn.query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM submissions ORDER BY seq DESC LIMIT 1"),
                [],
                row_to_entry,
            )
            .optional()
            .map(|entry| entry.map(|e| e.anchor))
            .map_err(StoreError::from)
        })
        .await
    }

    async fn entries(&self) -> Result<Vec<LedgerEntry>> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM submissions ORDER BY seq ASC"
            ))?;
            let entries = stmt
                .query_map([], row_to_entry)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
        .await
    }
}

#[async_trait]
impl AccountStore for SqliteStore {
    async fn create_account(&self, account: &Account) -> Result<AccountInsert> {
        let account = account.clone();

        self.blocking(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let name_taken: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM accounts WHERE username = ?1",
                    params![account.username],
                    |row| row.get(0),
                )
                .optional()?;
            if name_taken.is_some() {
                return Ok(AccountInsert::UsernameTaken);
            }

            let email_taken: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM accounts WHERE email = ?1",
                    params![account.email],
                    |row| row.get(0),
                )
                .optional()?;
            if email_taken.is_some() {
                return Ok(AccountInsert::EmailTaken);
            }

            tx.execute(
                "INSERT INTO accounts (username, email, password_hash, role, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    account.username,
                    account.email,
                    account.password_hash,
                    account.role.as_str(),
                    account.created_at,
                ],
            )?;
            tx.commit()?;

            Ok(AccountInsert::Created)
        })
        .await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let username = username.to_owned();

        self.blocking(move |conn| {
            conn.query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = ?1"),
                params![username],
                row_to_account,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let email = email.to_owned();

        self.blocking(move |conn| {
            conn.query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?1"),
                params![email],
                row_to_account,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashvault_core::hash_bytes;
    use tempfile::TempDir;

    fn make_record(id: &str, content: &[u8]) -> SubmissionRecord {
        let outcome = hash_bytes(content);
        SubmissionRecord {
            id: SubmissionId::normalize(id),
            owner: "ALPHA".into(),
            filename: "report.pdf".into(),
            content_type: "application/pdf".into(),
            size: outcome.size,
            digest: outcome.digest,
            created_at: 1_700_000_000_000,
            submitted_by: Some("alice".into()),
        }
    }

    #[tokio::test]
    async fn test_sqlite_put_and_get() {
        let store = SqliteStore::open_memory().unwrap();
        let record = make_record("HV-0123456789ABCDEF", b"hello vault");

        let anchor = match store.put(&record).await.unwrap() {
            InsertResult::Inserted(anchor) => anchor,
            InsertResult::Conflict => panic!("unexpected conflict"),
        };
        assert_eq!(anchor.seq, 1);

        let entry = store.get(&record.id).await.unwrap().unwrap();
        assert_eq!(entry.record, record);
        assert_eq!(entry.anchor, anchor);
        assert!(entry.anchor_is_intact());
    }

    #[tokio::test]
    async fn test_sqlite_conflict_keeps_original() {
        let store = SqliteStore::open_memory().unwrap();
        let first = make_record("HV-0123456789ABCDEF", b"first");
        let second = make_record("HV-0123456789ABCDEF", b"second");

        store.put(&first).await.unwrap();
        assert_eq!(store.put(&second).await.unwrap(), InsertResult::Conflict);

        let entry = store.get(&first.id).await.unwrap().unwrap();
        assert_eq!(entry.record.digest, first.digest);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sqlite_chain_links() {
        let store = SqliteStore::open_memory().unwrap();
        for i in 0..3u8 {
            let id = format!("HV-00000000000000{:02X}", i);
            store.put(&make_record(&id, &[i])).await.unwrap();
        }

        let entries = store.entries().await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].anchor.prev_anchor_hash, None);
        for pair in entries.windows(2) {
            assert_eq!(pair[1].anchor.prev_anchor_hash, Some(pair[0].anchor.anchor_hash));
            assert_eq!(pair[1].anchor.seq, pair[0].anchor.seq + 1);
        }

        let head = store.head().await.unwrap().unwrap();
        assert_eq!(head, entries[2].anchor);
    }

    #[tokio::test]
    async fn test_sqlite_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.db");
        let record = make_record("HV-FEEDFACECAFEBEEF", b"durable");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.put(&record).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let entry = store.get(&record.id).await.unwrap().unwrap();
        assert_eq!(entry.record, record);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sqlite_account_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        let account = Account {
            username: "admin".into(),
            email: "admin@example.com".into(),
            password_hash: "pbkdf2-sha256$1$00$00".into(),
            role: Role::Admin,
            created_at: 42,
        };

        assert_eq!(
            store.create_account(&account).await.unwrap(),
            AccountInsert::Created
        );
        assert_eq!(
            store.create_account(&account).await.unwrap(),
            AccountInsert::UsernameTaken
        );

        let found = store.find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(found, account);
        assert!(store.find_by_email("nobody@example.com").await.unwrap().is_none());
    }
}
