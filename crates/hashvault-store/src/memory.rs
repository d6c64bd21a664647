//! In-memory implementation of the store traits.
//!
//! Same semantics as SQLite but nothing survives a restart.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use hashvault_core::{now_millis, Account, Anchor, LedgerEntry, SubmissionId, SubmissionRecord};

use crate::error::{Result, StoreError};
use crate::traits::{AccountInsert, AccountStore, InsertResult, Ledger};

/// In-memory store implementation.
///
/// Thread-safe via RwLock. A single write lock covers the id check, the
/// anchor computation and the append, so `put` is compare-and-insert.
pub struct MemoryStore {
    ledger: RwLock<LedgerInner>,
    accounts: RwLock<AccountsInner>,
}

#[derive(Default)]
struct LedgerInner {
    /// Entries in ascending seq order; `entries[i].anchor.seq == i + 1`.
    entries: Vec<LedgerEntry>,

    /// Id index into `entries`.
    index: HashMap<SubmissionId, usize>,
}

#[derive(Default)]
struct AccountsInner {
    by_username: HashMap<String, Account>,

    /// email -> username
    emails: HashMap<String, String>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            ledger: RwLock::new(LedgerInner::default()),
            accounts: RwLock::new(AccountsInner::default()),
        }
    }

    fn ledger_read(&self) -> Result<RwLockReadGuard<'_, LedgerInner>> {
        self.ledger
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn ledger_write(&self) -> Result<RwLockWriteGuard<'_, LedgerInner>> {
        self.ledger
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn accounts_read(&self) -> Result<RwLockReadGuard<'_, AccountsInner>> {
        self.accounts
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn accounts_write(&self) -> Result<RwLockWriteGuard<'_, AccountsInner>> {
        self.accounts
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for MemoryStore {
    async fn put(&self, record: &SubmissionRecord) -> Result<InsertResult> {
        let mut inner = self.ledger_write()?;

        if inner.index.contains_key(&record.id) {
            return Ok(InsertResult::Conflict);
        }

        let prev = inner.entries.last().map(|e| e.anchor.anchor_hash);
        let seq = inner.entries.len() as u64 + 1;
        let anchor = Anchor::compute(record, seq, now_millis(), prev);

        let position = inner.entries.len();
        inner.entries.push(LedgerEntry {
            record: record.clone(),
            anchor,
        });
        inner.index.insert(record.id.clone(), position);

        Ok(InsertResult::Inserted(anchor))
    }

    async fn get(&self, id: &SubmissionId) -> Result<Option<LedgerEntry>> {
        let inner = self.ledger_read()?;
        Ok(inner.index.get(id).map(|&i| inner.entries[i].clone()))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.ledger_read()?.entries.len() as u64)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<LedgerEntry>> {
        let inner = self.ledger_read()?;
        Ok(inner.entries.iter().rev().take(limit).cloned().collect())
    }

    async fn head(&self) -> Result<Option<Anchor>> {
        Ok(self.ledger_read()?.entries.last().map(|e| e.anchor))
    }

    async fn entries(&self) -> Result<Vec<LedgerEntry>> {
        Ok(self.ledger_read()?.entries.clone())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, account: &Account) -> Result<AccountInsert> {
        let mut inner = self.accounts_write()?;

        if inner.by_username.contains_key(&account.username) {
            return Ok(AccountInsert::UsernameTaken);
        }
        if inner.emails.contains_key(&account.email) {
            return Ok(AccountInsert::EmailTaken);
        }

        inner
            .emails
            .insert(account.email.clone(), account.username.clone());
        inner
            .by_username
            .insert(account.username.clone(), account.clone());

        Ok(AccountInsert::Created)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        Ok(self.accounts_read()?.by_username.get(username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let inner = self.accounts_read()?;
        Ok(inner
            .emails
            .get(email)
            .and_then(|username| inner.by_username.get(username))
            .cloned())
    }
}
