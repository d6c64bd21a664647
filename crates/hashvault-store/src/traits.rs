//! Store traits: the abstract interfaces for ledger and account persistence.
//!
//! These traits keep the vault storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (tests, ephemeral servers).

use async_trait::async_trait;
use hashvault_core::{Account, Anchor, LedgerEntry, SubmissionId, SubmissionRecord};

use crate::error::Result;

/// Result of putting a record into the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// The record was committed with this anchor.
    Inserted(Anchor),
    /// A record with the same id already exists. Nothing was written.
    Conflict,
}

/// Result of creating an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountInsert {
    Created,
    UsernameTaken,
    EmailTaken,
}

/// The append-only submission ledger.
///
/// All methods are async so blocking backends can move work off the
/// runtime. No update or delete exists.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Insert `record` iff no record with its id exists.
    ///
    /// The store assigns the next `seq` and computes the anchor over the
    /// previous head in the same atomic step. On `Conflict` the ledger is
    /// unchanged.
    async fn put(&self, record: &SubmissionRecord) -> Result<InsertResult>;

    /// Look up a committed record by id.
    async fn get(&self, id: &SubmissionId) -> Result<Option<LedgerEntry>>;

    /// Number of committed records.
    async fn count(&self) -> Result<u64>;

    /// Most recent records first, at most `limit`.
    async fn list_recent(&self, limit: usize) -> Result<Vec<LedgerEntry>>;

    /// Anchor of the last committed record.
    async fn head(&self) -> Result<Option<Anchor>>;

    /// Every entry in ascending `seq` order.
    async fn entries(&self) -> Result<Vec<LedgerEntry>>;
}

/// User account persistence.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create an account if neither the username nor the email is taken.
    async fn create_account(&self, account: &Account) -> Result<AccountInsert>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// `email` must already be lowercased.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;
}
