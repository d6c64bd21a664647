//! # HashVault Store
//!
//! Storage abstraction for HashVault. Provides trait-based interfaces for
//! the append-only submission ledger and for user accounts, with SQLite and
//! in-memory implementations.
//!
//! ## Key Types
//!
//! - [`Ledger`] - Async trait for the append-only submission ledger
//! - [`AccountStore`] - Async trait for user accounts
//! - [`SqliteStore`] - SQLite-based persistent storage (implements both)
//! - [`MemoryStore`] - In-memory storage for tests and ephemeral runs
//! - [`InsertResult`] - Outcome of a compare-and-insert
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hashvault_store::{Ledger, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("hashvault.db").unwrap();
//!     let total = store.count().await.unwrap();
//!     println!("{total} anchored submissions");
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Compare-and-insert**: `put` inserts only if the id is free; two
//!   concurrent puts for one id never both succeed.
//! - **Append-only**: there is no update or delete. The SQLite schema also
//!   rejects them with triggers.
//! - **Anchoring**: the store assigns `seq` and the hash-chain anchor inside
//!   the same critical section as the insert.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{AccountInsert, AccountStore, InsertResult, Ledger};
