//! # HashVault
//!
//! Streaming file fingerprinting with an append-only, hash-chained
//! submission ledger.
//!
//! ## Overview
//!
//! - **Submit**: stream an upload through SHA-256, draw a random `HV-` id,
//!   and commit an immutable record. The ledger anchors every record to the
//!   one before it.
//! - **Verify**: look a record up by id, re-hash a fresh upload, and compare
//!   digests. Unknown ids fail before any byte is hashed.
//! - **Audit**: recompute every anchor and check the chain links.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hashvault::{BufferedChunks, SubmitRequest, Vault, VaultConfig};
//! use hashvault::store::SqliteStore;
//!
//! async fn example() {
//!     let ledger = Arc::new(SqliteStore::open("hashvault.db").unwrap());
//!     let vault = Vault::new(ledger, VaultConfig::default());
//!
//!     let entry = vault
//!         .submit(
//!             SubmitRequest::new("ALPHA", "report.pdf"),
//!             &mut BufferedChunks::from(b"file bytes".to_vec()),
//!         )
//!         .await
//!         .unwrap();
//!
//!     let check = vault
//!         .verify(entry.record.id.as_str(), &mut BufferedChunks::from(b"file bytes".to_vec()))
//!         .await
//!         .unwrap();
//!     assert!(check.verified);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `hashvault::core` - Core primitives (Digest, SubmissionId, records)
//! - `hashvault::store` - Ledger and account storage

pub mod audit;
pub mod error;
pub mod source;
pub mod upload;
pub mod vault;

pub use audit::{audit_entries, ChainReport};
pub use error::{Result, VaultError};
pub use source::{hash_source, BufferedChunks, ChunkSource};
pub use upload::{
    sanitize_filename, SubmitRequest, VaultConfig, DEFAULT_CONTENT_TYPE, DEFAULT_ID_RETRY_BUDGET,
    DEFAULT_MAX_UPLOAD_BYTES, FALLBACK_FILENAME,
};
pub use vault::{compare, Stats, Vault, Verification, STATUS_MATCH, STATUS_MISMATCH};

// Re-export component crates
pub use hashvault_core as core;
pub use hashvault_store as store;
