//! # HashVault Core
//!
//! Pure primitives for the HashVault integrity ledger: content digests,
//! submission identifiers, submission records and their hash-chained anchors.
//!
//! This crate performs no storage and no networking. The only I/O it knows
//! about is pulling bytes out of a [`std::io::Read`] while hashing.
//!
//! ## Key Types
//!
//! - [`Digest`] - 32-byte SHA-256 content digest, rendered as lowercase hex
//! - [`SubmissionId`] - `HV-` prefixed, random, non-enumerable identifier
//! - [`SubmissionRecord`] - Immutable metadata committed for one upload
//! - [`Anchor`] - Hash-chain link assigned to a record at commit time
//! - [`ContentHasher`] - Streaming SHA-256 that also counts bytes
//!
//! ## Canonicalization
//!
//! Anchors are computed over deterministic CBOR. See [`canonical`].

pub mod account;
pub mod canonical;
pub mod error;
pub mod hasher;
pub mod issuer;
pub mod record;
pub mod time;
pub mod types;

pub use account::{Account, Role};
pub use canonical::{anchor_bytes, encode_canonical, ANCHOR_DOMAIN};
pub use error::{CoreError, Result};
pub use hasher::{digests_match, hash_bytes, hash_reader, ContentHasher, HashOutcome, CHUNK_SIZE};
pub use issuer::{IdIssuer, RandomIdIssuer};
pub use record::{Anchor, LedgerEntry, SubmissionRecord};
pub use time::{millis_to_rfc3339, now_millis};
pub use types::{Digest, SubmissionId, ID_ENTROPY_BYTES, ID_PREFIX};
