//! # HashVault Testkit
//!
//! Testing utilities for HashVault.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Digest vectors**: Published SHA-256 inputs and outputs
//! - **Generators**: Proptest strategies for payloads, chunkings, ids and requests
//! - **Fixtures**: A vault over an in-memory ledger, scripted id issuers and
//!   chunk sources that fail or record whether they were read
//!
//! ## Digest Vectors
//!
//! ```rust
//! use hashvault_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, hex) in verify_all_vectors() {
//!     assert!(matches, "{name}: {hex}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use hashvault_testkit::generators::chunked_payload;
//!
//! proptest! {
//!     #[test]
//!     fn chunking_is_irrelevant((data, chunks) in chunked_payload(1024)) {
//!         // hash `chunks` and compare with hash_bytes(&data)
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use hashvault_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! // let entry = fixture.submit_bytes("ALPHA", "notes.txt", b"hello").await?;
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{
    auth_fixture, ConstantIssuer, FailingSource, ScriptedIssuer, SequenceIssuer, TestFixture,
    WatchedSource,
};
pub use generators::{chunked_payload, SubmitParams};
pub use vectors::{all_vectors, million_a, verify_all_vectors, DigestVector, EMPTY_DIGEST};
