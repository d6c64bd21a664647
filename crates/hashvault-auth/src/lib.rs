//! # HashVault Auth
//!
//! Accounts, roles and signed session tokens.
//!
//! ## Overview
//!
//! A client's role is never trusted from the client. At signup the server
//! assigns a [`Role`](hashvault_core::Role), maps it to a set of
//! [`Capability`] values, and signs them into an opaque session token. Each
//! request presents the token, and the HTTP boundary checks the capability
//! the operation needs.
//!
//! - **Passwords**: PBKDF2-HMAC-SHA256 via `ring`, encoded with their
//!   iteration count and salt.
//! - **Tokens**: canonical CBOR claims signed with Ed25519 under a domain
//!   separator. See [`token`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hashvault_auth::{AuthConfig, AuthService, Capability, SessionSigner};
//! use hashvault_store::MemoryStore;
//!
//! async fn example() {
//!     let auth = AuthService::new(
//!         Arc::new(MemoryStore::new()),
//!         SessionSigner::generate(),
//!         AuthConfig::default(),
//!     );
//!     let session = auth.signup("alice", "alice@example.com", "hunter22").await.unwrap();
//!     let principal = auth.resolve(&session.token).unwrap();
//!     assert!(principal.has(Capability::Submit));
//! }
//! ```

pub mod capability;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use capability::{capabilities_for, Capability};
pub use error::{AuthError, Result};
pub use password::{hash_password, verify_password};
pub use service::{AuthConfig, AuthService, Principal, Session};
pub use token::{Claims, SessionSigner, SESSION_DOMAIN};
