//! # Application State
//!
//! Shared state handed to every route handler via the `State` extractor.
//! Both the vault and the auth service sit on the same SQLite store.

use std::sync::Arc;

use hashvault::{Vault, VaultConfig};
use hashvault_auth::{AuthConfig, AuthService, SessionSigner};
use hashvault_store::SqliteStore;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub vault: Arc<Vault<SqliteStore>>,
    pub auth: Arc<AuthService<SqliteStore>>,
    /// When false, submit, verify and the ledger views are open to anyone.
    pub require_auth: bool,
    /// Origins allowed by CORS. Empty disables the CORS layer.
    pub cors_origins: Vec<String>,
}

impl AppState {
    /// Build state over `store` with authentication required.
    pub fn new(
        store: SqliteStore,
        vault_config: VaultConfig,
        signer: SessionSigner,
        auth_config: AuthConfig,
    ) -> Self {
        let store = Arc::new(store);
        Self {
            vault: Arc::new(Vault::new(store.clone(), vault_config)),
            auth: Arc::new(AuthService::new(store, signer, auth_config)),
            require_auth: true,
            cors_origins: Vec::new(),
        }
    }

    pub fn require_auth(mut self, required: bool) -> Self {
        self.require_auth = required;
        self
    }

    pub fn cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Largest request body accepted: the upload ceiling plus room for
    /// multipart framing and the other form fields.
    pub fn body_limit(&self) -> usize {
        const FRAMING: u64 = 64 * 1024;
        let limit = self.vault.config().max_upload_bytes.saturating_add(FRAMING);
        usize::try_from(limit).unwrap_or(usize::MAX)
    }
}
