//! Server configuration from flags and environment.

use std::collections::{BTreeSet, HashSet};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use hashvault::VaultConfig;
use hashvault_auth::{AuthConfig, AuthError, SessionSigner};
use hashvault_store::{SqliteStore, StoreError};

use crate::state::AppState;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid signing seed: {0}")]
    SigningSeed(#[source] AuthError),

    #[error("cannot open database: {0}")]
    Store(#[from] StoreError),
}

/// HashVault API server.
#[derive(Parser, Debug, Clone)]
#[command(name = "hashvault-server", version, about, long_about = None)]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "HASHVAULT_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// SQLite database file. Without it the ledger lives in memory.
    #[arg(long, env = "HASHVAULT_DB")]
    pub database: Option<PathBuf>,

    /// 64 hex chars seeding the session signing key. Random per process
    /// when absent, which invalidates sessions on restart.
    #[arg(long, env = "HASHVAULT_SIGNING_SEED", hide_env_values = true)]
    pub signing_seed: Option<String>,

    /// Usernames that receive the admin role at signup.
    #[arg(long = "admin", env = "HASHVAULT_ADMINS", value_delimiter = ',')]
    pub admins: Vec<String>,

    /// Session lifetime in hours.
    #[arg(long, env = "HASHVAULT_TOKEN_TTL_HOURS", default_value_t = 24)]
    pub token_ttl_hours: u64,

    /// Upload ceiling in MiB.
    #[arg(long, env = "HASHVAULT_MAX_UPLOAD_MB", default_value_t = 60)]
    pub max_upload_mb: u64,

    /// Serve submit, verify and ledger views without sessions.
    #[arg(long, env = "HASHVAULT_NO_AUTH")]
    pub no_auth: bool,

    /// Origins allowed by CORS.
    #[arg(
        long = "cors-origin",
        env = "HASHVAULT_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:5173,http://127.0.0.1:5173"
    )]
    pub cors_origins: Vec<String>,

    /// Emit logs as JSON lines.
    #[arg(long, env = "HASHVAULT_LOG_JSON")]
    pub log_json: bool,
}

impl ServerConfig {
    pub fn vault_config(&self) -> VaultConfig {
        VaultConfig {
            max_upload_bytes: self.max_upload_mb.saturating_mul(1024 * 1024),
            ..VaultConfig::default()
        }
    }

    pub fn auth_config(&self) -> AuthConfig {
        let admin_usernames: HashSet<String> = self
            .admins
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        AuthConfig {
            token_ttl: Duration::from_secs(self.token_ttl_hours.saturating_mul(3600)),
            admin_usernames,
            ..AuthConfig::default()
        }
    }

    pub fn signer(&self) -> Result<SessionSigner, ConfigError> {
        match self.signing_seed.as_deref() {
            Some(seed) => SessionSigner::from_hex_seed(seed.trim()).map_err(ConfigError::SigningSeed),
            None => {
                tracing::warn!("no signing seed configured, sessions will not survive a restart");
                Ok(SessionSigner::generate())
            }
        }
    }

    pub fn open_store(&self) -> Result<SqliteStore, ConfigError> {
        match &self.database {
            Some(path) => Ok(SqliteStore::open(path)?),
            None => {
                tracing::warn!("no database configured, the ledger is in memory only");
                Ok(SqliteStore::open_memory()?)
            }
        }
    }

    /// Open the store and assemble handler state.
    pub fn build_state(&self) -> Result<AppState, ConfigError> {
        let state = AppState::new(
            self.open_store()?,
            self.vault_config(),
            self.signer()?,
            self.auth_config(),
        );
        Ok(state
            .require_auth(!self.no_auth)
            .cors_origins(self.cors_origins.clone()))
    }

    /// Extensions accepted on submit, for the startup log.
    pub fn allowed_extensions(&self) -> BTreeSet<String> {
        self.vault_config().allowed_extensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerConfig {
        let mut argv = vec!["hashvault-server"];
        argv.extend_from_slice(args);
        ServerConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults() {
        let config = parse(&[]);
        assert_eq!(config.bind.port(), 5000);
        assert!(config.database.is_none());
        assert!(!config.no_auth);
        assert_eq!(config.vault_config().max_upload_bytes, 60 * 1024 * 1024);
        assert_eq!(config.auth_config().token_ttl, Duration::from_secs(86_400));
        assert_eq!(config.cors_origins.len(), 2);
    }

    #[test]
    fn admin_list_is_split() {
        let config = parse(&["--admin", "root, alice,,"]);
        let admins = config.auth_config().admin_usernames;
        assert!(admins.contains("root"));
        assert!(admins.contains("alice"));
        assert_eq!(admins.len(), 2);
    }

    #[test]
    fn bad_seed_is_rejected() {
        let config = parse(&["--signing-seed", "not-hex"]);
        assert!(matches!(config.signer(), Err(ConfigError::SigningSeed(_))));
    }

    #[test]
    fn build_in_memory_state() {
        let config = parse(&["--no-auth", "--max-upload-mb", "1"]);
        let state = config.build_state().unwrap();
        assert!(!state.require_auth);
        assert_eq!(state.vault.config().max_upload_bytes, 1024 * 1024);
    }
}
