//! Signup, login and session resolution.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;

use hashvault_core::{now_millis, Account, Role};
use hashvault_store::{AccountInsert, AccountStore};

use crate::capability::{capabilities_for, Capability};
use crate::error::{AuthError, Result};
use crate::password::{self, DEFAULT_ITERATIONS};
use crate::token::{Claims, SessionSigner};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 64;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Lifetime of an issued session token.
    pub token_ttl: Duration,
    /// Usernames that get the `Admin` role at signup.
    pub admin_usernames: HashSet<String>,
    pub pbkdf2_iterations: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl: Duration::from_secs(24 * 60 * 60),
            admin_usernames: HashSet::new(),
            pbkdf2_iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// The authenticated caller of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub role: Role,
    pub capabilities: Vec<Capability>,
}

impl Principal {
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Err with `Forbidden` unless the session carries `capability`.
    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.has(capability) {
            Ok(())
        } else {
            Err(AuthError::Forbidden(capability))
        }
    }
}

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub account: Account,
    /// Unix milliseconds.
    pub expires_at: i64,
}

/// Account lifecycle and session tokens over an [`AccountStore`].
pub struct AuthService<A> {
    accounts: Arc<A>,
    signer: SessionSigner,
    config: AuthConfig,
    /// Stand-in hash checked when a login names no account, so both failure
    /// paths pay the same PBKDF2 cost.
    decoy_hash: OnceCell<String>,
    password_checks: AtomicU64,
}

impl<A: AccountStore + 'static> AuthService<A> {
    pub fn new(accounts: Arc<A>, signer: SessionSigner, config: AuthConfig) -> Self {
        Self {
            accounts,
            signer,
            config,
            decoy_hash: OnceCell::new(),
            password_checks: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Register a new account and open a session for it.
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Result<Session> {
        let username = username.trim();
        let email = email.trim().to_lowercase();

        let mut errors = Vec::new();
        if username.chars().count() < MIN_USERNAME_LEN {
            errors.push(format!(
                "Username must be at least {MIN_USERNAME_LEN} characters"
            ));
        } else if username.chars().count() > MAX_USERNAME_LEN {
            errors.push(format!(
                "Username must be at most {MAX_USERNAME_LEN} characters"
            ));
        }
        if !email.contains('@') {
            errors.push("A valid email is required".to_string());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let role = if self.config.admin_usernames.contains(username) {
            Role::Admin
        } else {
            Role::Operator
        };

        let password_hash = hash_off_runtime(password, self.config.pbkdf2_iterations).await?;
        let account = Account {
            username: username.to_string(),
            email,
            password_hash,
            role,
            created_at: now_millis(),
        };

        match self.accounts.create_account(&account).await? {
            AccountInsert::Created => {}
            AccountInsert::UsernameTaken => {
                tracing::warn!(username = %account.username, "signup rejected: username taken");
                return Err(AuthError::AccountExists);
            }
            AccountInsert::EmailTaken => {
                tracing::warn!(username = %account.username, "signup rejected: email taken");
                return Err(AuthError::AccountExists);
            }
        }

        tracing::info!(username = %account.username, role = %account.role, "account created");
        self.open_session(account)
    }

    /// Log in by username or email.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<Session> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let account = match self.accounts.find_by_username(identifier).await? {
            Some(account) => Some(account),
            None => {
                self.accounts
                    .find_by_email(&identifier.to_lowercase())
                    .await?
            }
        };

        let Some(account) = account else {
            let decoy = self.decoy_hash().await?;
            self.check_password(password, decoy).await?;
            tracing::warn!("login failed: unknown identifier");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.check_password(password, &account.password_hash).await? {
            tracing::warn!(username = %account.username, "login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::debug!(username = %account.username, "login succeeded");
        self.open_session(account)
    }

    /// Resolve a bearer token into a principal.
    pub fn resolve(&self, token: &str) -> Result<Principal> {
        self.resolve_at(token, now_millis())
    }

    /// Resolve as of `now_ms`.
    pub fn resolve_at(&self, token: &str, now_ms: i64) -> Result<Principal> {
        let claims = self.signer.verify(token, now_ms)?;
        Ok(Principal {
            username: claims.sub,
            role: claims.role,
            capabilities: claims.caps,
        })
    }

    /// Load the account behind a principal.
    pub async fn account(&self, principal: &Principal) -> Result<Account> {
        self.accounts
            .find_by_username(&principal.username)
            .await?
            .ok_or(AuthError::InvalidToken)
    }

    /// Number of PBKDF2 password checks run by `login`.
    pub fn password_checks(&self) -> u64 {
        self.password_checks.load(Ordering::Relaxed)
    }

    async fn check_password(&self, password: &str, encoded: &str) -> Result<bool> {
        self.password_checks.fetch_add(1, Ordering::Relaxed);
        verify_off_runtime(password, encoded).await
    }

    async fn decoy_hash(&self) -> Result<&str> {
        let iterations = self.config.pbkdf2_iterations;
        let hash = self
            .decoy_hash
            .get_or_try_init(|| hash_off_runtime("hashvault-decoy-password", iterations))
            .await?;
        Ok(hash.as_str())
    }

    fn open_session(&self, account: Account) -> Result<Session> {
        let iat = now_millis();
        let ttl_ms = i64::try_from(self.config.token_ttl.as_millis()).unwrap_or(i64::MAX);
        let exp = iat.saturating_add(ttl_ms);

        let claims = Claims {
            sub: account.username.clone(),
            role: account.role,
            caps: capabilities_for(account.role),
            iat,
            exp,
        };
        let token = self.signer.issue(&claims)?;

        Ok(Session {
            token,
            account,
            expires_at: exp,
        })
    }
}

// PBKDF2 blocks for tens of milliseconds; run it on the blocking pool.
async fn hash_off_runtime(password: &str, iterations: u32) -> Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || password::hash_password(&password, iterations))
        .await
        .map_err(|e| AuthError::Crypto(format!("hash task failed: {e}")))?
}

async fn verify_off_runtime(password: &str, encoded: &str) -> Result<bool> {
    let password = password.to_owned();
    let encoded = encoded.to_owned();
    tokio::task::spawn_blocking(move || password::verify_password(&password, &encoded))
        .await
        .map_err(|e| AuthError::Crypto(format!("verify task failed: {e}")))
}
