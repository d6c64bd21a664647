//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use hashvault::{BufferedChunks, ChunkSource, SubmitRequest, Vault, VaultConfig, Verification};
use hashvault_auth::{AuthConfig, AuthService, SessionSigner};
use hashvault_core::{IdIssuer, LedgerEntry, RandomIdIssuer, SubmissionId};
use hashvault_store::MemoryStore;

/// Seed for the fixture session signer.
pub const TEST_SIGNING_SEED: [u8; 32] = [0x5a; 32];

/// PBKDF2 iterations for fixtures. Far below production, same format.
pub const TEST_PBKDF2_ITERATIONS: u32 = 1_000;

/// A vault over a fresh in-memory ledger.
pub struct TestFixture {
    pub ledger: Arc<MemoryStore>,
    pub vault: Vault<MemoryStore>,
}

impl TestFixture {
    /// Create a fixture with random ids and default config.
    pub fn new() -> Self {
        Self::with_issuer(Arc::new(RandomIdIssuer), VaultConfig::default())
    }

    /// Create a fixture with a specific id issuer and config.
    pub fn with_issuer(issuer: Arc<dyn IdIssuer>, config: VaultConfig) -> Self {
        let ledger = Arc::new(MemoryStore::new());
        let vault = Vault::with_issuer(ledger.clone(), issuer, config);
        Self { ledger, vault }
    }

    /// Submit in-memory bytes.
    pub async fn submit_bytes(
        &self,
        team: &str,
        filename: &str,
        data: &[u8],
    ) -> hashvault::Result<LedgerEntry> {
        let mut source = BufferedChunks::from(data.to_vec());
        self.vault
            .submit(SubmitRequest::new(team, filename), &mut source)
            .await
    }

    /// Verify in-memory bytes against `id`.
    pub async fn verify_bytes(&self, id: &str, data: &[u8]) -> hashvault::Result<Verification> {
        let mut source = BufferedChunks::from(data.to_vec());
        self.vault.verify(id, &mut source).await
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// An auth service over a fresh in-memory account store.
pub fn auth_fixture(admins: &[&str]) -> AuthService<MemoryStore> {
    let config = AuthConfig {
        admin_usernames: admins.iter().map(|s| s.to_string()).collect(),
        pbkdf2_iterations: TEST_PBKDF2_ITERATIONS,
        ..AuthConfig::default()
    };
    AuthService::new(
        Arc::new(MemoryStore::new()),
        SessionSigner::from_seed(&TEST_SIGNING_SEED),
        config,
    )
}

/// Issues `HV-0000000000000001`, `HV-0000000000000002`, ...
#[derive(Debug, Default)]
pub struct SequenceIssuer {
    next: AtomicU64,
}

impl SequenceIssuer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdIssuer for SequenceIssuer {
    fn issue(&self) -> SubmissionId {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        SubmissionId::from_entropy(&n.to_be_bytes())
    }
}

/// Issues the scripted ids in order, then falls back to random ids.
///
/// Counts every call so tests can assert how many ids were drawn.
#[derive(Debug, Default)]
pub struct ScriptedIssuer {
    script: Mutex<VecDeque<SubmissionId>>,
    issued: AtomicU64,
}

impl ScriptedIssuer {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            script: Mutex::new(
                ids.into_iter()
                    .map(|s| SubmissionId::normalize(s.as_ref()))
                    .collect(),
            ),
            issued: AtomicU64::new(0),
        }
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

impl IdIssuer for ScriptedIssuer {
    fn issue(&self) -> SubmissionId {
        self.issued.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front());
        scripted.unwrap_or_else(|| RandomIdIssuer.issue())
    }
}

/// Always issues the same id.
#[derive(Debug, Clone)]
pub struct ConstantIssuer(pub SubmissionId);

impl ConstantIssuer {
    pub fn new(id: &str) -> Self {
        Self(SubmissionId::normalize(id))
    }
}

impl IdIssuer for ConstantIssuer {
    fn issue(&self) -> SubmissionId {
        self.0.clone()
    }
}

/// A source that records whether anyone pulled from it.
#[derive(Debug, Clone, Default)]
pub struct WatchedSource {
    inner: BufferedChunks,
    touched: Arc<AtomicBool>,
}

impl WatchedSource {
    pub fn new(data: &[u8]) -> Self {
        Self {
            inner: BufferedChunks::from(data.to_vec()),
            touched: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether `next_chunk` was ever called.
    pub fn was_read(&self) -> bool {
        self.touched.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChunkSource for WatchedSource {
    async fn next_chunk(&mut self) -> io::Result<Option<Bytes>> {
        self.touched.store(true, Ordering::SeqCst);
        self.inner.next_chunk().await
    }
}

/// Yields `prefix`, then fails as a dropped connection would.
#[derive(Debug, Clone)]
pub struct FailingSource {
    prefix: Option<Bytes>,
}

impl FailingSource {
    pub fn new(prefix: &[u8]) -> Self {
        Self {
            prefix: Some(Bytes::copy_from_slice(prefix)),
        }
    }
}

#[async_trait]
impl ChunkSource for FailingSource {
    async fn next_chunk(&mut self) -> io::Result<Option<Bytes>> {
        match self.prefix.take() {
            Some(chunk) => Ok(Some(chunk)),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "upload aborted mid-stream",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_issuer() {
        let issuer = SequenceIssuer::new();
        assert_eq!(issuer.issue().as_str(), "HV-0000000000000001");
        assert_eq!(issuer.issue().as_str(), "HV-0000000000000002");
    }

    #[test]
    fn test_scripted_issuer_falls_back() {
        let issuer = ScriptedIssuer::new(["HV-00000000000000AA"]);
        assert_eq!(issuer.issue().as_str(), "HV-00000000000000AA");
        assert!(issuer.issue().is_well_formed());
        assert_eq!(issuer.issued(), 2);
    }

    #[tokio::test]
    async fn test_fixture_roundtrip() {
        let fixture = TestFixture::new();
        let entry = fixture.submit_bytes("ALPHA", "a.txt", b"data").await.unwrap();
        let check = fixture
            .verify_bytes(entry.record.id.as_str(), b"data")
            .await
            .unwrap();
        assert!(check.verified);
    }
}
