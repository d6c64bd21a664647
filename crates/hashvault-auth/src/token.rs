//! Signed session tokens.
//!
//! A token is `hex(claims) "." hex(signature)` where `claims` is the
//! canonical CBOR encoding of [`Claims`] and the Ed25519 signature covers
//! `SESSION_DOMAIN || claims`. Tokens are opaque to clients; the role and
//! capabilities inside are only trusted after the signature verifies.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use hashvault_core::{encode_canonical, Role};

use crate::capability::Capability;
use crate::error::{AuthError, Result};

/// Domain separator for session signatures.
pub const SESSION_DOMAIN: &[u8] = b"hashvault/session/v1";

/// What a session token asserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username.
    pub sub: String,
    pub role: Role,
    pub caps: Vec<Capability>,
    /// Issued at, Unix milliseconds.
    pub iat: i64,
    /// Expires at, Unix milliseconds.
    pub exp: i64,
}

impl Claims {
    /// Canonical CBOR bytes of these claims.
    pub fn to_canonical(&self) -> Result<Vec<u8>> {
        let value = ciborium::Value::serialized(self)
            .map_err(|e| AuthError::Crypto(format!("claims encoding failed: {e}")))?;
        encode_canonical(&value).map_err(|e| AuthError::Crypto(e.to_string()))
    }
}

/// Build the message that gets signed.
fn signed_message(claims_bytes: &[u8]) -> Vec<u8> {
    let mut msg = Vec::with_capacity(SESSION_DOMAIN.len() + claims_bytes.len());
    msg.extend_from_slice(SESSION_DOMAIN);
    msg.extend_from_slice(claims_bytes);
    msg
}

/// Issues and checks session tokens with one Ed25519 key.
///
/// This wraps ed25519-dalek's SigningKey.
#[derive(Clone)]
pub struct SessionSigner {
    signing_key: SigningKey,
}

impl SessionSigner {
    /// Generate a new random key. Tokens do not survive a restart.
    pub fn generate() -> Self {
        let mut rng = rand::rngs::OsRng;
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Parse a 64-char hex seed.
    pub fn from_hex_seed(hex_seed: &str) -> Result<Self> {
        let bytes = hex::decode(hex_seed.trim())
            .map_err(|e| AuthError::Crypto(format!("invalid signing seed: {e}")))?;
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AuthError::Crypto("signing seed must be 32 bytes".into()))?;
        Ok(Self::from_seed(&seed))
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Sign `claims` into a token string.
    pub fn issue(&self, claims: &Claims) -> Result<String> {
        let claims_bytes = claims.to_canonical()?;
        let signature = self.signing_key.sign(&signed_message(&claims_bytes));
        Ok(format!(
            "{}.{}",
            hex::encode(&claims_bytes),
            hex::encode(signature.to_bytes())
        ))
    }

    /// Verify a token's signature and expiry at `now_ms`.
    pub fn verify(&self, token: &str, now_ms: i64) -> Result<Claims> {
        let (claims_hex, sig_hex) = token.trim().split_once('.').ok_or(AuthError::InvalidToken)?;

        let claims_bytes = hex::decode(claims_hex).map_err(|_| AuthError::InvalidToken)?;
        let sig_bytes: [u8; 64] = hex::decode(sig_hex)
            .map_err(|_| AuthError::InvalidToken)?
            .try_into()
            .map_err(|_| AuthError::InvalidToken)?;

        let signature = Signature::from_bytes(&sig_bytes);
        self.verifying_key()
            .verify(&signed_message(&claims_bytes), &signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let claims: Claims =
            ciborium::from_reader(claims_bytes.as_slice()).map_err(|_| AuthError::InvalidToken)?;

        if claims.exp <= now_ms {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("verifying_key", &hex::encode(self.verifying_key().to_bytes()))
            .finish()
    }
}
