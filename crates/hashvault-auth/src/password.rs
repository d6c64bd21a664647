//! PBKDF2-HMAC-SHA256 password hashing.
//!
//! Encoded form: `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`. The
//! iteration count travels with the hash so it can be raised later without
//! invalidating existing accounts.

use std::num::NonZeroU32;

use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{AuthError, Result};

/// Scheme tag at the start of every encoded hash.
pub const SCHEME: &str = "pbkdf2-sha256";

/// Default iteration count.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

pub const SALT_LEN: usize = 16;
pub const HASH_LEN: usize = 32;

static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str, iterations: u32) -> Result<String> {
    let iterations = NonZeroU32::new(iterations)
        .ok_or_else(|| AuthError::Crypto("iteration count must be non-zero".into()))?;

    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|e| AuthError::Crypto(format!("salt generation failed: {e}")))?;

    let mut hash = [0u8; HASH_LEN];
    pbkdf2::derive(ALGORITHM, iterations, &salt, password.as_bytes(), &mut hash);

    Ok(format!(
        "{SCHEME}${}${}${}",
        iterations,
        hex::encode(salt),
        hex::encode(hash)
    ))
}

/// Check `password` against an encoded hash.
///
/// A malformed encoding never matches.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let Some((iterations, salt, expected)) = parse(encoded) else {
        return false;
    };
    pbkdf2::verify(ALGORITHM, iterations, &salt, password.as_bytes(), &expected).is_ok()
}

fn parse(encoded: &str) -> Option<(NonZeroU32, Vec<u8>, Vec<u8>)> {
    let mut parts = encoded.split('$');
    if parts.next()? != SCHEME {
        return None;
    }
    let iterations = parts.next()?.parse::<u32>().ok().and_then(NonZeroU32::new)?;
    let salt = hex::decode(parts.next()?).ok()?;
    let hash = hex::decode(parts.next()?).ok()?;
    if parts.next().is_some() || hash.is_empty() {
        return None;
    }
    Some((iterations, salt, hash))
}
