//! Streaming content hashing.
//!
//! Input is consumed chunk by chunk; nothing requires the whole payload to
//! be resident at once. The digest depends only on the bytes, never on how
//! they were split.

use std::io::{ErrorKind, Read};

use sha2::{Digest as _, Sha256};

use crate::error::{CoreError, Result};
use crate::types::Digest;

/// Read size used when pulling from a [`Read`].
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Output of a completed hash: the digest and the exact byte count consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashOutcome {
    pub digest: Digest,
    pub size: u64,
}

/// Incremental SHA-256 that also counts bytes and enforces an optional ceiling.
#[derive(Clone)]
pub struct ContentHasher {
    inner: Sha256,
    size: u64,
    limit: Option<u64>,
}

impl ContentHasher {
    /// Create a hasher with no size ceiling.
    pub fn new() -> Self {
        Self {
            inner: Sha256::new(),
            size: 0,
            limit: None,
        }
    }

    /// Create a hasher that rejects input longer than `limit` bytes.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    /// Feed one chunk.
    ///
    /// Fails with [`CoreError::PayloadTooLarge`] once the running total
    /// passes the ceiling. The hasher must not be finalized after that.
    pub fn update(&mut self, chunk: &[u8]) -> Result<()> {
        let size = self.size.saturating_add(chunk.len() as u64);
        if let Some(limit) = self.limit {
            if size > limit {
                return Err(CoreError::PayloadTooLarge { limit });
            }
        }
        self.inner.update(chunk);
        self.size = size;
        Ok(())
    }

    /// Bytes consumed so far.
    pub fn bytes_read(&self) -> u64 {
        self.size
    }

    pub fn finalize(self) -> HashOutcome {
        HashOutcome {
            digest: Digest(self.inner.finalize().into()),
            size: self.size,
        }
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash an in-memory buffer.
pub fn hash_bytes(data: &[u8]) -> HashOutcome {
    HashOutcome {
        digest: Digest(Sha256::digest(data).into()),
        size: data.len() as u64,
    }
}

/// Hash everything a reader yields, in [`CHUNK_SIZE`] reads.
///
/// A read error other than `Interrupted` aborts the hash and no digest is
/// returned.
pub fn hash_reader<R: Read>(mut reader: R, limit: Option<u64>) -> Result<HashOutcome> {
    let mut hasher = match limit {
        Some(limit) => ContentHasher::with_limit(limit),
        None => ContentHasher::new(),
    };
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n])?,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(CoreError::Io(e)),
        }
    }

    Ok(hasher.finalize())
}

/// Compare two hex digests after lowercasing both sides.
pub fn digests_match(a: &str, b: &str) -> bool {
    a.trim().to_ascii_lowercase() == b.trim().to_ascii_lowercase()
}
