//! Async chunk sources for uploads.
//!
//! The vault never asks for a whole upload at once. It pulls chunks from a
//! [`ChunkSource`] and feeds them to a [`ContentHasher`].

use std::collections::VecDeque;
use std::io;

use async_trait::async_trait;
use bytes::Bytes;

use hashvault_core::{ContentHasher, HashOutcome};

use crate::error::Result;

/// A stream of upload bytes delivered in chunks.
#[async_trait]
pub trait ChunkSource: Send {
    /// Next chunk, or `None` once the stream is exhausted.
    async fn next_chunk(&mut self) -> io::Result<Option<Bytes>>;
}

/// Hash every chunk `source` yields.
///
/// With `limit` set, fails with `PayloadTooLarge` as soon as more than
/// `limit` bytes arrive. On any error no digest is returned.
pub async fn hash_source<S>(source: &mut S, limit: Option<u64>) -> Result<HashOutcome>
where
    S: ChunkSource + ?Sized,
{
    let mut hasher = match limit {
        Some(limit) => ContentHasher::with_limit(limit),
        None => ContentHasher::new(),
    };

    while let Some(chunk) = source.next_chunk().await? {
        hasher.update(&chunk)?;
    }

    Ok(hasher.finalize())
}

/// Chunks already held in memory.
///
/// Used when an upload has to be read before it can be hashed, and in
/// tests.
#[derive(Debug, Clone, Default)]
pub struct BufferedChunks {
    chunks: VecDeque<Bytes>,
    len: u64,
}

impl BufferedChunks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: Bytes) {
        self.len += chunk.len() as u64;
        self.chunks.push_back(chunk);
    }

    /// Total bytes still buffered.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl From<Vec<u8>> for BufferedChunks {
    fn from(data: Vec<u8>) -> Self {
        let mut buf = Self::new();
        buf.push(Bytes::from(data));
        buf
    }
}

impl From<&'static [u8]> for BufferedChunks {
    fn from(data: &'static [u8]) -> Self {
        let mut buf = Self::new();
        buf.push(Bytes::from_static(data));
        buf
    }
}

impl FromIterator<Bytes> for BufferedChunks {
    fn from_iter<I: IntoIterator<Item = Bytes>>(iter: I) -> Self {
        let mut buf = Self::new();
        for chunk in iter {
            buf.push(chunk);
        }
        buf
    }
}

#[async_trait]
impl ChunkSource for BufferedChunks {
    async fn next_chunk(&mut self) -> io::Result<Option<Bytes>> {
        let chunk = self.chunks.pop_front();
        if let Some(c) = &chunk {
            self.len -= c.len() as u64;
        }
        Ok(chunk)
    }
}
