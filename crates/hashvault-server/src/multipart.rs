//! Multipart fields as vault chunk sources.

use std::io;

use async_trait::async_trait;
use axum::extract::multipart::Field;
use axum::http::StatusCode;
use bytes::Bytes;

use hashvault::{BufferedChunks, ChunkSource, VaultError};

use crate::error::ApiError;

/// Streams one multipart field into the vault.
///
/// Remembers the status of a transport failure so a body-limit rejection
/// can still surface as 413 after passing through the vault.
pub struct FieldSource<'a> {
    field: Field<'a>,
    failure: Option<StatusCode>,
}

impl<'a> FieldSource<'a> {
    pub fn new(field: Field<'a>) -> Self {
        Self {
            field,
            failure: None,
        }
    }

    /// Convert a vault error raised while reading this field.
    pub fn into_api_error(self, err: VaultError) -> ApiError {
        match (err, self.failure) {
            (VaultError::Io(_), Some(StatusCode::PAYLOAD_TOO_LARGE)) => {
                ApiError::PayloadTooLarge { limit: None }
            }
            (err, _) => err.into(),
        }
    }
}

#[async_trait]
impl ChunkSource for FieldSource<'_> {
    async fn next_chunk(&mut self) -> io::Result<Option<Bytes>> {
        match self.field.chunk().await {
            Ok(chunk) => Ok(chunk),
            Err(err) => {
                self.failure = Some(err.status());
                Err(io::Error::new(io::ErrorKind::Other, err.body_text()))
            }
        }
    }
}

/// Read a whole field into memory, failing once it passes `limit` bytes.
pub async fn buffer_field(mut field: Field<'_>, limit: u64) -> Result<BufferedChunks, ApiError> {
    let mut buffered = BufferedChunks::new();
    while let Some(chunk) = field.chunk().await? {
        buffered.push(chunk);
        if buffered.len() > limit {
            return Err(ApiError::PayloadTooLarge { limit: Some(limit) });
        }
    }
    Ok(buffered)
}
