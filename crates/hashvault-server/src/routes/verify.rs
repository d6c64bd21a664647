//! `POST /api/verify`: re-hash an upload against an anchored record.
//!
//! Multipart fields: `file` and `submission_id`. When the id arrives first
//! the record is looked up before the file is read and the file is hashed
//! straight off the wire. Browsers send `file` first, so in that order the
//! file is buffered (up to the upload ceiling) until the id is known, and
//! the lookup still happens before any hashing.

use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};

use hashvault::{BufferedChunks, Verification};
use hashvault_auth::Capability;

use crate::auth::BearerToken;
use crate::error::ApiError;
use crate::multipart::{buffer_field, FieldSource};
use crate::state::AppState;
use crate::views::VerificationView;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/verify", post(verify))
}

async fn verify(
    State(state): State<AppState>,
    token: BearerToken,
    mut multipart: Multipart,
) -> Result<Json<VerificationView>, ApiError> {
    token.authorize(&state, Capability::Verify)?;

    let mut submission_id: Option<String> = None;
    let mut pending: Option<BufferedChunks> = None;
    let mut verification: Option<Verification> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "submission_id" => submission_id = Some(field.text().await?),
            "file" => {
                if field.file_name().unwrap_or_default().trim().is_empty() {
                    return Err(ApiError::BadRequest("No file selected".to_string()));
                }
                match submission_id.as_deref() {
                    Some(id) => {
                        let mut source = FieldSource::new(field);
                        match state.vault.verify(id, &mut source).await {
                            Ok(v) => verification = Some(v),
                            Err(err) => return Err(source.into_api_error(err)),
                        }
                    }
                    None => {
                        // Held whole in memory, up to max_upload_bytes
                        // (60 MiB by default), until submission_id arrives.
                        // Sending submission_id first skips this buffer.
                        let limit = state.vault.config().max_upload_bytes;
                        pending = Some(buffer_field(field, limit).await?);
                    }
                }
            }
            _ => {}
        }
    }

    let verification = match (verification, pending) {
        (Some(v), _) => v,
        (None, Some(mut buffered)) => {
            let id = submission_id.unwrap_or_default();
            state.vault.verify(&id, &mut buffered).await?
        }
        (None, None) => return Err(ApiError::BadRequest("No file provided".to_string())),
    };

    tracing::info!(
        submission_id = %verification.submission_id(),
        verified = verification.verified,
        "verification complete"
    );
    Ok(Json(VerificationView::from(&verification)))
}
