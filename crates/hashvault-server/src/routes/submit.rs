//! `POST /api/submit`: fingerprint an upload and anchor it.
//!
//! Multipart fields: `file` (with a filename) and `team`. Fields may arrive
//! in any order. The file is hashed as it streams; nothing is committed
//! until the whole form has been read and validated.
//!
//! A blank `team` sent ahead of `file` is rejected before any hashing. When
//! `team` is missing or follows `file`, that is only known once the form
//! ends, so the upload has already been hashed by then.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use hashvault::SubmitRequest;
use hashvault_auth::Capability;
use hashvault_core::HashOutcome;

use crate::auth::BearerToken;
use crate::error::ApiError;
use crate::multipart::FieldSource;
use crate::state::AppState;
use crate::views::SubmissionView;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/submit", post(submit))
}

struct HashedUpload {
    filename: String,
    content_type: Option<String>,
    outcome: HashOutcome,
}

async fn submit(
    State(state): State<AppState>,
    token: BearerToken,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SubmissionView>), ApiError> {
    let principal = token.authorize(&state, Capability::Submit)?;

    let mut team: Option<String> = None;
    let mut upload: Option<HashedUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "team" => {
                let text = field.text().await?;
                state.vault.config().check_team(&text)?;
                team = Some(text);
            }
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                state.vault.config().check_filename(&filename)?;
                let content_type = field.content_type().map(str::to_string);

                let mut source = FieldSource::new(field);
                let outcome = match state.vault.hash(&mut source).await {
                    Ok(outcome) => outcome,
                    Err(err) => return Err(source.into_api_error(err)),
                };
                upload = Some(HashedUpload {
                    filename,
                    content_type,
                    outcome,
                });
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;

    let mut request = SubmitRequest::new(team.unwrap_or_default(), upload.filename);
    if let Some(content_type) = upload.content_type {
        request = request.content_type(content_type);
    }
    if let Some(principal) = principal {
        request = request.submitted_by(principal.username);
    }

    let entry = state.vault.submit_hashed(request, upload.outcome).await?;
    Ok((StatusCode::CREATED, Json(SubmissionView::from(&entry))))
}
