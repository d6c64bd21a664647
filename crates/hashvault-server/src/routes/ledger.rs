//! Ledger inspection: recent submissions and a full chain audit.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use hashvault_auth::Capability;

use crate::auth::BearerToken;
use crate::error::ApiError;
use crate::state::AppState;
use crate::views::{AuditView, SubmissionListView, SubmissionView};

/// Rows returned when the client names no limit.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Hard cap on rows per listing.
pub const MAX_LIST_LIMIT: usize = 1_000;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/submissions", get(list_submissions))
        .route("/api/ledger/audit", get(audit))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

async fn list_submissions(
    State(state): State<AppState>,
    token: BearerToken,
    Query(params): Query<ListParams>,
) -> Result<Json<SubmissionListView>, ApiError> {
    token.authorize(&state, Capability::Audit)?;

    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    let entries = state.vault.list(limit).await?;
    let total = state.vault.count().await?;

    let submissions: Vec<SubmissionView> = entries.iter().map(SubmissionView::from).collect();
    Ok(Json(SubmissionListView {
        count: submissions.len(),
        total,
        submissions,
    }))
}

async fn audit(
    State(state): State<AppState>,
    token: BearerToken,
) -> Result<Json<AuditView>, ApiError> {
    token.authorize(&state, Capability::Audit)?;
    let report = state.vault.audit_chain().await?;
    Ok(Json(AuditView::from(&report)))
}
