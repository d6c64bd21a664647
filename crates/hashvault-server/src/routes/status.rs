//! Open status endpoints.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::ApiError;
use crate::state::AppState;
use crate::views::{HealthView, StatsView};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stats", get(stats))
        .route("/api/health", get(health))
}

async fn stats(State(state): State<AppState>) -> Result<Json<StatsView>, ApiError> {
    Ok(Json(StatsView::from(state.vault.stats().await?)))
}

async fn health() -> Json<HealthView> {
    Json(HealthView {
        status: "ok".to_string(),
        message: "HashVault API is running".to_string(),
    })
}
