//! Account routes: signup, login and the current session.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::auth::BearerToken;
use crate::error::ApiError;
use crate::state::AppState;
use crate::views::{MeView, SessionView, UserView};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}

#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `username` may also hold an email address.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let Json(req) = body?;
    let session = state
        .auth
        .signup(&req.username, &req.email, &req.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionView::new("Account created successfully", &session)),
    ))
}

async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<SessionView>, ApiError> {
    let Json(req) = body?;
    let session = state.auth.login(&req.username, &req.password).await?;
    Ok(Json(SessionView::new("Login successful", &session)))
}

async fn me(State(state): State<AppState>, token: BearerToken) -> Result<Json<MeView>, ApiError> {
    let principal = token.principal(&state)?;
    let account = state.auth.account(&principal).await?;
    Ok(Json(MeView {
        user: UserView::from(&account),
    }))
}
