//! # HashVault Server
//!
//! Axum HTTP boundary over the [`hashvault`] vault and [`hashvault_auth`]
//! sessions.
//!
//! ## Middleware Stack
//!
//! ```text
//! TraceLayer → CorsLayer (when origins are configured) → DefaultBodyLimit → Handler
//! ```
//!
//! Capability checks happen inside handlers, before any upload byte is
//! read. See [`routes`] for the endpoint table.

pub mod auth;
pub mod config;
pub mod error;
pub mod multipart;
pub mod routes;
pub mod state;
pub mod views;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::AppState;

/// Assemble the application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let body_limit = state.body_limit();
    let cors = cors_layer(&state.cors_origins);

    let router = routes::router()
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE]),
    )
}
