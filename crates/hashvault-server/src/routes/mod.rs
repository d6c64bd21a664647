//! # Route Modules
//!
//! | Path                  | Module        | Access                |
//! |-----------------------|---------------|-----------------------|
//! | `/api/submit`         | [`submit`]    | `submit` capability   |
//! | `/api/verify`         | [`verify`]    | `verify` capability   |
//! | `/api/auth/*`         | [`auth`]      | open, `me` needs token |
//! | `/api/submissions`    | [`ledger`]    | `audit` capability    |
//! | `/api/ledger/audit`   | [`ledger`]    | `audit` capability    |
//! | `/api/stats`          | [`status`]    | open                  |
//! | `/api/health`         | [`status`]    | open                  |

pub mod auth;
pub mod ledger;
pub mod status;
pub mod submit;
pub mod verify;

use axum::Router;

use crate::state::AppState;

/// All API routes, still waiting for state.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(submit::router())
        .merge(verify::router())
        .merge(auth::router())
        .merge(ledger::router())
        .merge(status::router())
}
