//! # Bearer Sessions
//!
//! Handlers take a [`BearerToken`] and decide per route what it must grant.
//! The token is only parsed from the header here; signature and expiry are
//! checked by [`hashvault_auth::AuthService::resolve`].

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use hashvault_auth::{AuthError, Capability, Principal};

use crate::error::ApiError;
use crate::state::AppState;

/// The raw `Authorization: Bearer` token of a request, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    /// Parse an `Authorization` header value.
    pub fn parse(header: &str) -> Option<String> {
        let (scheme, token) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = token.trim();
        (!token.is_empty()).then(|| token.to_string())
    }

    /// Resolve the token into a principal. Fails when absent.
    pub fn principal(&self, state: &AppState) -> Result<Principal, ApiError> {
        let token = self.0.as_deref().ok_or(AuthError::MissingToken)?;
        state.auth.resolve(token).map_err(|err| {
            tracing::warn!(error = %err, "session rejected");
            ApiError::from(err)
        })
    }

    /// Gate an operation on `capability`.
    ///
    /// With auth disabled the operation is open and no principal is
    /// returned, even if a token was sent.
    pub fn authorize(
        &self,
        state: &AppState,
        capability: Capability,
    ) -> Result<Option<Principal>, ApiError> {
        if !state.require_auth {
            return Ok(None);
        }
        let principal = self.principal(state)?;
        if let Err(err) = principal.require(capability) {
            tracing::warn!(
                username = %principal.username,
                capability = %capability,
                "capability check failed"
            );
            return Err(err.into());
        }
        Ok(Some(principal))
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(BearerToken::parse);
        Ok(Self(token))
    }
}
