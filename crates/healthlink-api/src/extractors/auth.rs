//! `Caller` extractor: identifies the owner behind a management call.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use healthlink_auth::CallerCredentials;
use healthlink_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated owner context available in handlers.
#[derive(Debug, Clone)]
pub struct Caller(pub RequestContext);

impl std::ops::Deref for Caller {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Pull the bearer token and the trusted user header out of `parts`.
pub fn credentials(parts: &Parts, trusted_header: Option<&str>) -> CallerCredentials {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.strip_prefix("Bearer ")
                .or_else(|| v.strip_prefix("bearer "))
        })
        .map(|t| t.trim().to_string());

    let asserted_user = trusted_header
        .and_then(|name| parts.headers.get(name))
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    CallerCredentials {
        bearer,
        asserted_user,
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credentials = credentials(parts, state.caller.trusted_user_header());
        let user_id = state.caller.resolve(&credentials).await?;
        Ok(Caller(RequestContext::new(user_id)))
    }
}
