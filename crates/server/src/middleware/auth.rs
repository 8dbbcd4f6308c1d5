//! Bearer token authentication.
//!
//! Provides an extractor for requiring a valid bearer token in route handlers.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use flatshop_core::Username;

use crate::error::{AppError, set_sentry_user};
use crate::services::AuthError;
use crate::state::AppState;

/// Extractor that requires a valid `Authorization: Bearer <token>` header.
///
/// Rejects with 401 and a JSON detail of `Not authenticated`,
/// `Invalid token` or `Token expired`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(username): RequireAuth) -> String {
///     format!("Hello, {username}!")
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Username);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let token = bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let username = state.tokens().verify(token)?;

        tracing::Span::current().record("username", username.as_str());
        set_sentry_user(&username);

        Ok(Self(username))
    }
}

/// The token from an `Authorization: Bearer` header, if present.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
