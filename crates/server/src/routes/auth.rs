//! Registration and login handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::routes::MessageResponse;
use crate::state::AppState;

/// Username and password, for both registration and login.
#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
}

/// Register a new user.
#[instrument(skip(state, credentials), fields(username = %credentials.username))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<MessageResponse>> {
    state
        .auth()
        .register(&credentials.username, &credentials.password)
        .await?;

    Ok(Json(MessageResponse::new("User created successfully")))
}

/// Exchange a username and password for a bearer token.
#[instrument(skip(state, credentials), fields(username = %credentials.username))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<TokenResponse>> {
    let token = state
        .auth()
        .login(&credentials.username, &credentials.password)
        .await?;

    Ok(Json(TokenResponse {
        token,
        token_type: "bearer",
    }))
}
