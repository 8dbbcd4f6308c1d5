//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; every error body is JSON `{"detail": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use flatshop_core::Username;

use crate::services::{AuthError, CartError, CatalogError, CouponError};
use crate::store::StoreError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Document store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Coupon operation failed.
    #[error("Coupon error: {0}")]
    Coupon(#[from] CouponError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is the server's fault rather than the client's.
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Store(_)
                | Self::Internal(_)
                | Self::Auth(AuthError::Store(_) | AuthError::PasswordHash | AuthError::TokenSigning)
                | Self::Catalog(CatalogError::Store(_))
                | Self::Coupon(CouponError::Store(_))
                | Self::Cart(CartError::Store(_))
        )
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        if self.is_server_error() {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        match self {
            Self::Auth(err) => match err {
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidUsername(_) | AuthError::EmptyPassword => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::UNAUTHORIZED,
            },
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn detail(&self) -> String {
        // Don't expose internal error details to clients
        if self.is_server_error() {
            return "Internal server error".to_string();
        }
        match self {
            Self::Auth(err) => match err {
                AuthError::UserAlreadyExists => "Username already exists".to_string(),
                AuthError::InvalidCredentials => "Invalid username or password".to_string(),
                AuthError::MissingToken => "Not authenticated".to_string(),
                AuthError::TokenExpired => "Token expired".to_string(),
                AuthError::InvalidToken => "Invalid token".to_string(),
                AuthError::InvalidUsername(e) => format!("Invalid username: {e}"),
                AuthError::EmptyPassword => "Password cannot be empty".to_string(),
                _ => "Authentication error".to_string(),
            },
            Self::Catalog(err) => err.to_string(),
            Self::Coupon(err) => match err {
                CouponError::AlreadyExists(_) => "Coupon code already exists".to_string(),
                CouponError::InvalidDiscountType(_) => "Invalid discount type".to_string(),
                CouponError::InvalidDiscount(e) => capitalize(&e.to_string()),
                CouponError::EmptyCode => "Coupon code cannot be empty".to_string(),
                CouponError::Store(_) => "Internal server error".to_string(),
            },
            Self::Cart(err) => err.to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Store(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let status = self.status();
        let body = Json(json!({ "detail": self.detail() }));
        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Set the Sentry user context from an authenticated username.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(username: &Username) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
