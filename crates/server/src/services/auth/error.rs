//! Authentication error types.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username format is invalid.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] flatshop_core::UsernameError),

    /// Password is empty.
    #[error("password cannot be empty")]
    EmptyPassword,

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// No bearer token on the request.
    #[error("missing bearer token")]
    MissingToken,

    /// Token is past its expiry.
    #[error("token expired")]
    TokenExpired,

    /// Token is malformed or its signature does not match.
    #[error("invalid token")]
    InvalidToken,

    /// Token could not be signed.
    #[error("token signing error")]
    TokenSigning,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Document store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
