//! Username/password credentials backed by the `users` document.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::instrument;

use flatshop_core::Username;

use super::AuthError;
use crate::models::UserRecord;
use crate::store::Table;

/// Registration and password checks.
pub struct CredentialStore<'a> {
    users: &'a Table<UserRecord>,
}

impl<'a> CredentialStore<'a> {
    #[must_use]
    pub const fn new(users: &'a Table<UserRecord>) -> Self {
        Self { users }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` or `AuthError::EmptyPassword` for
    /// bad input, and `AuthError::UserAlreadyExists` if the name is taken.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<Username, AuthError> {
        let username = Username::parse(username)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let mut tx = self.users.begin().await?;
        if tx.contains_key(username.as_str()) {
            return Err(AuthError::UserAlreadyExists);
        }
        tx.insert(
            username.as_str().to_owned(),
            UserRecord {
                username: username.clone(),
                password_hash,
            },
        );
        tx.commit().await?;

        tracing::info!(username = %username, "User registered");
        Ok(username)
    }

    /// Check a username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the user does not exist or
    /// the password does not match.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Username, AuthError> {
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;

        let record = self
            .users
            .get(username.as_str())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &record.password_hash)?;

        Ok(record.username)
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::EmptyPassword);
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
