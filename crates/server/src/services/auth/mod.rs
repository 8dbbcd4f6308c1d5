//! Authentication service.
//!
//! Password registration and login backed by the `users` document, and
//! bearer tokens signed with the configured HMAC secret.

mod credentials;
mod error;
mod token;

pub use credentials::CredentialStore;
pub use error::AuthError;
pub use token::{TokenAlgorithm, TokenSigner, UnsupportedAlgorithm};

use tracing::instrument;

use flatshop_core::Username;

use crate::models::UserRecord;
use crate::store::Table;

/// Authentication service.
///
/// Composes the credential store with the token signer.
pub struct AuthService<'a> {
    credentials: CredentialStore<'a>,
    tokens: &'a TokenSigner,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a Table<UserRecord>, tokens: &'a TokenSigner) -> Self {
        Self {
            credentials: CredentialStore::new(users),
            tokens,
        }
    }

    /// Register a new user with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` or `AuthError::EmptyPassword` for
    /// bad input, and `AuthError::UserAlreadyExists` if the name is taken.
    pub async fn register(&self, username: &str, password: &str) -> Result<Username, AuthError> {
        self.credentials.register(username, password).await
    }

    /// Login with username and password, returning a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let username = self.credentials.authenticate(username, password).await?;
        let token = self.tokens.issue(&username)?;
        tracing::info!(username = %username, "User logged in");
        Ok(token)
    }

    /// Resolve a bearer token to its username.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` or `AuthError::TokenExpired`.
    pub fn verify(&self, token: &str) -> Result<Username, AuthError> {
        self.tokens.verify(token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::TokenConfig;
    use crate::store::Store;

    fn signer() -> TokenSigner {
        TokenSigner::new(&TokenConfig {
            secret: SecretString::from("k7Qz!p2Lx9#Vw4Rt8@Yb1Nc6$Hf3Jd0Ms"),
            algorithm: TokenAlgorithm::Hs256,
            ttl_minutes: 30,
        })
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let store = Store::in_memory();
        let tokens = signer();
        let auth = AuthService::new(store.users(), &tokens);

        auth.register("alice", "pw").await.unwrap();
        let token = auth.login("alice", "pw").await.unwrap();
        assert_eq!(auth.verify(&token).unwrap().as_str(), "alice");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let store = Store::in_memory();
        let tokens = signer();
        let auth = AuthService::new(store.users(), &tokens);

        auth.register("alice", "pw").await.unwrap();
        assert!(matches!(
            auth.login("alice", "nope").await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
