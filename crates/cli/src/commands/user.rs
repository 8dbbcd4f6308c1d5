//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! flatshop user create -u alice -p 'correct horse'
//!
//! # Or keep the password out of shell history
//! FLATSHOP_USER_PASSWORD='correct horse' flatshop user create -u alice
//! ```

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};

use flatshop_core::Username;
use flatshop_server::services::AuthError;
use flatshop_server::services::auth::CredentialStore;
use flatshop_server::store::Store;

/// Register a user directly in the `users` document.
///
/// Applies the same username and password rules as `POST /register`.
///
/// # Errors
///
/// Returns `AuthError::UserAlreadyExists` if the name is taken, or a
/// validation or store error.
pub async fn create(
    data_dir: &Path,
    username: &str,
    password: &SecretString,
) -> Result<Username, AuthError> {
    let store = Store::open(data_dir);
    store.init().await?;

    tracing::info!("Creating user: {}", username);
    let username = CredentialStore::new(store.users())
        .register(username, password.expose_secret())
        .await?;

    tracing::info!(location = %store.location(), "User created successfully! Username: {}", username);
    Ok(username)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_user_then_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let password = SecretString::from("hunter22");

        let username = create(dir.path(), "alice", &password).await.unwrap();
        assert_eq!(username.as_str(), "alice");

        let again = create(dir.path(), "alice", &password).await;
        assert!(matches!(again, Err(AuthError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn test_created_user_can_authenticate() {
        let dir = tempfile::tempdir().unwrap();
        create(dir.path(), "bob", &SecretString::from("pw"))
            .await
            .unwrap();

        let store = Store::open(dir.path());
        let user = CredentialStore::new(store.users())
            .authenticate("bob", "pw")
            .await
            .unwrap();
        assert_eq!(user.as_str(), "bob");
    }

    #[tokio::test]
    async fn test_empty_password_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = create(dir.path(), "carol", &SecretString::from("")).await;
        assert!(matches!(result, Err(AuthError::EmptyPassword)));
    }
}
