//! Stored user credentials.

use serde::{Deserialize, Serialize};

use flatshop_core::Username;

/// A registered user as stored in the `users` document.
///
/// Implements `Debug` manually to redact the password hash.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Unique username.
    pub username: Username,
    /// Argon2id PHC string.
    pub password_hash: String,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}
