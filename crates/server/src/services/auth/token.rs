//! HMAC-signed bearer tokens.
//!
//! Tokens are compact JWTs: `base64url(header).base64url(claims).base64url(mac)`
//! without padding. The claims carry the username (`sub`), the issue time
//! (`iat`) and the expiry (`exp`), both in Unix seconds.

use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha384, Sha512};

use flatshop_core::Username;

use super::AuthError;
use crate::config::TokenConfig;

/// HMAC algorithm used to sign tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenAlgorithm {
    #[default]
    Hs256,
    Hs384,
    Hs512,
}

/// Error returned when parsing an unsupported algorithm name.
#[derive(Debug, thiserror::Error)]
#[error("unsupported token algorithm: {0} (expected HS256, HS384 or HS512)")]
pub struct UnsupportedAlgorithm(String);

impl TokenAlgorithm {
    /// The JOSE `alg` name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
        }
    }
}

impl FromStr for TokenAlgorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HS256" => Ok(Self::Hs256),
            "HS384" => Ok(Self::Hs384),
            "HS512" => Ok(Self::Hs512),
            _ => Err(UnsupportedAlgorithm(s.to_owned())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies bearer tokens.
pub struct TokenSigner {
    secret: SecretString,
    algorithm: TokenAlgorithm,
    ttl: TimeDelta,
}

impl TokenSigner {
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            algorithm: config.algorithm,
            ttl: TimeDelta::minutes(i64::from(config.ttl_minutes)),
        }
    }

    /// How long issued tokens stay valid.
    #[must_use]
    pub const fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Issue a token for `username`, valid from now.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if the token cannot be encoded.
    pub fn issue(&self, username: &Username) -> Result<String, AuthError> {
        self.issue_at(username, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if the token cannot be encoded.
    pub fn issue_at(&self, username: &Username, now: DateTime<Utc>) -> Result<String, AuthError> {
        let header = Header {
            alg: self.algorithm.as_str().to_owned(),
            typ: "JWT".to_owned(),
        };
        let claims = Claims {
            sub: username.as_str().to_owned(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let header = serde_json::to_vec(&header).map_err(|_| AuthError::TokenSigning)?;
        let claims = serde_json::to_vec(&claims).map_err(|_| AuthError::TokenSigning)?;
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims)
        );
        let signature = self.sign(signing_input.as_bytes())?;

        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Verify a token and return its username.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is malformed or the
    /// signature does not match, and `AuthError::TokenExpired` if it has
    /// expired.
    pub fn verify(&self, token: &str) -> Result<Username, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// See [`TokenSigner::verify`].
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Username, AuthError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::InvalidToken);
        };

        let header: Header = decode_json(header_b64)?;
        if header.alg != self.algorithm.as_str() {
            return Err(AuthError::InvalidToken);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AuthError::InvalidToken)?;
        let signing_input = format!("{header_b64}.{claims_b64}");
        if !self.signature_matches(signing_input.as_bytes(), &signature)? {
            return Err(AuthError::InvalidToken);
        }

        let claims: Claims = decode_json(claims_b64)?;
        if claims.exp <= now.timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Username::parse(&claims.sub).map_err(|_| AuthError::InvalidToken)
    }

    fn sign(&self, input: &[u8]) -> Result<Vec<u8>, AuthError> {
        let key = self.secret.expose_secret().as_bytes();
        match self.algorithm {
            TokenAlgorithm::Hs256 => mac::<Hmac<Sha256>>(key, input),
            TokenAlgorithm::Hs384 => mac::<Hmac<Sha384>>(key, input),
            TokenAlgorithm::Hs512 => mac::<Hmac<Sha512>>(key, input),
        }
    }

    fn signature_matches(&self, input: &[u8], signature: &[u8]) -> Result<bool, AuthError> {
        let key = self.secret.expose_secret().as_bytes();
        match self.algorithm {
            TokenAlgorithm::Hs256 => mac_matches::<Hmac<Sha256>>(key, input, signature),
            TokenAlgorithm::Hs384 => mac_matches::<Hmac<Sha384>>(key, input, signature),
            TokenAlgorithm::Hs512 => mac_matches::<Hmac<Sha512>>(key, input, signature),
        }
    }
}

fn keyed<M: Mac + KeyInit>(key: &[u8], input: &[u8]) -> Result<M, AuthError> {
    let mut mac = <M as KeyInit>::new_from_slice(key).map_err(|_| AuthError::TokenSigning)?;
    Mac::update(&mut mac, input);
    Ok(mac)
}

fn mac<M: Mac + KeyInit>(key: &[u8], input: &[u8]) -> Result<Vec<u8>, AuthError> {
    Ok(keyed::<M>(key, input)?.finalize().into_bytes().to_vec())
}

/// Constant-time check of `signature` against the MAC of `input`.
fn mac_matches<M: Mac + KeyInit>(
    key: &[u8],
    input: &[u8],
    signature: &[u8],
) -> Result<bool, AuthError> {
    Ok(keyed::<M>(key, input)?.verify_slice(signature).is_ok())
}

fn decode_json<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::InvalidToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::InvalidToken)
}
