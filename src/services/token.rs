//! HS256 session tokens and password hashing.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    Expired,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub user_id: String,
    pub username: String,
    pub email: String,
    /// Seconds since the epoch.
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    expiry: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, expiry_days: i64) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            expiry: Duration::days(expiry_days),
        }
    }

    pub fn issue(&self, user_id: &str, username: &str, email: &str) -> String {
        let claims = Claims {
            user_id: user_id.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            exp: (Utc::now() + self.expiry).timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> String {
        // Claims is plain strings and an integer; serialising cannot fail.
        let payload = serde_json::to_vec(claims).unwrap_or_default();
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = URL_SAFE_NO_PAD.encode(self.mac(signing_input.as_bytes()));
        format!("{signing_input}.{signature}")
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::InvalidToken);
        };

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::InvalidToken)?;
        let mut mac = HmacSha256::new_from_slice(&self.secret).map_err(|_| AuthError::InvalidToken)?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let header_json = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| AuthError::InvalidToken)?;
        let header: serde_json::Value =
            serde_json::from_slice(&header_json).map_err(|_| AuthError::InvalidToken)?;
        if header.get("alg").and_then(|a| a.as_str()) != Some("HS256") {
            return Err(AuthError::InvalidToken);
        }

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::InvalidToken)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| AuthError::InvalidToken)?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }

    fn mac(&self, input: &[u8]) -> Vec<u8> {
        // HMAC accepts keys of any length.
        let mut mac = match HmacSha256::new_from_slice(&self.secret) {
            Ok(mac) => mac,
            Err(_) => return Vec::new(),
        };
        mac.update(input);
        mac.finalize().into_bytes().to_vec()
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
