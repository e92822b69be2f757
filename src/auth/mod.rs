use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SecurityConfig;

pub mod authorization;
pub mod error;
pub mod models;
pub mod password;
pub mod service;
pub mod verifier;

pub use authorization::{authorize, Decision, Denial};
pub use error::AuthError;
pub use models::{Role, User};
pub use service::{AuthService, AuthSession};
pub use verifier::{IdentityVerifier, Principal};

/// Token payload: the subject's user id plus issuance/expiry timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(id: Uuid, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            id,
            iat: now.timestamp(),
            exp,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// HS256 signing and verification keys with the configured validity window
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_hours: u64,
}

impl JwtKeys {
    pub fn from_config(security: &SecurityConfig) -> Result<Self, JwtError> {
        Self::new(&security.jwt_secret, security.jwt_expiry_hours)
    }

    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        })
    }

    /// Sign a fresh token for `user_id`
    pub fn issue(&self, user_id: Uuid) -> Result<String, JwtError> {
        self.encode(&Claims::new(user_id, self.expiry_hours))
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Signature and expiry check, no leeway
    pub fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(JwtKeys::new("", 1), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn issued_token_round_trips_subject() {
        let keys = JwtKeys::new("unit-test-secret", 1).unwrap();
        let id = Uuid::new_v4();
        let claims = keys.decode(&keys.issue(id).unwrap()).unwrap();
        assert_eq!(claims.id, id);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn expired_token_reports_expiry() {
        let keys = JwtKeys::new("unit-test-secret", 1).unwrap();
        let now = Utc::now().timestamp();
        let token = keys
            .encode(&Claims {
                id: Uuid::new_v4(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();
        let err = keys.decode(&token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let ours = JwtKeys::new("unit-test-secret", 1).unwrap();
        let theirs = JwtKeys::new("someone-else", 1).unwrap();
        let token = theirs.issue(Uuid::new_v4()).unwrap();
        let err = ours.decode(&token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidSignature));
    }
}
