use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use uuid::Uuid;

use super::error::AuthError;
use super::models::{Role, User};
use super::JwtKeys;
use crate::database::UserRepository;

/// An identity whose bearer token has been checked and whose user record was loaded.
///
/// Only [`IdentityVerifier::verify`] hands these out; the active flag is carried as loaded and
/// left for authorization to judge.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    user: User,
}

impl Principal {
    pub(crate) fn verified(user: User) -> Self {
        Self { user }
    }

    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn full_name(&self) -> &str {
        &self.user.full_name
    }

    pub fn roles(&self) -> &[Role] {
        &self.user.roles
    }

    pub fn is_active(&self) -> bool {
        self.user.is_active
    }

    pub fn into_user(self) -> User {
        self.user
    }
}

#[derive(Clone)]
pub struct IdentityVerifier {
    keys: JwtKeys,
    users: Arc<dyn UserRepository>,
}

impl IdentityVerifier {
    pub fn new(keys: JwtKeys, users: Arc<dyn UserRepository>) -> Self {
        Self { keys, users }
    }

    /// Resolve a bearer token to the user it names
    pub async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.keys.decode(token).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => {
                tracing::debug!("Rejected token: {}", e);
                AuthError::InvalidToken
            }
        })?;

        let user = self
            .users
            .find_by_id(claims.id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load token subject {}: {}", claims.id, e);
                AuthError::Internal
            })?
            .ok_or(AuthError::UnknownSubject(claims.id))?;

        Ok(Principal::verified(user))
    }
}
