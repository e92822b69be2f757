use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{AuthError, CredentialField};
use super::models::{normalize_email, LoginUser, RegisterUser, Role, User};
use super::password::{hash_password, verify_password};
use super::verifier::Principal;
use super::JwtKeys;
use crate::database::{DatabaseError, UserRepository};

/// A user together with a freshly signed token for them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
}

/// Registration, login and token refresh over a user repository
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    keys: JwtKeys,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, keys: JwtKeys, bcrypt_cost: u32) -> Self {
        Self {
            users,
            keys,
            bcrypt_cost,
        }
    }

    pub async fn register(&self, input: RegisterUser) -> Result<AuthSession, AuthError> {
        let email = normalize_email(&input.email);
        let full_name = input.full_name.trim().to_string();

        if !email.contains('@') {
            return Err(AuthError::InvalidInput("email must be an email".to_string()));
        }
        if input.password.is_empty() {
            return Err(AuthError::InvalidInput("password should not be empty".to_string()));
        }
        if full_name.is_empty() {
            return Err(AuthError::InvalidInput("fullName should not be empty".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            email,
            password: hash_password(input.password, self.bcrypt_cost).await?,
            full_name,
            is_active: true,
            roles: vec![Role::User],
        };

        self.users.insert(&user).await.map_err(handle_db_error)?;
        tracing::info!("Registered user {} ({})", user.id, user.email);

        self.session_for(user)
    }

    pub async fn login(&self, input: LoginUser) -> Result<AuthSession, AuthError> {
        let email = normalize_email(&input.email);

        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(handle_db_error)?
            .ok_or(AuthError::InvalidCredentials(CredentialField::Email))?;

        if !verify_password(input.password, user.password.clone()).await? {
            return Err(AuthError::InvalidCredentials(CredentialField::Password));
        }

        tracing::debug!("User {} logged in", user.id);
        self.session_for(user)
    }

    /// Re-issue a token for an already verified caller
    pub fn check_status(&self, principal: Principal) -> Result<AuthSession, AuthError> {
        self.session_for(principal.into_user())
    }

    fn session_for(&self, user: User) -> Result<AuthSession, AuthError> {
        let token = self.keys.issue(user.id).map_err(|e| {
            tracing::error!("Failed to sign token for {}: {}", user.id, e);
            AuthError::Internal
        })?;

        Ok(AuthSession { user, token })
    }
}

fn handle_db_error(err: DatabaseError) -> AuthError {
    match err {
        DatabaseError::UniqueViolation { detail } => AuthError::Conflict(detail),
        other => {
            tracing::error!("User store failure: {}", other);
            AuthError::Internal
        }
    }
}
