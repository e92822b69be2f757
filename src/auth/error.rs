use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Which half of a login pair was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    Email,
    Password,
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialField::Email => f.write_str("email"),
            CredentialField::Password => f.write_str("password"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    #[error("Token is not valid")]
    InvalidToken,

    #[error("Token has expired")]
    Expired,

    #[error("Token subject {0} does not exist")]
    UnknownSubject(Uuid),

    // The field name in the message tells the caller which half was wrong.
    // Kept as-is for compatibility with existing clients.
    #[error("Credentials are not valid ({0})")]
    InvalidCredentials(CredentialField),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Unexpected error, check server logs")]
    Internal,
}

impl AuthError {
    /// True for failures of the bearer credential itself
    pub fn is_token_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken | AuthError::Expired | AuthError::UnknownSubject(_)
        )
    }
}
