use thiserror::Error;

use crate::database::DatabaseError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Unexpected error, check server logs")]
    Internal,
}

/// Uniqueness violations surface with their detail; everything else is logged and hidden
pub(crate) fn handle_db_error(err: DatabaseError) -> CatalogError {
    match err {
        DatabaseError::UniqueViolation { detail } => CatalogError::Conflict(detail),
        DatabaseError::NotFound(message) => CatalogError::NotFound(message),
        other => {
            tracing::error!("Catalog store failure: {}", other);
            CatalogError::Internal
        }
    }
}
