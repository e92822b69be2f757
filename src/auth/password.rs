use super::error::AuthError;

/// bcrypt is CPU bound; both helpers run it on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| {
            tracing::error!("Password hashing task failed: {}", e);
            AuthError::Internal
        })?
        .map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            AuthError::Internal
        })
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| {
            tracing::error!("Password verification task failed: {}", e);
            AuthError::Internal
        })?
        .map_err(|e| {
            tracing::error!("Password verification failed: {}", e);
            AuthError::Internal
        })
}
