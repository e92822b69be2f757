use axum::{extract::State, Extension};
use serde::Serialize;

use crate::app::AppState;
use crate::auth::{AuthSession, Principal};
use crate::auth::models::User;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/auth/status - Current user plus a freshly signed token
///
/// Any authenticated caller may use this, active or not.
pub async fn status_get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<AuthSession> {
    let session = state.auth.check_status(principal)?;
    Ok(ApiResponse::success(session))
}

#[derive(Debug, Serialize)]
pub struct ElevatedAccess {
    pub ok: bool,
    pub user: User,
}

/// GET /api/auth/elevated - Probe for the admin / super-user guard
pub async fn elevated_get(Extension(principal): Extension<Principal>) -> ApiResult<ElevatedAccess> {
    Ok(ApiResponse::success(ElevatedAccess {
        ok: true,
        user: principal.into_user(),
    }))
}
