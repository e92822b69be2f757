// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::app::AppState;
use crate::auth::models::LoginUser;
use crate::auth::AuthSession;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /auth/login - Exchange email and password for a token
///
/// Expected Input:
/// ```json
/// { "email": "test1@google.com", "password": "Abc123" }
/// ```
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": "user_uuid",
///     "email": "test1@google.com",
///     "fullName": "Test One",
///     "isActive": true,
///     "roles": ["admin"],
///     "token": "jwt"
///   }
/// }
/// ```
///
/// Unknown email and wrong password are both 401, with messages naming the failing field.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginUser>, JsonRejection>,
) -> ApiResult<AuthSession> {
    let Json(input) = payload?;
    let session = state.auth.login(input).await?;
    Ok(ApiResponse::success(session))
}
