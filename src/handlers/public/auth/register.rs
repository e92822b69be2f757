// handlers/public/auth/register.rs - POST /auth/register handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::app::AppState;
use crate::auth::models::RegisterUser;
use crate::auth::AuthSession;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /auth/register - Create an account with the `user` role
///
/// Expected Input:
/// ```json
/// { "email": "string", "password": "string", "fullName": "string" }
/// ```
///
/// Responds 201 with the new user and a token; 409 if the email is taken.
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterUser>, JsonRejection>,
) -> ApiResult<AuthSession> {
    let Json(input) = payload?;
    let session = state.auth.register(input).await?;
    Ok(ApiResponse::created(session))
}
