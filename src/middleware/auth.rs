use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{authorize, Principal, Role};
use crate::error::ApiError;

/// Route guards, ordered loosest first
pub const ANY_ROLE: &[Role] = &[];
pub const USER: &[Role] = &[Role::User];
pub const ADMIN: &[Role] = &[Role::Admin];
pub const ELEVATED: &[Role] = &[Role::Admin, Role::SuperUser];

/// Stage one: verify the bearer token and attach the [`Principal`] to the request.
///
/// Any token failure stops the request here with 401.
pub async fn resolve_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .map_err(ApiError::unauthorized)?
        .to_string();

    let principal = state.verifier.verify(&token).await?;
    tracing::debug!("Resolved principal {}", principal.id());

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Stage two: check the attached principal against the roles this route requires.
///
/// Mount with `from_fn_with_state(ADMIN, require_roles)` inside [`resolve_principal`].
/// A request that never went through stage one is still rejected as unauthenticated.
pub async fn require_roles(
    State(required): State<&'static [Role]>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request.extensions().get::<Principal>();
    authorize(principal, required).into_result()?;

    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty JWT token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
