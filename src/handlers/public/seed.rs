// handlers/public/seed.rs - GET /seed handler (mounted only when api.enable_seed_route is set)

use axum::extract::State;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::seed::{run_seed, SeedReport};

/// GET /seed - Replace all users and products with the fixture data
pub async fn seed_get(State(state): State<AppState>) -> ApiResult<SeedReport> {
    let report = run_seed(
        state.users.as_ref(),
        &state.catalog,
        state.config.security.bcrypt_cost,
    )
    .await?;

    Ok(ApiResponse::success(report))
}
