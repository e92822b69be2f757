// handlers/protected/products/update.rs - PATCH /api/products/:id handler

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};

use super::parse_product_id;
use crate::app::AppState;
use crate::auth::Principal;
use crate::catalog::{ProductChanges, ProductView};
use crate::middleware::{ApiResponse, ApiResult};

/// PATCH /api/products/:id - Partial update; the caller becomes the recorded owner
///
/// Fields left out of the body keep their current values. An `images` list replaces every
/// existing image in one transaction.
pub async fn update_patch(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Result<Json<ProductChanges>, JsonRejection>,
) -> ApiResult<ProductView> {
    let id = parse_product_id(&id)?;
    let Json(changes) = payload?;

    let product = state.catalog.update(id, changes, principal.user()).await?;
    Ok(ApiResponse::success(product))
}
