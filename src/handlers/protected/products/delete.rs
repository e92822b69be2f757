// handlers/protected/products/delete.rs - DELETE /api/products/:id handler

use axum::extract::{Path, State};

use super::parse_product_id;
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

/// DELETE /api/products/:id - Remove the product and its images (204)
pub async fn delete_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_product_id(&id)?;
    state.catalog.remove(&id.to_string()).await?;
    Ok(ApiResponse::no_content())
}
