// handlers/public/products/show.rs - GET /products/:term handler

use axum::extract::{Path, State};

use crate::app::AppState;
use crate::catalog::ProductView;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /products/:term - Look up by id, or by title (any case) or slug
pub async fn show_get(
    State(state): State<AppState>,
    Path(term): Path<String>,
) -> ApiResult<ProductView> {
    let product = state.catalog.find_one_plain(&term).await?;
    Ok(ApiResponse::success(product))
}
