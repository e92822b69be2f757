// handlers/protected/products/create.rs - POST /api/products handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use crate::app::AppState;
use crate::auth::Principal;
use crate::catalog::{NewProduct, ProductView};
use crate::middleware::{ApiResponse, ApiResult};

/// POST /api/products - Create a product owned by the caller
///
/// Expected Input:
/// ```json
/// {
///   "title": "Blue Hat",
///   "price": 10,
///   "sizes": ["M"],
///   "gender": "unisex",
///   "images": ["a.png", "b.png"]
/// }
/// ```
///
/// The slug is derived from `slug` when given, otherwise from the title. A taken title or slug
/// is a 409 carrying the violated key.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> ApiResult<ProductView> {
    let Json(input) = payload?;
    let product = state.catalog.create(input, principal.user()).await?;
    Ok(ApiResponse::created(product))
}
