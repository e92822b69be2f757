// handlers/public/products/list.rs - GET /products handler

use axum::extract::{rejection::QueryRejection, Query, State};

use crate::app::AppState;
use crate::catalog::ProductView;
use crate::filter::PageQuery;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /products?limit=10&offset=0 - One window of the catalog, ordered by title
///
/// `limit` must be a positive integer and `offset` a non-negative one; anything else is a 400
/// naming the offending parameter.
pub async fn list_get(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Vec<ProductView>> {
    let Query(query) = query?;
    let page = query.into_page(state.config.api.default_page_limit)?;

    let products = state.catalog.find_many(page).await?;
    Ok(ApiResponse::success(products))
}
