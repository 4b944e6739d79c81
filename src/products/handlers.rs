use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    app_state::AppState,
    error::{ApiError, ErrorResponse},
    pagination::PageParams,
    products::{model::Product, service},
};

pub const DEFAULT_PRODUCT_LIMIT: usize = 20;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub has_more: bool,
    pub total: usize,
}

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "products",
    params(PageParams),
    responses(
        (status = 200, description = "Page of products, by title", body = ProductPage),
        (status = 500, description = "Aggregation failed", body = ErrorResponse)
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<ProductPage>, ApiError> {
    let page = service::products_page(&state, params.window(DEFAULT_PRODUCT_LIMIT)).await?;
    Ok(Json(ProductPage {
        products: page.items,
        has_more: page.has_more,
        total: page.total,
    }))
}
