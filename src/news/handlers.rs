use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::{
    app_state::AppState,
    error::{ApiError, ErrorResponse},
    news::{model::NewsItem, service},
    pagination::PageParams,
};

pub const DEFAULT_NEWS_LIMIT: usize = 30;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsPage {
    pub items: Vec<NewsItem>,
    pub has_more: bool,
    pub total: usize,
}

#[utoipa::path(
    get,
    path = "/api/news",
    tag = "news",
    params(PageParams),
    responses(
        (status = 200, description = "Page of news items, newest first", body = NewsPage),
        (status = 500, description = "Aggregation failed", body = ErrorResponse)
    )
)]
pub async fn list_news(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<NewsPage>, ApiError> {
    if let Some(language) = params.language.as_deref() {
        debug!(language, "Language filter requested; not applied");
    }
    let page = service::news_page(&state, params.window(DEFAULT_NEWS_LIMIT)).await?;
    Ok(Json(NewsPage {
        items: page.items,
        has_more: page.has_more,
        total: page.total,
    }))
}
