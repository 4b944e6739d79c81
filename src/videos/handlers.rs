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
    videos::{model::VideoItem, service},
};

pub const DEFAULT_VIDEO_LIMIT: usize = 30;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoPage {
    pub items: Vec<VideoItem>,
    pub has_more: bool,
    pub total: usize,
}

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    params(PageParams),
    responses(
        (status = 200, description = "Page of videos, newest first", body = VideoPage),
        (status = 500, description = "Aggregation failed", body = ErrorResponse)
    )
)]
pub async fn list_videos(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<VideoPage>, ApiError> {
    let page = service::videos_page(&state, params.window(DEFAULT_VIDEO_LIMIT)).await;
    Ok(Json(VideoPage {
        items: page.items,
        has_more: page.has_more,
        total: page.total,
    }))
}
