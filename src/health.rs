use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SourceCounts {
    pub feeds: usize,
    pub stores: usize,
    pub channels: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub sources: SourceCounts,
    #[serde(rename = "scrapeConcurrency")]
    pub scrape_concurrency: usize,
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    debug!("Health check");
    Json(HealthResponse {
        status: "OK".to_string(),
        sources: SourceCounts {
            feeds: state.sources.feeds.len(),
            stores: state.sources.stores.len(),
            channels: state.sources.channels.len(),
        },
        scrape_concurrency: state.limiter.capacity(),
    })
}
