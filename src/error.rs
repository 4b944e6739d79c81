use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::AcquireError;
use tokio::task::JoinError;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failures that escape per-source isolation and abort the whole request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("aggregation task failed: {0}")]
    Task(#[from] JoinError),

    #[error("scrape limiter closed")]
    LimiterClosed(#[from] AcquireError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }),
        )
            .into_response()
    }
}
