//! Offset/limit query parameters.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::aggregate::Window;

/// Raw query string values. Kept as strings so that garbage input falls back
/// to the defaults instead of failing extraction.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Items to skip (default 0).
    pub offset: Option<String>,
    /// Page size (default depends on the endpoint).
    pub limit: Option<String>,
    /// Language filter token. Accepted by the news endpoint, not applied.
    pub language: Option<String>,
}

impl PageParams {
    pub fn window(&self, default_limit: usize) -> Window {
        Window::new(
            parse_or(self.offset.as_deref(), 0),
            parse_or(self.limit.as_deref(), default_limit),
        )
    }
}

/// Non-numeric, negative or missing values all become `default`.
fn parse_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(default)
}
