use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One article from a news feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    /// Raw HTML or plain text, as the feed published it.
    pub description: String,
    /// Source-provided date string; only parsed for sorting.
    pub pub_date: String,
    pub guid: String,
    pub image: Option<String>,
    /// Hostname of the feed the item came from.
    pub domain: String,
    /// Set when the feed carried no image; consumed by the enrichment pass.
    #[serde(skip)]
    pub needs_image: bool,
}
