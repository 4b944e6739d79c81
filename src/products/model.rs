use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const PRICE_NOT_AVAILABLE: &str = "not available";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Truncated digest of `url`, stable across requests.
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    /// Localized price text, or [`PRICE_NOT_AVAILABLE`].
    pub price: String,
    pub url: String,
    pub domain: String,
}

impl Product {
    /// Deterministic id for a product page URL. Truncation makes collisions
    /// possible; they are accepted.
    pub fn id_for(url: &str) -> String {
        let digest = format!("{:x}", md5::compute(url.as_bytes()));
        digest[..16].to_string()
    }
}
