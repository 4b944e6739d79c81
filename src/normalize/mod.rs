//! Turn raw feed, sitemap and page payloads into typed records.
//!
//! Each parser is a pure function over a string. Entries that can't become a
//! presentable record are dropped here, so nothing loosely typed leaves this
//! module.

pub mod feed;
pub mod html;
pub mod price;
pub mod product;
pub mod sitemap;
pub mod video;
mod xml;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed xml at byte {position}: {reason}")]
    Xml { position: u64, reason: String },

    #[error("invalid source url '{0}'")]
    SourceUrl(String),
}

/// Hostname of a source URL, used for display attribution.
pub fn hostname(url: &str) -> Result<String, ParseError> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .ok_or_else(|| ParseError::SourceUrl(url.to_string()))
}
