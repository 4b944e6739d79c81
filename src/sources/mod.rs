//! Source registry: the feeds, stores and channels to aggregate from.
//!
//! Loaded once at startup with [`SourceRegistry::load`] and shared read-only
//! through [`crate::app_state::AppState`].

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use url::Url;

pub const DEFAULT_VIDEO_FEED_BASE: &str = "https://www.youtube.com/feeds/videos.xml";

#[derive(Debug, Error)]
pub enum SourcesError {
    #[error("failed to read sources file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed sources file: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid source url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// A sitemap to crawl for product pages on one store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSource {
    pub sitemap: String,
    /// Hostname the price rule table is keyed on.
    pub domain: String,
    /// Extra price selectors tried before the built-in rules for `domain`.
    #[serde(default)]
    pub price_selectors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelSource {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRegistry {
    #[serde(default)]
    pub feeds: Vec<String>,
    #[serde(default)]
    pub stores: Vec<StoreSource>,
    #[serde(default)]
    pub channels: Vec<ChannelSource>,
    #[serde(default = "default_video_feed_base")]
    pub video_feed_base: String,
}

fn default_video_feed_base() -> String {
    DEFAULT_VIDEO_FEED_BASE.to_string()
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self {
            feeds: Vec::new(),
            stores: Vec::new(),
            channels: Vec::new(),
            video_feed_base: default_video_feed_base(),
        }
    }
}

impl SourceRegistry {
    /// Read and validate the registry from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SourcesError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SourcesError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_json(&raw)?;
        info!(
            feeds = registry.feeds.len(),
            stores = registry.stores.len(),
            channels = registry.channels.len(),
            "Loaded source registry from {}",
            path.display()
        );
        Ok(registry)
    }

    /// Parse a registry document. Every URL must be absolute.
    pub fn from_json(raw: &str) -> Result<Self, SourcesError> {
        let registry: Self = serde_json::from_str(raw)?;
        let urls = registry
            .feeds
            .iter()
            .chain(registry.stores.iter().map(|s| &s.sitemap))
            .chain(std::iter::once(&registry.video_feed_base));
        for url in urls {
            Url::parse(url).map_err(|source| SourcesError::InvalidUrl {
                url: url.clone(),
                source,
            })?;
        }
        Ok(registry)
    }

    /// Atom feed URL for one video channel.
    pub fn channel_feed_url(&self, channel: &ChannelSource) -> Result<Url, SourcesError> {
        let mut url = Url::parse(&self.video_feed_base).map_err(|source| {
            SourcesError::InvalidUrl {
                url: self.video_feed_base.clone(),
                source,
            }
        })?;
        url.query_pairs_mut().append_pair("channel_id", &channel.id);
        Ok(url)
    }
}
