use crate::config::Config;
use crate::fetcher::{errors::FetchError, pipeline::process_response, types::PageResponse};
use reqwest::{
    Client, ClientBuilder,
    header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue},
};
use std::time::Duration;
use tracing::{instrument, warn};

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Which timeout budget a request runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Feed, sitemap and video-feed listings.
    Feed,
    /// Product pages and enrichment fetches.
    Page,
}

/// Outbound HTTP with a fixed browser-like header set.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: Client,
    feed_timeout: Duration,
    page_timeout: Duration,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        Self::with_timeouts(config.fetch_timeout(), config.scrape_timeout())
    }

    pub fn with_timeouts(feed_timeout: Duration, page_timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,application/rss+xml,application/atom+xml,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9,es;q=0.8"));

        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            feed_timeout,
            page_timeout,
        })
    }

    fn timeout_for(&self, kind: FetchKind) -> Duration {
        match kind {
            FetchKind::Feed => self.feed_timeout,
            FetchKind::Page => self.page_timeout,
        }
    }

    #[instrument(skip_all, fields(url = %url, kind = ?kind))]
    pub async fn fetch(&self, url: &str, kind: FetchKind) -> Result<PageResponse, FetchError> {
        let parsed_url = url::Url::parse(url)?;

        let response = self
            .client
            .get(parsed_url)
            .timeout(self.timeout_for(kind))
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        // Check content length before downloading
        if let Some(content_length) = response.content_length()
            && content_length > MAX_BODY_SIZE
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let final_url = response.url().clone();
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Http { status });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_textual(&content_type) {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        let body_bytes = response
            .bytes()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        // Check body size after download (in case Content-Length was missing)
        if body_bytes.len() as u64 > MAX_BODY_SIZE {
            return Err(FetchError::BodyTooLarge(body_bytes.len() as u64));
        }

        Ok(process_response(final_url, &body_bytes, &content_type))
    }

    /// Fetch a document body, logging and returning `None` on any failure.
    ///
    /// This is the per-source isolation boundary: callers treat `None` as an
    /// empty contribution and never see the error.
    pub async fn fetch_or_none(&self, url: &str, kind: FetchKind) -> Option<PageResponse> {
        match self.fetch(url, kind).await {
            Ok(page) => Some(page),
            Err(err) => {
                warn!(
                    url,
                    transient = err.is_transient(),
                    "Fetch failed, source contributes nothing: {}",
                    err
                );
                None
            }
        }
    }
}

fn is_textual(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty()
        || content_type.starts_with("text/")
        || content_type.contains("html")
        || content_type.contains("xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textual_content_types() {
        assert!(is_textual("text/html; charset=utf-8"));
        assert!(is_textual("application/rss+xml"));
        assert!(is_textual("application/atom+xml; charset=UTF-8"));
        assert!(is_textual("application/xhtml+xml"));
        assert!(is_textual("text/plain"));
        assert!(is_textual(""));
        assert!(!is_textual("image/jpeg"));
        assert!(!is_textual("application/json"));
    }
}
