use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use crate::{
    aggregate::{Paged, Window, flatten, paginate, sort_by_recency},
    app_state::AppState,
    error::ApiError,
    fetcher::{FetchKind, Fetcher},
    news::{enrich, model::NewsItem},
    normalize::feed::parse_feed,
};

/// Fetch and parse one feed. Any failure yields an empty list.
async fn fetch_feed(fetcher: &Fetcher, feed_url: &str) -> Vec<NewsItem> {
    let Some(page) = fetcher.fetch_or_none(feed_url, FetchKind::Feed).await else {
        return Vec::new();
    };
    match parse_feed(&page.body_utf8, feed_url) {
        Ok(items) => {
            debug!(url = feed_url, count = items.len(), "Parsed feed");
            items
        }
        Err(err) => {
            warn!(url = feed_url, "Failed to parse feed, skipping: {}", err);
            Vec::new()
        }
    }
}

/// The full news aggregate: every feed, newest first.
#[instrument(skip_all, fields(feeds = feeds.len()))]
pub async fn collect_news(fetcher: &Fetcher, feeds: &[String]) -> Vec<NewsItem> {
    let per_feed = join_all(feeds.iter().map(|url| fetch_feed(fetcher, url))).await;
    let mut items = flatten(per_feed);
    sort_by_recency(&mut items, |item| item.pub_date.as_str());
    items
}

/// One page of news, with missing images filled in for that page only.
pub async fn news_page(state: &AppState, window: Window) -> Result<Paged<NewsItem>, ApiError> {
    let items = collect_news(&state.fetcher, &state.sources.feeds).await;
    let mut page = paginate(items, window);
    enrich::fill_missing_images(&state.fetcher, &state.limiter, &mut page.items).await?;
    info!(
        offset = window.offset,
        limit = window.limit,
        returned = page.items.len(),
        total = page.total,
        "Served news page"
    );
    Ok(page)
}
