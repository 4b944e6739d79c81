//! Second pass that looks up `og:image` for items whose feed had no image.

use futures::future::join_all;
use tracing::{debug, instrument};

use crate::{
    error::ApiError,
    fetcher::{FetchKind, Fetcher},
    limiter::ConcurrencyLimiter,
    news::model::NewsItem,
    normalize::html,
};

/// Fetch `link` and return its Open-Graph image as an absolute URL.
pub async fn lookup_og_image(fetcher: &Fetcher, link: &str) -> Option<String> {
    let page = fetcher.fetch_or_none(link, FetchKind::Page).await?;
    let image = html::og_image(&page.body_utf8)
        .and_then(|src| html::absolutize(&src, page.url_final.as_str()));
    if image.is_none() {
        debug!(url = link, "No og:image on page");
    }
    image
}

/// Enrich the items flagged with `needs_image`. Lookups share the scrape
/// limiter; a failed lookup leaves the image empty.
#[instrument(skip_all, fields(page_size = items.len()))]
pub async fn fill_missing_images(
    fetcher: &Fetcher,
    limiter: &ConcurrencyLimiter,
    items: &mut [NewsItem],
) -> Result<(), ApiError> {
    let handles: Vec<_> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.needs_image)
        .map(|(index, item)| {
            let fetcher = fetcher.clone();
            let link = item.link.clone();
            let handle = limiter.spawn(async move { lookup_og_image(&fetcher, &link).await });
            (index, handle)
        })
        .collect();

    if handles.is_empty() {
        return Ok(());
    }

    let (indices, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
    for (index, result) in indices.into_iter().zip(join_all(handles).await) {
        let item = &mut items[index];
        item.image = result??;
        item.needs_image = false;
    }
    Ok(())
}
