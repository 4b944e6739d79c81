use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::{
    aggregate::{Paged, Window, is_presentable, paginate, sort_by_title},
    app_state::AppState,
    error::ApiError,
    fetcher::{FetchKind, Fetcher},
    limiter::ConcurrencyLimiter,
    normalize::{
        price::{self, PriceRule},
        product::parse_product_page,
        sitemap::{MAX_SITEMAP_URLS, SitemapEntries, parse_sitemap},
    },
    products::model::Product,
    sources::StoreSource,
};

/// Product pages scraped per store on each request.
pub const MAX_PAGES_PER_STORE: usize = 15;

async fn fetch_sitemap(fetcher: &Fetcher, url: &str) -> SitemapEntries {
    let Some(page) = fetcher.fetch_or_none(url, FetchKind::Feed).await else {
        return SitemapEntries::default();
    };
    parse_sitemap(&page.body_utf8).unwrap_or_else(|err| {
        warn!(url, "Failed to parse sitemap, skipping: {}", err);
        SitemapEntries::default()
    })
}

/// Candidate product URLs for one store. A sitemap index is followed one
/// level down.
#[instrument(skip_all, fields(domain = %store.domain))]
pub async fn list_store_pages(fetcher: &Fetcher, store: &StoreSource) -> Vec<String> {
    let root = fetch_sitemap(fetcher, &store.sitemap).await;
    let mut pages = root.pages;

    if pages.len() < MAX_SITEMAP_URLS && !root.sitemaps.is_empty() {
        let children = join_all(root.sitemaps.iter().map(|url| fetch_sitemap(fetcher, url))).await;
        pages.extend(children.into_iter().flat_map(|child| child.pages));
        pages.truncate(MAX_SITEMAP_URLS);
    }

    debug!(candidates = pages.len(), "Listed store sitemap");
    pages.truncate(MAX_PAGES_PER_STORE);
    pages
}

async fn scrape_product(
    fetcher: Fetcher,
    page_url: String,
    domain: String,
    rules: Arc<Vec<PriceRule>>,
) -> Option<Product> {
    let page = fetcher.fetch_or_none(&page_url, FetchKind::Page).await?;
    let product = parse_product_page(&page.body_utf8, &page_url, &domain, &rules);
    if product.is_none() {
        debug!(url = %page_url, "Page has no title, not a product page");
    }
    product
}

/// The full product aggregate across every store, sorted by title.
///
/// Sitemaps are listed with full fan-out; page scrapes go through the
/// limiter.
#[instrument(skip_all, fields(stores = stores.len()))]
pub async fn collect_products(
    fetcher: &Fetcher,
    limiter: &ConcurrencyLimiter,
    stores: &[StoreSource],
) -> Result<Vec<Product>, ApiError> {
    let listings = join_all(stores.iter().map(|store| list_store_pages(fetcher, store))).await;

    let mut handles = Vec::new();
    for (store, pages) in stores.iter().zip(listings) {
        let rules = Arc::new(price::rules_for(&store.domain, &store.price_selectors));
        for page_url in pages {
            handles.push(limiter.spawn(scrape_product(
                fetcher.clone(),
                page_url,
                store.domain.clone(),
                rules.clone(),
            )));
        }
    }

    let mut products = Vec::with_capacity(handles.len());
    for result in join_all(handles).await {
        if let Some(product) = result??
            && is_presentable(&product.title, &product.url)
        {
            products.push(product);
        }
    }

    sort_by_title(&mut products, |product| product.title.as_str());
    Ok(products)
}

pub async fn products_page(state: &AppState, window: Window) -> Result<Paged<Product>, ApiError> {
    let products = collect_products(&state.fetcher, &state.limiter, &state.sources.stores).await?;
    let page = paginate(products, window);
    info!(
        offset = window.offset,
        limit = window.limit,
        returned = page.items.len(),
        total = page.total,
        "Served product page"
    );
    Ok(page)
}
