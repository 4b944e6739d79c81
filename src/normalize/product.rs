//! Product pages, read through their Open-Graph and meta tags.

use scraper::{Html, Selector};

use super::{html, price};
use crate::products::model::{PRICE_NOT_AVAILABLE, Product};

pub const MAX_DESCRIPTION_CHARS: usize = 200;

fn meta_content(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|raw| {
        let selector = Selector::parse(raw).ok()?;
        document
            .select(&selector)
            .filter_map(|element| element.value().attr("content"))
            .map(str::trim)
            .find(|content| !content.is_empty())
            .map(str::to_string)
    })
}

fn title_tag(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .find(|title| !title.is_empty())
}

/// Build a product from a scraped page.
///
/// `page_url` is the sitemap URL the page was requested under; it keys the
/// product id. Returns `None` when the page has no title, which means it
/// isn't a product page.
pub fn parse_product_page(
    body: &str,
    page_url: &str,
    domain: &str,
    rules: &[price::PriceRule],
) -> Option<Product> {
    let document = Html::parse_document(body);

    let title = meta_content(&document, &["meta[property='og:title']", "meta[name='twitter:title']"])
        .or_else(|| title_tag(&document))
        .map(|t| html::strip_markup(&t))
        .filter(|t| !t.is_empty())?;

    let description = meta_content(
        &document,
        &[
            "meta[property='og:description']",
            "meta[name='description']",
            "meta[name='twitter:description']",
        ],
    )
    .map(|d| html::truncate_chars(&html::strip_markup(&d), MAX_DESCRIPTION_CHARS))
    .unwrap_or_default();

    let image = meta_content(
        &document,
        &[
            "meta[property='og:image']",
            "meta[property='og:image:url']",
            "meta[name='twitter:image']",
        ],
    )
    .and_then(|src| html::absolutize(&src, page_url));

    let price = price::extract_price(&document, rules)
        .unwrap_or_else(|| PRICE_NOT_AVAILABLE.to_string());

    Some(Product {
        id: Product::id_for(page_url),
        title,
        description,
        image,
        price,
        url: page_url.to_string(),
        domain: domain.to_string(),
    })
}
