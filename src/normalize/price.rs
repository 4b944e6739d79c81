//! Per-domain price extraction rules.
//!
//! Each domain has an ordered list of (selector, extractor) pairs, most
//! specific first. The first rule whose extracted text contains a currency
//! amount wins. Generic rules are appended to every domain's list, followed
//! by rules that pair a machine-readable amount with the page's currency code.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

/// A currency marker (symbol or ISO-style code) directly followed by digits.
static CURRENCY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:US\$|R\$|S/\.?|[$€£¥₹₩]|\b(?:USD|EUR|GBP|ARS|MXN|BRL|CLP|COP|PEN|UYU|CAD|AUD|NZD|JPY|CNY|KRW|INR|CHF|SEK|NOK|DKK|PLN|CZK|ZAR)\b)\s*\d[\d.,]*",
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// Whitespace-normalized text content of the element.
    Text,
    /// A bare number in `attr`, prefixed with the currency code found in
    /// the `attr` of the first element matching `currency`.
    Amount {
        attr: &'static str,
        currency: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRule {
    pub selector: String,
    pub extract: Extract,
}

impl PriceRule {
    pub fn text(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            extract: Extract::Text,
        }
    }

    pub fn amount(selector: impl Into<String>, attr: &'static str, currency: &'static str) -> Self {
        Self {
            selector: selector.into(),
            extract: Extract::Amount { attr, currency },
        }
    }

    fn apply(&self, element: ElementRef<'_>, document: &Html) -> Option<String> {
        match self.extract {
            Extract::Text => {
                let text = element.text().collect::<Vec<_>>().join(" ");
                Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
            }
            Extract::Amount { attr, currency } => {
                let amount = element.value().attr(attr)?.trim();
                if !amount.starts_with(|c: char| c.is_ascii_digit()) {
                    return None;
                }
                let selector = Selector::parse(currency).ok()?;
                let code = document
                    .select(&selector)
                    .find_map(|el| el.value().attr(attr))
                    .map(str::trim)
                    .filter(|code| !code.is_empty())?;
                Some(format!("{} {}", code.to_ascii_uppercase(), amount))
            }
        }
    }
}

/// Domain-specific selectors, keyed by registrable hostname.
const DOMAIN_RULES: &[(&str, &[&str])] = &[
    (
        "amazon.com",
        &[
            "#corePriceDisplay_desktop_feature_div .a-offscreen",
            "#corePrice_feature_div .a-offscreen",
            ".a-price .a-offscreen",
            "#priceblock_ourprice",
            "#priceblock_dealprice",
        ],
    ),
    (
        "mercadolibre.com",
        &[
            ".ui-pdp-price__second-line .andes-money-amount",
            ".ui-pdp-price .andes-money-amount",
            ".andes-money-amount",
            ".price-tag",
        ],
    ),
    (
        "ebay.com",
        &[".x-price-primary", "#prcIsum", "#mm-saleDscPrc", ".display-price"],
    ),
    (
        "etsy.com",
        &["[data-buy-box-region='price'] p", ".wt-text-title-larger"],
    ),
    (
        "bestbuy.com",
        &[".priceView-customer-price span", ".priceView-hero-price span"],
    ),
    ("walmart.com", &["[itemprop='price']", "[data-testid='price-wrap'] span"]),
];

/// Applied after the domain rules on every site.
const GENERIC_RULES: &[&str] = &[
    "[itemprop='price']",
    ".product-price",
    ".price .amount",
    ".woocommerce-Price-amount",
    ".price",
    "[class*='price']",
];

/// Machine-readable amounts published without a currency symbol.
const AMOUNT_RULES: &[(&str, &str, &str)] = &[
    (
        "meta[property='product:price:amount']",
        "content",
        "meta[property='product:price:currency']",
    ),
    (
        "[itemprop='price'][content]",
        "content",
        "[itemprop='priceCurrency'][content]",
    ),
];

/// Ordered rules for a store: configured extras, then the domain's table
/// entry, then the generic fallbacks.
pub fn rules_for(domain: &str, extra_selectors: &[String]) -> Vec<PriceRule> {
    let host = domain.trim().trim_start_matches("www.").to_ascii_lowercase();
    let mut rules: Vec<PriceRule> = extra_selectors.iter().map(PriceRule::text).collect();

    for (key, selectors) in DOMAIN_RULES {
        if domain_matches(&host, key) {
            rules.extend(selectors.iter().map(|s| PriceRule::text(*s)));
        }
    }

    rules.extend(GENERIC_RULES.iter().map(|s| PriceRule::text(*s)));
    rules.extend(AMOUNT_RULES.iter().map(|(selector, attr, currency)| {
        PriceRule::amount(*selector, *attr, *currency)
    }));
    rules
}

/// `amazon.com` matches `amazon.com`, `smile.amazon.com` and
/// `amazon.com.mx`; `mercadolibre.com` matches `mercadolibre.com.ar`.
fn domain_matches(host: &str, key: &str) -> bool {
    host == key
        || host.ends_with(&format!(".{key}"))
        || host.starts_with(&format!("{key}."))
        || host.contains(&format!(".{key}."))
}

/// Try each rule in order and return the first currency amount found.
pub fn extract_price(document: &Html, rules: &[PriceRule]) -> Option<String> {
    for rule in rules {
        let selector = match Selector::parse(&rule.selector) {
            Ok(selector) => selector,
            Err(_) => {
                debug!(selector = %rule.selector, "Skipping unparsable price selector");
                continue;
            }
        };
        for element in document.select(&selector) {
            if let Some(candidate) = rule.apply(element, document)
                && let Some(found) = CURRENCY_REGEX.find(&candidate)
            {
                return Some(found.as_str().trim().to_string());
            }
        }
    }
    None
}
