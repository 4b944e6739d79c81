//! Pattern helpers over raw markup.

use html_escape::decode_html_entities;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

// og:image with either attribute order
static OG_IMAGE_PROPERTY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta\s[^>]*?property\s*=\s*["']og:image(?::url)?["'][^>]*?content\s*=\s*["']([^"']+)["']"#)
        .unwrap()
});
static OG_IMAGE_CONTENT_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta\s[^>]*?content\s*=\s*["']([^"']+)["'][^>]*?property\s*=\s*["']og:image(?::url)?["']"#)
        .unwrap()
});

static IMG_SRC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<img\s[^>]*?src\s*=\s*["']([^"']+)["']"#).unwrap()
});

/// Markup to a single line of plain text. Entities are left alone: callers
/// pass text their parser has already unescaped.
pub fn strip_markup(text: &str) -> String {
    collapse_whitespace(&TAG_REGEX.replace_all(text, " "))
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text.trim(), " ").into_owned()
}

/// The Open-Graph image URL declared in a page's markup.
pub fn og_image(html: &str) -> Option<String> {
    OG_IMAGE_PROPERTY_FIRST
        .captures(html)
        .or_else(|| OG_IMAGE_CONTENT_FIRST.captures(html))
        .and_then(|caps| caps.get(1))
        .map(|m| decode_html_entities(m.as_str().trim()).into_owned())
        .filter(|src| !src.is_empty())
}

/// `src` of the first `<img>` in an HTML fragment.
pub fn first_img_src(html: &str) -> Option<String> {
    IMG_SRC_REGEX
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| decode_html_entities(m.as_str().trim()).into_owned())
        .filter(|src| !src.is_empty() && !src.starts_with("data:"))
}

/// Resolve a possibly relative reference against the page it came from.
pub fn absolutize(reference: &str, base: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    match Url::parse(reference) {
        Ok(url) => Some(url.to_string()),
        Err(_) => Url::parse(base)
            .and_then(|base| base.join(reference))
            .ok()
            .map(|url| url.to_string()),
    }
}

/// Cut to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}
