use encoding_rs::Encoding;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use crate::fetcher::types::PageResponse;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static XML_DECL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<\?xml\s+[^>]*?encoding\s*=\s*["']([^"']+)["']"#).unwrap());

/// Decode a response body to UTF-8 and package it as a [`PageResponse`].
pub fn process_response(
    url_final: Url,
    body_bytes: &[u8],
    content_type: &str,
) -> PageResponse {
    let encoding = detect_encoding(content_type, body_bytes);
    let (decoded, _, had_errors) = encoding.decode(body_bytes);
    if had_errors {
        debug!(
            url = %url_final,
            encoding = encoding.name(),
            "Body contained malformed sequences, replaced during decode"
        );
    }

    PageResponse {
        url_final,
        body_utf8: decoded.into_owned(),
        encoding: encoding.name(),
    }
}

fn detect_encoding(content_type: &str, body_bytes: &[u8]) -> &'static Encoding {
    // 1. Content-Type header
    if let Some(encoding) = capture_label(&CHARSET_REGEX, content_type) {
        return encoding;
    }

    // 2. Document declarations in the first 4KB
    let search_bytes = &body_bytes[..body_bytes.len().min(4096)];
    let search_str = String::from_utf8_lossy(search_bytes);

    // <?xml version="1.0" encoding="..."?>
    if let Some(encoding) = capture_label(&XML_DECL_REGEX, &search_str) {
        return encoding;
    }
    // <meta charset="..."> and <meta http-equiv="Content-Type" content="...; charset=...">
    if let Some(encoding) = capture_label(&META_CHARSET_REGEX, &search_str) {
        return encoding;
    }

    // 3. Heuristic detection
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(search_bytes, false);
    detector.guess(None, true)
}

fn capture_label(regex: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let captures = regex.captures(haystack)?;
    let label = captures.get(1)?.as_str().to_lowercase();
    Encoding::for_label(label.as_bytes())
}
