//! Merge, filter, sort and window the per-source results.
//!
//! Everything here is pure; the domain services feed it the flattened
//! output of their sources and hand the resulting [`Paged`] to the
//! endpoint layer.

use std::cmp::Reverse;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use url::Url;

/// One page of an aggregate plus what the client needs to keep scrolling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub total: usize,
}

/// Offset/limit window over the full aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: usize,
    pub limit: usize,
}

impl Window {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }
}

/// Flatten per-source lists, keeping source order then item order.
pub fn flatten<T>(per_source: Vec<Vec<T>>) -> Vec<T> {
    per_source.into_iter().flatten().collect()
}

/// Slice `[offset, offset + limit)` out of the sorted aggregate.
///
/// `total` and `has_more` describe the whole aggregate, not the page.
pub fn paginate<T>(items: Vec<T>, window: Window) -> Paged<T> {
    let total = items.len();
    let end = window.offset.saturating_add(window.limit);
    let has_more = end < total;
    let items = items
        .into_iter()
        .skip(window.offset)
        .take(window.limit)
        .collect();
    Paged {
        items,
        has_more,
        total,
    }
}

/// Newest first. Entries whose date doesn't parse go last, in input order.
pub fn sort_by_recency<T, F>(items: &mut [T], date_of: F)
where
    F: Fn(&T) -> &str,
{
    // sort_by_cached_key is stable and parses every date only once
    items.sort_by_cached_key(|item| {
        let parsed = parse_timestamp(date_of(item));
        (parsed.is_none(), Reverse(parsed))
    });
}

/// Alphabetical order that ignores case and accents, so `Éclair` files
/// under `e`. The raw title breaks ties.
pub fn sort_by_title<T, F>(items: &mut [T], title_of: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_cached_key(|item| {
        let title = title_of(item).trim();
        (collation_key(title), title.to_string())
    });
}

/// Decompose, drop combining marks, then case-fold.
fn collation_key(title: &str) -> String {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// A usable item has a non-blank title and an absolute http(s) link.
pub fn is_presentable(title: &str, link: &str) -> bool {
    !title.trim().is_empty() && is_http_url(link)
}

pub fn is_http_url(link: &str) -> bool {
    Url::parse(link.trim())
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const ZONED_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S %z",
];

/// Parse the date formats feeds actually publish. Naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        name: &'static str,
        date: &'static str,
    }

    fn entry(name: &'static str, date: &'static str) -> Entry {
        Entry { name, date }
    }

    fn names(entries: &[Entry]) -> Vec<&'static str> {
        entries.iter().map(|e| e.name).collect()
    }

    #[test]
    fn test_paginate_reports_against_full_aggregate() {
        let page = paginate((0..5).collect::<Vec<_>>(), Window::new(0, 3));
        assert_eq!(page.items, vec![0, 1, 2]);
        assert!(page.has_more);
        assert_eq!(page.total, 5);

        let page = paginate((0..5).collect::<Vec<_>>(), Window::new(3, 3));
        assert_eq!(page.items, vec![3, 4]);
        assert!(!page.has_more);
        assert_eq!(page.total, 5);
    }

    #[test]
    fn test_paginate_exact_end_has_no_more() {
        let page = paginate((0..6).collect::<Vec<_>>(), Window::new(3, 3));
        assert_eq!(page.items, vec![3, 4, 5]);
        assert!(!page.has_more);
    }

    #[test]
    fn test_paginate_offset_past_end() {
        let page = paginate(vec!['a', 'b'], Window::new(10, 5));
        assert!(page.items.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_paginate_huge_window_does_not_overflow() {
        let page = paginate(vec![1, 2, 3], Window::new(usize::MAX, usize::MAX));
        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn test_sort_by_recency_newest_first_invalid_last() {
        let mut entries = vec![
            entry("bad-1", "yesterday-ish"),
            entry("old", "Mon, 01 Jan 2024 10:00:00 GMT"),
            entry("bad-2", ""),
            entry("new", "2024-03-05T08:00:00Z"),
            entry("mid", "Thu, 15 Feb 2024 12:30:00 +0100"),
        ];
        sort_by_recency(&mut entries, |e| e.date);
        assert_eq!(names(&entries), vec!["new", "mid", "old", "bad-1", "bad-2"]);
    }

    #[test]
    fn test_sort_by_recency_is_stable_for_ties() {
        let mut entries = vec![
            entry("first", "2024-01-01T00:00:00Z"),
            entry("second", "Mon, 01 Jan 2024 00:00:00 +0000"),
            entry("third", "2024-01-01 00:00:00"),
        ];
        sort_by_recency(&mut entries, |e| e.date);
        assert_eq!(names(&entries), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_sort_by_title_ignores_case() {
        let mut titles = vec!["banana", "Apple", "cherry", "apple"];
        sort_by_title(&mut titles, |t| *t);
        assert_eq!(titles, vec!["Apple", "apple", "banana", "cherry"]);
    }

    #[test]
    fn test_sort_by_title_files_accented_letters_with_base_letter() {
        let mut titles = vec!["zebra", "Éclair", "apple", "Fig", "eclair", "Ñandú", "naranja"];
        sort_by_title(&mut titles, |t| *t);
        assert_eq!(
            titles,
            vec!["apple", "eclair", "Éclair", "Fig", "Ñandú", "naranja", "zebra"]
        );
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = "2024-03-05T08:00:00Z".parse::<DateTime<Utc>>().unwrap();
        for raw in [
            "Tue, 05 Mar 2024 08:00:00 GMT",
            "Tue, 05 Mar 2024 08:00:00 +0000",
            "2024-03-05T08:00:00+00:00",
            "2024-03-05T09:00:00+01:00",
            "2024-03-05T08:00:00",
            "2024-03-05 08:00:00",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "failed on {raw}");
        }
        assert!(parse_timestamp("2024-03-05").is_some());
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("   "), None);
    }

    #[test]
    fn test_is_presentable() {
        assert!(is_presentable("Title", "https://example.com/a"));
        assert!(!is_presentable("  ", "https://example.com/a"));
        assert!(!is_presentable("Title", "/relative/path"));
        assert!(!is_presentable("Title", "mailto:someone@example.com"));
        assert!(!is_presentable("Title", ""));
    }

    #[test]
    fn test_flatten_keeps_source_order() {
        let merged = flatten(vec![vec![1, 2], vec![], vec![3]]);
        assert_eq!(merged, vec![1, 2, 3]);
    }
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn paginate_matches_slice(
            len in 0usize..200,
            offset in 0usize..250,
            limit in 0usize..100,
        ) {
            let items: Vec<usize> = (0..len).collect();
            let page = paginate(items.clone(), Window::new(offset, limit));
            let start = offset.min(len);
            let end = (offset + limit).min(len);
            prop_assert_eq!(&page.items[..], &items[start..end]);
            prop_assert_eq!(page.total, len);
            prop_assert_eq!(page.has_more, offset + limit < len);
        }

        #[test]
        fn recency_sort_puts_invalid_last(
            dates in proptest::collection::vec(
                prop_oneof![
                    (0i64..2_000_000_000).prop_map(|secs| {
                        DateTime::from_timestamp(secs, 0).unwrap().to_rfc3339()
                    }),
                    Just("garbage".to_string()),
                ],
                0..50,
            )
        ) {
            let mut sorted = dates.clone();
            sort_by_recency(&mut sorted, |d| d.as_str());
            let parsed: Vec<_> = sorted.iter().map(|d| parse_timestamp(d)).collect();
            let first_invalid = parsed.iter().position(Option::is_none).unwrap_or(parsed.len());
            prop_assert!(parsed[first_invalid..].iter().all(Option::is_none));
            for pair in parsed[..first_invalid].windows(2) {
                prop_assert!(pair[0] >= pair[1]);
            }
        }
    }
}
