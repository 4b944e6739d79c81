use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

use newsstand::{
    app_state::AppState, fetcher::Fetcher, limiter::ConcurrencyLimiter, routes,
    sources::SourceRegistry,
};

pub fn test_state(sources: SourceRegistry) -> AppState {
    let fetcher = Fetcher::with_timeouts(Duration::from_secs(5), Duration::from_secs(5))
        .expect("Failed to build fetcher");
    AppState::new(sources, fetcher, ConcurrencyLimiter::new(5))
}

pub fn test_app(sources: SourceRegistry) -> Router {
    routes::app(test_state(sources))
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

/// RSS document with one `<item>` per (title, path, pubDate) triple.
pub fn rss_feed(base: &str, items: &[(&str, &str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(title, path, date)| {
            format!(
                "<item><title>{title}</title><link>{base}{path}</link>\
                 <description>About {title}</description>\
                 <media:content url=\"{base}/img{path}.jpg\" medium=\"image\"/>\
                 <pubDate>{date}</pubDate></item>"
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\"?><rss version=\"2.0\" xmlns:media=\"http://search.yahoo.com/mrss/\">\
         <channel><title>Test</title>{items}</channel></rss>"
    )
}

#[allow(dead_code)]
pub fn titles(items: &Value) -> Vec<String> {
    items
        .as_array()
        .expect("expected an array")
        .iter()
        .map(|item| item["title"].as_str().unwrap_or_default().to_string())
        .collect()
}
