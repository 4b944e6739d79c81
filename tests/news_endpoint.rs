mod helpers;

use axum::http::StatusCode;
use helpers::{get_json, rss_feed, test_app, titles};
use newsstand::sources::SourceRegistry;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

async fn mount_feed(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("Content-Type", "application/rss+xml"),
        )
        .mount(server)
        .await;
}

/// Two feeds with 3 and 2 items, all dated on distinct days.
async fn two_feed_server() -> MockServer {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_feed(
        &server,
        "/a.xml",
        rss_feed(
            &base,
            &[
                ("A1", "/a1", "Fri, 01 Mar 2024 09:00:00 GMT"),
                ("A2", "/a2", "Sun, 03 Mar 2024 09:00:00 GMT"),
                ("A3", "/a3", "Tue, 05 Mar 2024 09:00:00 GMT"),
            ],
        ),
    )
    .await;
    mount_feed(
        &server,
        "/b.xml",
        rss_feed(
            &base,
            &[
                ("B1", "/b1", "Sat, 02 Mar 2024 09:00:00 GMT"),
                ("B2", "/b2", "Mon, 04 Mar 2024 09:00:00 GMT"),
            ],
        ),
    )
    .await;
    server
}

fn registry(feeds: Vec<String>) -> SourceRegistry {
    SourceRegistry {
        feeds,
        ..SourceRegistry::default()
    }
}

#[tokio::test]
async fn test_paginates_newest_first() {
    let server = two_feed_server().await;
    let base = server.uri();
    let app = test_app(registry(vec![
        format!("{base}/a.xml"),
        format!("{base}/b.xml"),
    ]));

    let (status, body) = get_json(app.clone(), "/api/news?offset=0&limit=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body["items"]), vec!["A3", "B2", "A2"]);
    assert_eq!(body["hasMore"], true);
    assert_eq!(body["total"], 5);

    let (status, body) = get_json(app, "/api/news?offset=3&limit=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body["items"]), vec!["B1", "A1"]);
    assert_eq!(body["hasMore"], false);
    assert_eq!(body["total"], 5);
}

#[tokio::test]
async fn test_item_shape() {
    let server = two_feed_server().await;
    let base = server.uri();
    let app = test_app(registry(vec![format!("{base}/a.xml")]));

    let (_, body) = get_json(app, "/api/news?limit=1").await;
    let item = &body["items"][0];
    assert_eq!(item["title"], "A3");
    assert_eq!(item["link"], format!("{base}/a3"));
    assert_eq!(item["guid"], format!("{base}/a3"));
    assert_eq!(item["image"], format!("{base}/img/a3.jpg"));
    assert_eq!(item["pubDate"], "Tue, 05 Mar 2024 09:00:00 GMT");
    assert_eq!(item["domain"], "127.0.0.1");
    assert!(item.get("needsImage").is_none());
}

#[tokio::test]
async fn test_failing_sources_are_isolated() {
    let server = two_feed_server().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/broken.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_feed(
        &server,
        "/garbage.xml",
        "<rss><channel><item><title>x</titl></item>".to_string(),
    )
    .await;

    let healthy = test_app(registry(vec![
        format!("{base}/a.xml"),
        format!("{base}/b.xml"),
    ]));
    let with_failures = test_app(registry(vec![
        format!("{base}/a.xml"),
        format!("{base}/broken.xml"),
        format!("{base}/garbage.xml"),
        "http://127.0.0.1:9/unreachable.xml".to_string(),
        format!("{base}/b.xml"),
    ]));

    let (_, expected) = get_json(healthy, "/api/news?limit=50").await;
    let (status, actual) = get_json(with_failures, "/api/news?limit=50").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(actual, expected);
    assert_eq!(actual["total"], 5);
}

#[tokio::test]
async fn test_repeated_calls_are_identical() {
    let server = two_feed_server().await;
    let base = server.uri();
    let app = test_app(registry(vec![
        format!("{base}/a.xml"),
        format!("{base}/b.xml"),
    ]));

    let (_, first) = get_json(app.clone(), "/api/news?offset=1&limit=2").await;
    let (_, second) = get_json(app, "/api/news?offset=1&limit=2").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_invalid_params_use_defaults() {
    let server = two_feed_server().await;
    let base = server.uri();
    let app = test_app(registry(vec![format!("{base}/a.xml")]));

    let (status, body) = get_json(app, "/api/news?offset=abc&limit=-2&language=es").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
    assert_eq!(body["hasMore"], false);
}

#[tokio::test]
async fn test_undated_items_sort_last() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_feed(
        &server,
        "/mixed.xml",
        rss_feed(
            &base,
            &[
                ("Undated", "/u", "sometime last week"),
                ("Older", "/o", "2024-01-01T00:00:00Z"),
                ("Newer", "/n", "2024-02-01T00:00:00Z"),
            ],
        ),
    )
    .await;

    let app = test_app(registry(vec![format!("{base}/mixed.xml")]));
    let (_, body) = get_json(app, "/api/news").await;
    assert_eq!(titles(&body["items"]), vec!["Newer", "Older", "Undated"]);
}

#[tokio::test]
async fn test_enriches_missing_images_on_the_page() {
    let server = MockServer::start().await;
    let base = server.uri();
    let feed = format!(
        "<rss><channel>\
         <item><title>Has og image</title><link>{base}/story</link><pubDate>2024-03-02T00:00:00Z</pubDate></item>\
         <item><title>Page missing</title><link>{base}/missing</link><pubDate>2024-03-01T00:00:00Z</pubDate></item>\
         </channel></rss>"
    );
    mount_feed(&server, "/feed.xml", feed).await;
    Mock::given(method("GET"))
        .and(path("/story"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"<html><head><meta content="/og/story.png" property="og:image"></head></html>"#,
                )
                .insert_header("Content-Type", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let app = test_app(registry(vec![format!("{base}/feed.xml")]));
    let (status, body) = get_json(app, "/api/news?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["image"], format!("{base}/og/story.png"));
    assert!(body["items"][1]["image"].is_null());
}

#[tokio::test]
async fn test_enrichment_only_touches_the_returned_page() {
    let server = MockServer::start().await;
    let base = server.uri();
    let feed = format!(
        "<rss><channel>\
         <item><title>First</title><link>{base}/first</link><pubDate>2024-03-02T00:00:00Z</pubDate></item>\
         <item><title>Second</title><link>{base}/second</link><pubDate>2024-03-01T00:00:00Z</pubDate></item>\
         </channel></rss>"
    );
    mount_feed(&server, "/feed.xml", feed).await;
    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/second"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&server)
        .await;

    let app = test_app(registry(vec![format!("{base}/feed.xml")]));
    let (_, body) = get_json(app, "/api/news?limit=1").await;
    assert_eq!(titles(&body["items"]), vec!["First"]);
    assert_eq!(body["hasMore"], true);
}

#[tokio::test]
async fn test_no_feeds_is_an_empty_page() {
    let app = test_app(SourceRegistry::default());
    let (status, body) = get_json(app, "/api/news").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["hasMore"], false);
    assert_eq!(body["total"], 0);
}
