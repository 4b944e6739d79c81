use axum::{Router, http::HeaderName, routing::get};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    app_state::AppState,
    error::ErrorResponse,
    health::{self, HealthResponse, SourceCounts},
    news::{self, NewsItem, handlers::NewsPage},
    products::{self, Product, handlers::ProductPage},
    videos::{self, VideoItem, handlers::VideoPage},
};

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        news::handlers::list_news,
        products::handlers::list_products,
        videos::handlers::list_videos,
    ),
    components(schemas(
        NewsItem,
        NewsPage,
        Product,
        ProductPage,
        VideoItem,
        VideoPage,
        ErrorResponse,
        HealthResponse,
        SourceCounts,
    )),
    tags(
        (name = "news", description = "Aggregated RSS/Atom news"),
        (name = "products", description = "Products scraped from store sitemaps"),
        (name = "videos", description = "Videos from channel feeds"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

/// API routes only, without middleware.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health::health_check))
        .route("/api/news", get(news::handlers::list_news))
        .route("/api/products", get(products::handlers::list_products))
        .route("/api/videos", get(videos::handlers::list_videos))
}

/// The full application: routes, OpenAPI docs, request ids and tracing.
pub fn app(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    api_routes()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
        .with_state(state)
}
