pub mod aggregate;
pub mod app_state;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod health;
pub mod limiter;
pub mod news;
pub mod normalize;
pub mod pagination;
pub mod products;
pub mod routes;
pub mod sources;
pub mod telemetry;
pub mod videos;
