pub mod enrich;
pub mod handlers;
pub mod model;
pub mod service;

pub use model::NewsItem;
