pub mod client;
pub mod errors;
pub mod pipeline;
pub mod types;

pub use client::{FetchKind, Fetcher};
pub use errors::FetchError;
pub use types::PageResponse;
