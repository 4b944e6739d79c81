use crate::{
    config::Config,
    fetcher::{FetchError, Fetcher},
    limiter::ConcurrencyLimiter,
    sources::SourceRegistry,
};
use std::sync::Arc;

/// Shared, read-only request context.
#[derive(Clone, Debug)]
pub struct AppState {
    pub sources: Arc<SourceRegistry>,
    pub fetcher: Fetcher,
    pub limiter: ConcurrencyLimiter,
}

impl AppState {
    pub fn new(sources: SourceRegistry, fetcher: Fetcher, limiter: ConcurrencyLimiter) -> Self {
        Self {
            sources: Arc::new(sources),
            fetcher,
            limiter,
        }
    }

    pub fn from_config(config: &Config, sources: SourceRegistry) -> Result<Self, FetchError> {
        Ok(Self::new(
            sources,
            Fetcher::new(config)?,
            ConcurrencyLimiter::new(config.scrape_concurrency()),
        ))
    }
}
