//! Configuration handling for the application.
//!
//! Everything is read from environment variables with development defaults,
//! so a bare `cargo run --bin api` works against a local `sources.json`.
//! The source list itself lives in a separate JSON file (see
//! [`crate::sources`]); this module only knows where to find it.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::limiter::DEFAULT_SCRAPE_CONCURRENCY;

/// Environment variable names. Kept public so tests and the binary can refer
/// to them.
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_SOURCES_PATH: &str = "SOURCES_PATH";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_SCRAPE_TIMEOUT_SECS: &str = "SCRAPE_TIMEOUT_SECS";
pub const ENV_SCRAPE_CONCURRENCY: &str = "SCRAPE_CONCURRENCY";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

/// Default development values used when environment variables are absent.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_SOURCES_PATH: &str = "sources.json";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 10;

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    bind_addr: String,
    sources_path: PathBuf,
    fetch_timeout: Duration,
    scrape_timeout: Duration,
    scrape_concurrency: usize,
    log_format: LogFormat,
}

impl Config {
    /// Create a new config explicitly.
    pub fn new(
        bind_addr: impl Into<String>,
        sources_path: impl Into<PathBuf>,
        fetch_timeout: Duration,
        scrape_timeout: Duration,
        scrape_concurrency: usize,
    ) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            sources_path: sources_path.into(),
            fetch_timeout,
            scrape_timeout,
            scrape_concurrency,
            log_format: LogFormat::Text,
        }
    }

    /// Load from environment variables, falling back to development defaults.
    ///
    /// Numeric values that don't parse, and a zero scrape concurrency, are
    /// rejected with [`ConfigError::InvalidValue`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let sources_path = env::var(ENV_SOURCES_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SOURCES_PATH));

        let fetch_timeout_secs = parse_env(ENV_FETCH_TIMEOUT_SECS, DEFAULT_FETCH_TIMEOUT_SECS)?;
        let scrape_timeout_secs = parse_env(ENV_SCRAPE_TIMEOUT_SECS, DEFAULT_SCRAPE_TIMEOUT_SECS)?;
        let scrape_concurrency = parse_env(ENV_SCRAPE_CONCURRENCY, DEFAULT_SCRAPE_CONCURRENCY)?;
        if scrape_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: ENV_SCRAPE_CONCURRENCY,
                reason: "must be at least 1".to_string(),
            });
        }

        let log_format = match env::var(ENV_LOG_FORMAT) {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            Ok(value) if value.is_empty() || value.eq_ignore_ascii_case("text") => LogFormat::Text,
            Ok(value) => {
                return Err(ConfigError::InvalidValue {
                    field: ENV_LOG_FORMAT,
                    reason: format!("expected 'text' or 'json', got '{value}'"),
                });
            }
            Err(_) => LogFormat::Text,
        };

        Ok(Self {
            bind_addr,
            sources_path,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            scrape_timeout: Duration::from_secs(scrape_timeout_secs),
            scrape_concurrency,
            log_format,
        })
    }

    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    /// Path of the JSON file listing feeds, stores and channels.
    pub fn sources_path(&self) -> &Path {
        &self.sources_path
    }
    /// Timeout for feed, sitemap and video-feed requests.
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
    /// Timeout for product page scrapes and image enrichment.
    pub fn scrape_timeout(&self) -> Duration {
        self.scrape_timeout
    }
    /// Number of page scrapes allowed in flight at once.
    pub fn scrape_concurrency(&self) -> usize {
        self.scrape_concurrency
    }
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Development defaults (mirrors `from_env` with no env overrides).
    pub fn default() -> Self {
        // not `Default` impl yet to keep explicit semantics
        Self::new(
            DEFAULT_BIND_ADDR,
            DEFAULT_SOURCES_PATH,
            Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            Duration::from_secs(DEFAULT_SCRAPE_TIMEOUT_SECS),
            DEFAULT_SCRAPE_CONCURRENCY,
        )
    }
}

fn parse_env<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            field: key,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
