//! Gleaner: a polite source-scraping pipeline
//!
//! This crate fetches structured and semi-structured content from configured
//! remote sources while respecting crawl etiquette (per-host rate limits,
//! robots.txt), tolerating transient failures via an on-disk response cache
//! and retry with backoff, and forwarding normalized records to an
//! append-only sink together with run-level metrics.

pub mod config;
pub mod fetch;
pub mod pipeline;
pub mod record;
pub mod robots;
pub mod sink;
pub mod source;

use thiserror::Error;

/// Main error type for gleaner operations
#[derive(Debug, Error)]
pub enum GleanError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by a single fetch
///
/// A cache hit is not an error and never reaches this type; it short-circuits
/// inside the engine before any policy check runs.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request budget exhausted ({limit} requests issued)")]
    BudgetExhausted { limit: u32 },

    #[error("Blocked by robots.txt: {url}")]
    RobotsDenied { url: String },

    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Cache write error: {0}")]
    Cache(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for gleaner operations
pub type Result<T> = std::result::Result<T, GleanError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, SourceConfig, SourceEndpoint, SourceType};
pub use fetch::{FetchEngine, FetchResult, RateLimiter, ResponseCache};
pub use pipeline::{exit_code, run_pipeline, run_with_sink};
pub use record::{Record, Reputation, RunMetrics};
pub use robots::RobotsPolicy;
