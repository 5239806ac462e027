//! Fetch engine module
//!
//! This module turns a URL request into a policy-compliant HTTP fetch:
//! - Content-addressed response caching with TTL expiry
//! - A run-global request budget
//! - robots.txt compliance (delegated to the robots module)
//! - Per-host request pacing
//! - Retry with backoff for transient failures

mod cache;
mod engine;
mod rate_limit;

pub use cache::{CacheKey, ResponseCache};
pub use engine::FetchEngine;
pub use rate_limit::RateLimiter;

use std::collections::BTreeMap;
use url::Url;

/// Result of a successful fetch, either live or from the cache
///
/// Immutable once returned; the caller decides whether to persist it.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    /// Final URL after redirects
    pub url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Response headers
    pub headers: BTreeMap<String, String>,

    /// Response body as text
    pub body: String,

    /// Whether this result was served from the response cache
    pub from_cache: bool,
}

/// Network authority of a URL, the unit of rate limiting and robots caching
///
/// Returns None for URLs without a host (e.g. `data:` URLs).
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}
