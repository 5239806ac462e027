use crate::record::Reputation;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main configuration structure for gleaner
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub cache: Option<CacheConfig>,
    pub output: OutputConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// HTTP request behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(rename = "timeout-seconds")]
    pub timeout_seconds: f64,

    /// Number of automatic retries for retriable failures
    pub retries: u32,

    /// Base delay for retry backoff, in seconds
    #[serde(rename = "backoff-seconds")]
    pub backoff_seconds: f64,
}

/// Crawl etiquette configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Maximum requests per minute per host; zero or negative disables pacing
    #[serde(rename = "rate-limit-per-minute")]
    pub rate_limit_per_minute: i64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whether to honor robots.txt exclusion rules
    #[serde(rename = "respect-robots", default = "default_true")]
    pub respect_robots: bool,

    /// Optional cap on non-cached requests issued per run
    #[serde(rename = "max-requests", default)]
    pub max_requests: Option<u32>,
}

/// Response cache configuration; omit the section to disable caching
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Directory holding one file per cached response
    pub dir: PathBuf,

    /// Age in seconds after which a cached response is treated as absent
    #[serde(rename = "ttl-seconds")]
    pub ttl_seconds: i64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the raw/ and metrics/ JSONL files
    pub dir: PathBuf,
}

/// Payload interpretation selected for a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SourceType {
    /// Body is a JSON document, passed through as the record payload
    #[serde(rename = "http_json")]
    HttpJson,

    /// Body is HTML, wrapped opaquely as the record payload
    #[serde(rename = "http_html")]
    HttpHtml,
}

/// One configured source with its endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub source_type: SourceType,

    #[serde(rename = "base-url")]
    pub base_url: String,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub reputation: Reputation,

    #[serde(default)]
    pub endpoints: Vec<SourceEndpoint>,
}

impl SourceConfig {
    /// Returns true if records from this source are marked verified
    pub fn is_reputable(&self) -> bool {
        self.reputation.is_reputable()
    }
}

/// One path + parameter combination within a source's base URL
#[derive(Debug, Clone, Deserialize)]
pub struct SourceEndpoint {
    pub path: String,

    #[serde(default = "default_method")]
    pub method: String,

    /// Query parameters appended to the request; ordering is canonical
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

fn default_method() -> String {
    "GET".to_string()
}
