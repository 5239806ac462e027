//! Fetch engine: the ordered policy chain around every HTTP request
//!
//! Each fetch runs the chain: cache check, request budget, robots.txt,
//! per-host pacing, dispatch, retry with backoff. A cache hit returns
//! before any other step executes; a robots denial is never retried; the
//! request counter moves only when a non-cached request succeeds.

use crate::config::{CrawlConfig, HttpConfig};
use crate::fetch::{host_key, CacheKey, FetchResult, RateLimiter, ResponseCache};
use crate::robots::RobotsPolicy;
use crate::FetchError;
use reqwest::{Client, Method};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Status codes retried automatically for GET/HEAD requests
const RETRIABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Composes caching, budget, robots compliance, pacing, and retry into a
/// single fetch operation
///
/// Build one engine per run and share it across all sources: the cache,
/// the limiter table, the robots cache, and the request budget are all
/// run-global state owned by the instance.
pub struct FetchEngine {
    client: Client,
    limiter: RateLimiter,
    cache: Option<ResponseCache>,
    robots: Option<RobotsPolicy>,
    max_requests: Option<u32>,
    retries: u32,
    backoff: Duration,
    request_count: u32,
}

impl FetchEngine {
    /// Creates an engine from the HTTP and crawl configuration
    ///
    /// The reqwest client carries the timeout and the fixed User-Agent for
    /// every request, including robots.txt fetches.
    pub fn new(
        http: &HttpConfig,
        crawl: &CrawlConfig,
        cache: Option<ResponseCache>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(crawl.user_agent.clone())
            .timeout(Duration::from_secs_f64(http.timeout_seconds))
            .gzip(true)
            .brotli(true)
            .build()?;

        let robots = crawl
            .respect_robots
            .then(|| RobotsPolicy::new(&crawl.user_agent));

        Ok(Self {
            client,
            limiter: RateLimiter::new(crawl.rate_limit_per_minute),
            cache,
            robots,
            max_requests: crawl.max_requests,
            retries: http.retries,
            backoff: Duration::from_secs_f64(http.backoff_seconds),
            request_count: 0,
        })
    }

    /// Number of non-cached requests issued so far this run
    pub fn request_count(&self) -> u32 {
        self.request_count
    }

    /// Fetches a URL through the full policy chain
    ///
    /// `params` are appended to the request as query parameters and are part
    /// of the cache key. Policy violations fail the call with a
    /// distinguishable error instead of succeeding silently.
    pub async fn fetch(
        &mut self,
        url: &Url,
        method: Method,
        params: &BTreeMap<String, String>,
    ) -> Result<FetchResult, FetchError> {
        let key = CacheKey::for_request(url, params);

        // A hit bypasses the budget, robots, and pacing entirely
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key) {
                tracing::debug!("cache hit for {}", url);
                return Ok(hit);
            }
        }

        if let Some(limit) = self.max_requests {
            if self.request_count >= limit {
                return Err(FetchError::BudgetExhausted { limit });
            }
        }

        if let Some(robots) = &mut self.robots {
            if !robots.allowed(&self.client, url).await {
                return Err(FetchError::RobotsDenied {
                    url: url.to_string(),
                });
            }
        }

        let host = host_key(url).unwrap_or_default();
        self.limiter.wait(&host).await;

        let result = self.dispatch_with_retry(url, method, params).await?;

        if let Some(cache) = &self.cache {
            cache.set(&key, &result)?;
        }
        self.request_count += 1;

        Ok(result)
    }

    /// Dispatches a request, retrying transient failures
    ///
    /// Retry applies only to GET/HEAD, only for the retriable status set and
    /// low-level connection failures, with exponential backoff between
    /// attempts. Anything else surfaces immediately.
    async fn dispatch_with_retry(
        &self,
        url: &Url,
        method: Method,
        params: &BTreeMap<String, String>,
    ) -> Result<FetchResult, FetchError> {
        let retriable_method = matches!(method, Method::GET | Method::HEAD);
        let mut attempt: u32 = 0;

        loop {
            let can_retry = retriable_method && attempt < self.retries;

            match self.dispatch(url, method.clone(), params).await {
                Ok(result) if (200..300).contains(&result.status_code) => return Ok(result),
                Ok(result)
                    if can_retry && RETRIABLE_STATUSES.contains(&result.status_code) =>
                {
                    attempt += 1;
                    let delay = self.backoff_delay(attempt);
                    tracing::debug!(
                        "HTTP {} from {}, retry {}/{} in {:?}",
                        result.status_code,
                        url,
                        attempt,
                        self.retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(result) => {
                    return Err(FetchError::Http {
                        url: url.to_string(),
                        status: result.status_code,
                    })
                }
                Err(FetchError::Network { ref source, .. })
                    if can_retry && (source.is_connect() || source.is_timeout()) =>
                {
                    attempt += 1;
                    let delay = self.backoff_delay(attempt);
                    tracing::debug!(
                        "network error for {}, retry {}/{} in {:?}: {}",
                        url,
                        attempt,
                        self.retries,
                        delay,
                        source
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Delay before retry number `attempt` (1-based): backoff * 2^(attempt-1)
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32 << (attempt - 1).min(16);
        self.backoff.checked_mul(factor).unwrap_or(self.backoff)
    }

    /// Issues one request and collects the response into a FetchResult
    async fn dispatch(
        &self,
        url: &Url,
        method: Method,
        params: &BTreeMap<String, String>,
    ) -> Result<FetchResult, FetchError> {
        let mut request = self.client.request(method, url.clone());
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request.send().await.map_err(|e| FetchError::Network {
            url: url.to_string(),
            source: e,
        })?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(|e| FetchError::Network {
            url: url.to_string(),
            source: e,
        })?;

        Ok(FetchResult {
            url: final_url,
            status_code,
            headers,
            body,
            from_cache: false,
        })
    }
}
