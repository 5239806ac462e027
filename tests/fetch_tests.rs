//! Integration tests for the fetch engine policy chain
//!
//! These tests run a wiremock server and verify the ordering guarantees:
//! cache hits bypass everything, the budget caps dispatched requests,
//! robots denials are never retried, and transient failures are retried
//! with backoff.

use gleaner::config::{CrawlConfig, HttpConfig};
use gleaner::{FetchEngine, FetchError, ResponseCache};
use reqwest::Method;
use std::collections::BTreeMap;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http_config() -> HttpConfig {
    HttpConfig {
        timeout_seconds: 5.0,
        retries: 2,
        backoff_seconds: 0.01,
    }
}

fn crawl_config(respect_robots: bool, max_requests: Option<u32>) -> CrawlConfig {
    CrawlConfig {
        rate_limit_per_minute: 0,
        user_agent: "GleanerTest/0.1".to_string(),
        respect_robots,
        max_requests,
    }
}

fn no_params() -> BTreeMap<String, String> {
    BTreeMap::new()
}

#[tokio::test]
async fn test_cache_hit_bypasses_dispatch_and_counter() {
    let server = MockServer::start().await;

    // The endpoint must be dispatched exactly once across two fetches
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"x\": 1}"))
        .expect(1)
        .mount(&server)
        .await;

    let cache_dir = tempfile::tempdir().unwrap();
    let cache = ResponseCache::new(cache_dir.path(), 3600).unwrap();
    let mut engine =
        FetchEngine::new(&http_config(), &crawl_config(false, None), Some(cache)).unwrap();

    let url = Url::parse(&format!("{}/data", server.uri())).unwrap();

    let first = engine
        .fetch(&url, Method::GET, &no_params())
        .await
        .unwrap();
    assert!(!first.from_cache);
    assert_eq!(engine.request_count(), 1);

    let second = engine
        .fetch(&url, Method::GET, &no_params())
        .await
        .unwrap();
    assert!(second.from_cache);
    assert_eq!(second.body, first.body);
    assert_eq!(second.status_code, first.status_code);

    // The counter only moves for non-cached requests
    assert_eq!(engine.request_count(), 1);
}

#[tokio::test]
async fn test_budget_caps_dispatched_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    // Never reached once the budget is spent
    Mock::given(method("GET"))
        .and(path("/second"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(0)
        .mount(&server)
        .await;

    let mut engine =
        FetchEngine::new(&http_config(), &crawl_config(false, Some(1)), None).unwrap();

    let first = Url::parse(&format!("{}/first", server.uri())).unwrap();
    engine
        .fetch(&first, Method::GET, &no_params())
        .await
        .unwrap();

    let second = Url::parse(&format!("{}/second", server.uri())).unwrap();
    let result = engine.fetch(&second, Method::GET, &no_params()).await;
    assert!(matches!(
        result,
        Err(FetchError::BudgetExhausted { limit: 1 })
    ));

    // The engine stays usable: re-fetching within budget rules still works
    // for cached content, but no new request is dispatched
    assert_eq!(engine.request_count(), 1);
}

#[tokio::test]
async fn test_budget_exhausted_fetch_still_serves_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"x\": 1}"))
        .expect(1)
        .mount(&server)
        .await;

    let cache_dir = tempfile::tempdir().unwrap();
    let cache = ResponseCache::new(cache_dir.path(), 3600).unwrap();
    let mut engine =
        FetchEngine::new(&http_config(), &crawl_config(false, Some(1)), Some(cache)).unwrap();

    let url = Url::parse(&format!("{}/data", server.uri())).unwrap();
    engine.fetch(&url, Method::GET, &no_params()).await.unwrap();

    // Budget is spent, but the cached URL still resolves
    let hit = engine
        .fetch(&url, Method::GET, &no_params())
        .await
        .unwrap();
    assert!(hit.from_cache);
}

#[tokio::test]
async fn test_robots_denial_blocks_and_is_not_retried() {
    let server = MockServer::start().await;

    // robots.txt is fetched once per host, not once per check
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/public"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let mut engine =
        FetchEngine::new(&http_config(), &crawl_config(true, None), None).unwrap();

    let admin = Url::parse(&format!("{}/admin", server.uri())).unwrap();
    let result = engine.fetch(&admin, Method::GET, &no_params()).await;
    assert!(matches!(result, Err(FetchError::RobotsDenied { .. })));

    // A denied fetch never counts against anything
    assert_eq!(engine.request_count(), 0);

    let public = Url::parse(&format!("{}/public", server.uri())).unwrap();
    engine
        .fetch(&public, Method::GET, &no_params())
        .await
        .unwrap();

    // A second denied check reuses the cached ruleset
    let result = engine.fetch(&admin, Method::GET, &no_params()).await;
    assert!(matches!(result, Err(FetchError::RobotsDenied { .. })));
}

#[tokio::test]
async fn test_robots_fetch_failure_fails_open() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let mut engine =
        FetchEngine::new(&http_config(), &crawl_config(true, None), None).unwrap();

    let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
    let result = engine.fetch(&url, Method::GET, &no_params()).await.unwrap();
    assert_eq!(result.body, "ok");

    // The fail-open ruleset is cached; no second robots.txt fetch happens
    let other = Url::parse(&format!("{}/page", server.uri())).unwrap();
    engine
        .fetch(&other, Method::GET, &no_params())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_transient_status_is_retried() {
    let server = MockServer::start().await;

    // First attempt sees a 503, the retry sees a 200
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .expect(1)
        .mount(&server)
        .await;

    let mut engine =
        FetchEngine::new(&http_config(), &crawl_config(false, None), None).unwrap();

    let url = Url::parse(&format!("{}/flaky", server.uri())).unwrap();
    let result = engine.fetch(&url, Method::GET, &no_params()).await.unwrap();
    assert_eq!(result.body, "recovered");
    assert_eq!(result.status_code, 200);
    assert_eq!(engine.request_count(), 1);
}

#[tokio::test]
async fn test_exhausted_retries_surface_last_status() {
    let server = MockServer::start().await;

    // Initial attempt plus two retries
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let mut engine =
        FetchEngine::new(&http_config(), &crawl_config(false, None), None).unwrap();

    let url = Url::parse(&format!("{}/down", server.uri())).unwrap();
    let result = engine.fetch(&url, Method::GET, &no_params()).await;
    assert!(matches!(result, Err(FetchError::Http { status: 500, .. })));
    assert_eq!(engine.request_count(), 0);
}

#[tokio::test]
async fn test_non_retriable_status_surfaces_immediately() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut engine =
        FetchEngine::new(&http_config(), &crawl_config(false, None), None).unwrap();

    let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
    let result = engine.fetch(&url, Method::GET, &no_params()).await;
    assert!(matches!(result, Err(FetchError::Http { status: 404, .. })));

    // Failures never increment the request counter
    assert_eq!(engine.request_count(), 0);
}

#[tokio::test]
async fn test_post_is_not_retried_on_transient_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let mut engine =
        FetchEngine::new(&http_config(), &crawl_config(false, None), None).unwrap();

    let url = Url::parse(&format!("{}/submit", server.uri())).unwrap();
    let result = engine.fetch(&url, Method::POST, &no_params()).await;
    assert!(matches!(result, Err(FetchError::Http { status: 503, .. })));
}

#[tokio::test]
async fn test_query_params_are_appended_not_cached_apart() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .and(wiremock::matchers::query_param("region", "eu"))
        .respond_with(ResponseTemplate::new(200).set_body_string("eu-data"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .and(wiremock::matchers::query_param("region", "na"))
        .respond_with(ResponseTemplate::new(200).set_body_string("na-data"))
        .expect(1)
        .mount(&server)
        .await;

    let cache_dir = tempfile::tempdir().unwrap();
    let cache = ResponseCache::new(cache_dir.path(), 3600).unwrap();
    let mut engine =
        FetchEngine::new(&http_config(), &crawl_config(false, None), Some(cache)).unwrap();

    let url = Url::parse(&format!("{}/api", server.uri())).unwrap();

    let mut eu = BTreeMap::new();
    eu.insert("region".to_string(), "eu".to_string());
    let mut na = BTreeMap::new();
    na.insert("region".to_string(), "na".to_string());

    // Different parameter sets are distinct cache entries
    let eu_result = engine.fetch(&url, Method::GET, &eu).await.unwrap();
    let na_result = engine.fetch(&url, Method::GET, &na).await.unwrap();
    assert_eq!(eu_result.body, "eu-data");
    assert_eq!(na_result.body, "na-data");

    // And each repeats from cache
    let eu_again = engine.fetch(&url, Method::GET, &eu).await.unwrap();
    assert!(eu_again.from_cache);
    assert_eq!(eu_again.body, "eu-data");
}
