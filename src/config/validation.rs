use crate::config::types::{CacheConfig, Config, CrawlConfig, HttpConfig, SourceConfig};
use crate::ConfigError;
use reqwest::Method;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_crawl_config(&config.crawl)?;
    if let Some(cache) = &config.cache {
        validate_cache_config(cache)?;
    }
    validate_sources(&config.sources)?;
    Ok(())
}

/// Validates HTTP request configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_seconds <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "timeout-seconds must be positive, got {}",
            config.timeout_seconds
        )));
    }

    if config.backoff_seconds < 0.0 {
        return Err(ConfigError::Validation(format!(
            "backoff-seconds cannot be negative, got {}",
            config.backoff_seconds
        )));
    }

    Ok(())
}

/// Validates crawl etiquette configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.max_requests == Some(0) {
        return Err(ConfigError::Validation(
            "max-requests must be >= 1 when set; omit it for no limit".to_string(),
        ));
    }

    Ok(())
}

/// Validates response cache configuration
fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.ttl_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "cache ttl-seconds must be >= 1, got {}",
            config.ttl_seconds
        )));
    }

    Ok(())
}

/// Validates source definitions
fn validate_sources(sources: &[SourceConfig]) -> Result<(), ConfigError> {
    for source in sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name cannot be empty".to_string(),
            ));
        }

        let base = Url::parse(&source.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid base-url for source '{}': {}",
                source.name, e
            ))
        })?;

        if base.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "base-url for source '{}' has no host: {}",
                source.name, source.base_url
            )));
        }

        for endpoint in &source.endpoints {
            if endpoint.path.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "Source '{}' has an endpoint with an empty path",
                    source.name
                )));
            }

            Method::from_bytes(endpoint.method.as_bytes()).map_err(|_| {
                ConfigError::Validation(format!(
                    "Source '{}' endpoint '{}' has invalid method '{}'",
                    source.name, endpoint.path, endpoint.method
                ))
            })?;
        }
    }

    Ok(())
}
