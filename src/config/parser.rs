use crate::config::types::{Config, SourceConfig};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Selects the sources a run will actually scrape
///
/// Filters the configured sources by name (when `only` is non-empty),
/// drops disabled sources unless `include_disabled` is set, and drops
/// nonreputable sources unless `allow_unverified` is set. Order is
/// preserved.
pub fn select_sources(
    sources: &[SourceConfig],
    only: &[String],
    include_disabled: bool,
    allow_unverified: bool,
) -> Vec<SourceConfig> {
    sources
        .iter()
        .filter(|source| only.is_empty() || only.iter().any(|name| name == &source.name))
        .filter(|source| include_disabled || source.enabled)
        .filter(|source| allow_unverified || source.is_reputable())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{SourceEndpoint, SourceType};
    use crate::record::Reputation;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn make_source(name: &str, enabled: bool, reputation: Reputation) -> SourceConfig {
        SourceConfig {
            name: name.to_string(),
            source_type: SourceType::HttpJson,
            base_url: "https://example.com".to_string(),
            enabled,
            reputation,
            endpoints: vec![SourceEndpoint {
                path: "/api".to_string(),
                method: "GET".to_string(),
                params: Default::default(),
            }],
        }
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[http]
timeout-seconds = 20.0
retries = 3
backoff-seconds = 1.0

[crawl]
rate-limit-per-minute = 60
user-agent = "Gleaner/0.1 (+https://example.com/about)"

[output]
dir = "./output"

[[sources]]
name = "stats"
type = "http_json"
base-url = "https://stats.example.com"
enabled = true

[[sources.endpoints]]
path = "/api/v1/summary"
params = { region = "eu" }
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.http.retries, 3);
        assert!(config.crawl.respect_robots);
        assert!(config.cache.is_none());
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].endpoints[0].params["region"], "eu");
    }

    #[test]
    fn test_load_config_with_cache_section() {
        let config_content = r#"
[http]
timeout-seconds = 20.0
retries = 3
backoff-seconds = 1.0

[crawl]
rate-limit-per-minute = 0
user-agent = "Gleaner/0.1"
respect-robots = false
max-requests = 100

[cache]
dir = "./cache"
ttl-seconds = 3600

[output]
dir = "./output"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        let cache = config.cache.expect("cache section should be present");
        assert_eq!(cache.ttl_seconds, 3600);
        assert_eq!(config.crawl.max_requests, Some(100));
        assert!(!config.crawl.respect_robots);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[http]
timeout-seconds = 0.0
retries = 3
backoff-seconds = 1.0

[crawl]
rate-limit-per-minute = 60
user-agent = "Gleaner/0.1"

[output]
dir = "./output"
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_select_sources_enabled_only_by_default() {
        let sources = vec![
            make_source("a", true, Reputation::Reputable),
            make_source("b", false, Reputation::Reputable),
        ];

        let selected = select_sources(&sources, &[], false, false);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "a");

        let selected = select_sources(&sources, &[], true, false);
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_select_sources_by_name() {
        let sources = vec![
            make_source("a", true, Reputation::Reputable),
            make_source("b", true, Reputation::Reputable),
        ];

        let only = vec!["b".to_string()];
        let selected = select_sources(&sources, &only, false, false);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "b");
    }

    #[test]
    fn test_select_sources_reputable_only_by_default() {
        let sources = vec![
            make_source("a", true, Reputation::Reputable),
            make_source("b", true, Reputation::Nonreputable),
        ];

        let selected = select_sources(&sources, &[], false, false);
        assert_eq!(selected.len(), 1);

        let selected = select_sources(&sources, &[], false, true);
        assert_eq!(selected.len(), 2);
    }
}
