//! Source runner: drives all endpoints of one source through the engine

use crate::config::{SourceConfig, SourceEndpoint};
use crate::fetch::{FetchEngine, FetchResult};
use crate::record::Record;
use crate::source::parsers::parser_for;
use crate::FetchError;
use reqwest::Method;
use url::Url;

/// Everything one source run produced
#[derive(Debug)]
pub struct SourceOutcome {
    /// Name of the source that ran
    pub source: String,

    /// Records from every endpoint that succeeded, in endpoint order
    pub records: Vec<Record>,

    /// One descriptive string per failed endpoint
    pub errors: Vec<String>,
}

/// One configured source ready to run
pub struct Source {
    config: SourceConfig,
}

impl Source {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Runs every endpoint of this source through the engine
    ///
    /// Failures from fetching or parsing become one error string naming the
    /// source, the endpoint, and the cause, and the run proceeds to the next
    /// endpoint. Records collected before a failure are kept.
    pub async fn run(&self, engine: &mut FetchEngine) -> SourceOutcome {
        let mut records = Vec::new();
        let mut errors = Vec::new();
        let parser = parser_for(self.config.source_type);

        for endpoint in &self.config.endpoints {
            match self.fetch_endpoint(engine, endpoint).await {
                Ok(fetched) => match parser.parse(&fetched, &self.config, endpoint) {
                    Ok(mut parsed) => records.append(&mut parsed),
                    Err(e) => errors.push(format!("{}:{}: {}", self.name(), endpoint.path, e)),
                },
                Err(e) => errors.push(format!("{}:{}: {}", self.name(), endpoint.path, e)),
            }
        }

        SourceOutcome {
            source: self.config.name.clone(),
            records,
            errors,
        }
    }

    /// Resolves the endpoint URL and fetches it
    async fn fetch_endpoint(
        &self,
        engine: &mut FetchEngine,
        endpoint: &SourceEndpoint,
    ) -> Result<FetchResult, FetchError> {
        let url = join_endpoint(&self.config.base_url, &endpoint.path)?;
        let method =
            Method::from_bytes(endpoint.method.as_bytes()).map_err(|_| FetchError::InvalidUrl {
                url: url.to_string(),
                reason: format!("invalid method '{}'", endpoint.method),
            })?;
        engine.fetch(&url, method, &endpoint.params).await
    }
}

/// Joins a source base URL with an endpoint path
///
/// The base is treated as a directory: trailing slashes on the base and
/// leading slashes on the path are normalized away before joining, so
/// `https://a.example/api` + `/v1/stats` resolves under `/api/`.
fn join_endpoint(base_url: &str, path: &str) -> Result<Url, FetchError> {
    let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/'))).map_err(|e| {
        FetchError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        }
    })?;

    base.join(path.trim_start_matches('/'))
        .map_err(|e| FetchError::InvalidUrl {
            url: format!("{}/{}", base_url, path),
            reason: e.to_string(),
        })
}
