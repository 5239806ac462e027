//! Payload interpretation per source type
//!
//! Parsing is a capability selected by the source-type tag: JSON sources
//! pass the decoded document through as the record payload, HTML sources
//! wrap the body opaquely. Neither interprets payload semantics.

use crate::config::{SourceConfig, SourceEndpoint, SourceType};
use crate::fetch::FetchResult;
use crate::record::Record;
use chrono::Utc;
use thiserror::Error;

/// Errors from turning a fetched body into records
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Turns one fetched response into zero or more normalized records
pub trait RecordParser {
    fn parse(
        &self,
        fetched: &FetchResult,
        source: &SourceConfig,
        endpoint: &SourceEndpoint,
    ) -> Result<Vec<Record>, ParseError>;
}

/// Selects the parser for a source type
pub fn parser_for(source_type: SourceType) -> &'static dyn RecordParser {
    match source_type {
        SourceType::HttpJson => &JsonParser,
        SourceType::HttpHtml => &HtmlParser,
    }
}

/// Tags a payload with the source and endpoint metadata
fn tag_record(
    payload: serde_json::Value,
    fetched: &FetchResult,
    source: &SourceConfig,
    endpoint: &SourceEndpoint,
) -> Record {
    Record {
        source: source.name.clone(),
        source_url: fetched.url.clone(),
        reputation: source.reputation,
        verified: source.is_reputable(),
        fetched_at: Utc::now(),
        endpoint: endpoint.path.clone(),
        payload,
    }
}

/// Parser for `http_json` sources: the body must be a JSON document
pub struct JsonParser;

impl RecordParser for JsonParser {
    fn parse(
        &self,
        fetched: &FetchResult,
        source: &SourceConfig,
        endpoint: &SourceEndpoint,
    ) -> Result<Vec<Record>, ParseError> {
        let payload: serde_json::Value = serde_json::from_str(&fetched.body)?;
        Ok(vec![tag_record(payload, fetched, source, endpoint)])
    }
}

/// Parser for `http_html` sources: the body is wrapped, never parsed
pub struct HtmlParser;

impl RecordParser for HtmlParser {
    fn parse(
        &self,
        fetched: &FetchResult,
        source: &SourceConfig,
        endpoint: &SourceEndpoint,
    ) -> Result<Vec<Record>, ParseError> {
        let payload = serde_json::json!({ "html": fetched.body });
        Ok(vec![tag_record(payload, fetched, source, endpoint)])
    }
}
