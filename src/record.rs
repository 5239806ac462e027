//! Normalized record and run metrics models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Static trust classification of a source
///
/// Controls whether records produced by the source are marked verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reputation {
    Reputable,
    Nonreputable,
}

impl Reputation {
    /// Returns true for reputable sources
    pub fn is_reputable(self) -> bool {
        matches!(self, Reputation::Reputable)
    }
}

impl Default for Reputation {
    fn default() -> Self {
        Reputation::Reputable
    }
}

/// One normalized record produced from a fetched endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Name of the source this record came from
    pub source: String,

    /// Final URL the payload was fetched from
    pub source_url: String,

    /// Trust classification of the source
    pub reputation: Reputation,

    /// Whether the record counts as verified (mirrors the reputation)
    pub verified: bool,

    /// When the payload was fetched
    pub fetched_at: DateTime<Utc>,

    /// Endpoint path within the source that produced this record
    pub endpoint: String,

    /// Opaque payload; never interpreted beyond serialization
    pub payload: serde_json::Value,
}

/// Run-level metrics, written exactly once at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub run_at: DateTime<Utc>,
    pub sources: usize,
    pub records: usize,
    pub verified_records: usize,
    pub errors: usize,
    pub dry_run: bool,
}
