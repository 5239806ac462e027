//! Sink trait and error types

use crate::record::{Record, RunMetrics};
use thiserror::Error;

/// Errors that can occur while writing to a sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for normalized records and run metrics
pub trait Sink {
    /// Appends a batch of records
    ///
    /// May be called multiple times per run. Implementations partition by
    /// the verified flag at this boundary.
    fn write_raw(&mut self, records: &[Record]) -> SinkResult<()>;

    /// Writes the run metrics snapshot; called exactly once at run end
    fn write_metrics(&mut self, metrics: &RunMetrics) -> SinkResult<()>;
}
