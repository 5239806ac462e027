//! JSONL file sink and the dry-run null sink

use crate::record::{Record, RunMetrics};
use crate::sink::traits::{Sink, SinkResult};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only JSONL sink under an output directory
///
/// Records land in `raw/raw_verified.jsonl` or `raw/raw_unverified.jsonl`
/// depending on their verified flag; metrics are appended to
/// `metrics/runs.jsonl`, one line per run.
pub struct JsonlSink {
    raw_dir: PathBuf,
    metrics_dir: PathBuf,
}

impl JsonlSink {
    /// Creates the sink, making the raw/ and metrics/ directories if absent
    pub fn new(output_dir: &Path) -> SinkResult<Self> {
        let raw_dir = output_dir.join("raw");
        let metrics_dir = output_dir.join("metrics");
        std::fs::create_dir_all(&raw_dir)?;
        std::fs::create_dir_all(&metrics_dir)?;
        Ok(Self {
            raw_dir,
            metrics_dir,
        })
    }

    fn append_lines(path: &Path, records: &[&Record]) -> SinkResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        for record in records {
            let line = serde_json::to_string(record)?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }
}

impl Sink for JsonlSink {
    fn write_raw(&mut self, records: &[Record]) -> SinkResult<()> {
        let (verified, unverified): (Vec<&Record>, Vec<&Record>) =
            records.iter().partition(|record| record.verified);

        Self::append_lines(&self.raw_dir.join("raw_verified.jsonl"), &verified)?;
        Self::append_lines(&self.raw_dir.join("raw_unverified.jsonl"), &unverified)?;
        Ok(())
    }

    fn write_metrics(&mut self, metrics: &RunMetrics) -> SinkResult<()> {
        let path = self.metrics_dir.join("runs.jsonl");
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", serde_json::to_string(metrics)?)?;
        Ok(())
    }
}

/// Sink that discards everything; used for dry runs
pub struct NullSink;

impl Sink for NullSink {
    fn write_raw(&mut self, _records: &[Record]) -> SinkResult<()> {
        Ok(())
    }

    fn write_metrics(&mut self, _metrics: &RunMetrics) -> SinkResult<()> {
        Ok(())
    }
}
