//! Run orchestration
//!
//! Drives all selected sources through one shared fetch engine, strictly in
//! order and one at a time. The cache, the rate-limiter table, the robots
//! cache, and the request budget are run-global: building the engine once
//! here is what makes the budget cover the whole run. Per-source outcomes
//! are forwarded to the sink as they arrive; the metrics snapshot is
//! written exactly once at the end.

use crate::config::{Config, SourceConfig};
use crate::fetch::{FetchEngine, ResponseCache};
use crate::record::RunMetrics;
use crate::sink::{JsonlSink, NullSink, Sink};
use crate::source::Source;
use crate::Result;
use chrono::Utc;

/// Runs the whole pipeline against the configured output directory
///
/// A dry run exercises every fetch and parse but writes nothing.
pub async fn run_pipeline(
    config: &Config,
    sources: &[SourceConfig],
    dry_run: bool,
) -> Result<RunMetrics> {
    let mut sink: Box<dyn Sink> = if dry_run {
        Box::new(NullSink)
    } else {
        Box::new(JsonlSink::new(&config.output.dir)?)
    };
    run_with_sink(config, sources, dry_run, sink.as_mut()).await
}

/// Runs the pipeline against a caller-supplied sink
pub async fn run_with_sink(
    config: &Config,
    sources: &[SourceConfig],
    dry_run: bool,
    sink: &mut dyn Sink,
) -> Result<RunMetrics> {
    tracing::info!("starting scrape run over {} sources", sources.len());

    let cache = match &config.cache {
        Some(cache_config) => Some(ResponseCache::new(
            &cache_config.dir,
            cache_config.ttl_seconds,
        )?),
        None => None,
    };
    let mut engine = FetchEngine::new(&config.http, &config.crawl, cache)?;

    let mut total_records = 0;
    let mut total_verified = 0;
    let mut total_errors = 0;

    for source_config in sources {
        let source = Source::new(source_config.clone());
        tracing::info!("running source {}", source.name());

        let outcome = source.run(&mut engine).await;

        if !outcome.records.is_empty() {
            sink.write_raw(&outcome.records)?;
        }
        for error in &outcome.errors {
            tracing::error!("source error: {}", error);
        }

        total_records += outcome.records.len();
        total_verified += outcome.records.iter().filter(|r| r.verified).count();
        total_errors += outcome.errors.len();
    }

    let metrics = RunMetrics {
        run_at: Utc::now(),
        sources: sources.len(),
        records: total_records,
        verified_records: total_verified,
        errors: total_errors,
        dry_run,
    };
    sink.write_metrics(&metrics)?;

    tracing::info!(
        "completed scrape run: {} records ({} verified), {} errors, {} requests issued",
        metrics.records,
        metrics.verified_records,
        metrics.errors,
        engine.request_count()
    );

    Ok(metrics)
}

/// Maps run metrics to the process exit status
///
/// Any endpoint error anywhere fails the run.
pub fn exit_code(metrics: &RunMetrics) -> u8 {
    if metrics.errors > 0 {
        1
    } else {
        0
    }
}
