//! Output sink module
//!
//! Sinks receive normalized records (possibly many times per run) and the
//! run metrics (exactly once, at run end). Record writes are append-only:
//! a partial failure never loses records already written, and re-running a
//! crawl appends additional entries rather than conflicting ones.

mod jsonl;
mod traits;

pub use jsonl::{JsonlSink, NullSink};
pub use traits::{Sink, SinkError, SinkResult};
