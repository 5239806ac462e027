//! Source running module
//!
//! A source is one configured remote site with a list of endpoints. Running
//! a source drives every endpoint through the fetch engine, applies the
//! source-type parser to each response, and collects records and error
//! strings. One endpoint's failure never aborts the others, and no error
//! escapes a source run.

mod parsers;
mod runner;

pub use parsers::{parser_for, HtmlParser, JsonParser, ParseError, RecordParser};
pub use runner::{Source, SourceOutcome};
