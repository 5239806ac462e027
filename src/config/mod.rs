//! Configuration handling module
//!
//! This module loads the TOML configuration file that describes HTTP
//! behavior, crawl etiquette, caching, output location, and the set of
//! sources to scrape. Loading always runs the validation pass.

mod parser;
mod types;
mod validation;

pub use parser::{load_config, select_sources};
pub use types::{
    CacheConfig, Config, CrawlConfig, HttpConfig, OutputConfig, SourceConfig, SourceEndpoint,
    SourceType,
};
pub use validation::validate;
