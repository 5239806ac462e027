//! Robots.txt compliance module
//!
//! This module fetches and caches per-host robots.txt rulesets and answers
//! permission checks against them. Rulesets are cached for the process
//! lifetime and never re-fetched within a run. When a host's robots.txt
//! cannot be obtained (network failure or status >= 400) the host fails
//! open: everything on it is allowed for the remainder of the run.

mod rules;

pub use rules::RobotsRules;

use crate::fetch::host_key;
use reqwest::Client;
use std::collections::HashMap;
use url::Url;

/// Per-host crawl-permission cache
///
/// One instance is owned by the fetch engine for the duration of a run.
pub struct RobotsPolicy {
    user_agent: String,
    rules: HashMap<String, RobotsRules>,
}

impl RobotsPolicy {
    /// Creates an empty policy evaluating against `user_agent`
    pub fn new(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            rules: HashMap::new(),
        }
    }

    /// Checks whether `url` may be fetched
    ///
    /// URLs without a host are always allowed. The first check for a host
    /// fetches its robots.txt through `client` (which carries the configured
    /// timeout and User-Agent); every later check for the same host reuses
    /// the cached ruleset.
    pub async fn allowed(&mut self, client: &Client, url: &Url) -> bool {
        let Some(host) = host_key(url) else {
            return true;
        };

        if !self.rules.contains_key(&host) {
            let rules = fetch_rules(client, url.scheme(), &host).await;
            self.rules.insert(host.clone(), rules);
        }

        self.rules[&host].is_allowed(url.as_str(), &self.user_agent)
    }

    /// Number of hosts with a cached ruleset
    pub fn cached_hosts(&self) -> usize {
        self.rules.len()
    }
}

/// Fetches and parses robots.txt for a host, failing open on any error
async fn fetch_rules(client: &Client, scheme: &str, host: &str) -> RobotsRules {
    let robots_url = format!("{}://{}/robots.txt", scheme, host);

    match client.get(&robots_url).send().await {
        Ok(response) if response.status().as_u16() < 400 => match response.text().await {
            Ok(body) => RobotsRules::from_content(&body),
            Err(e) => {
                tracing::warn!("failed to read robots.txt body for {}: {}", host, e);
                RobotsRules::allow_all()
            }
        },
        Ok(response) => {
            tracing::warn!(
                "robots.txt fetch for {} returned {}, allowing all",
                host,
                response.status()
            );
            RobotsRules::allow_all()
        }
        Err(e) => {
            tracing::warn!("robots.txt fetch error for {}, allowing all: {}", host, e);
            RobotsRules::allow_all()
        }
    }
}
