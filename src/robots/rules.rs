//! Robots.txt ruleset evaluation
//!
//! Thin wrapper over the robotstxt crate's matcher, with an explicit
//! allow-all ruleset used when a host's robots.txt cannot be fetched.

use robotstxt::DefaultMatcher;

/// Crawl-permission ruleset for one host
#[derive(Debug, Clone)]
pub struct RobotsRules {
    /// Raw robots.txt content; empty means allow everything
    content: String,
}

impl RobotsRules {
    /// Builds a ruleset from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// A permissive ruleset that allows every URL
    ///
    /// Used as the fail-open default when robots.txt is unavailable.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
        }
    }

    /// Checks whether `url` is allowed for `user_agent`
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }
}
