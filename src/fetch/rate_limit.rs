//! Per-host request pacing
//!
//! Requests to the same host are spaced at least `60 / rate` seconds apart.
//! Hosts never interfere with each other's pacing state, and the clock is
//! monotonic so wall-clock adjustments cannot skew the spacing.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Paces outbound requests per remote host
///
/// State is owned by the instance; build one per run and share it through
/// the fetch engine. The first request to a host never waits.
#[derive(Debug)]
pub struct RateLimiter {
    rate_per_minute: i64,
    next_allowed: HashMap<String, Instant>,
}

impl RateLimiter {
    /// Creates a limiter allowing `rate_per_minute` requests per host
    ///
    /// A rate of zero or less disables pacing entirely.
    pub fn new(rate_per_minute: i64) -> Self {
        Self {
            rate_per_minute,
            next_allowed: HashMap::new(),
        }
    }

    /// Minimum spacing between requests to one host, if pacing is enabled
    fn min_interval(&self) -> Option<Duration> {
        if self.rate_per_minute <= 0 {
            return None;
        }
        Some(Duration::from_secs_f64(60.0 / self.rate_per_minute as f64))
    }

    /// Suspends the caller until a request to `host` is permissible, then
    /// reserves the next slot
    ///
    /// The reservation advances `next_allowed` to
    /// `max(now, previous_next_allowed) + min_interval`, so the per-host
    /// schedule is monotonically non-decreasing even under slow callers.
    pub async fn wait(&mut self, host: &str) {
        let Some(interval) = self.min_interval() else {
            return;
        };

        let now = Instant::now();
        let scheduled = self.next_allowed.get(host).copied().unwrap_or(now);

        if scheduled > now {
            tracing::trace!(
                "pacing request to {} for {:?}",
                host,
                scheduled - now
            );
            tokio::time::sleep(scheduled - now).await;
        }

        let next = scheduled.max(Instant::now()) + interval;
        self.next_allowed.insert(host.to_string(), next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_limiter_never_waits() {
        let mut limiter = RateLimiter::new(0);

        let start = Instant::now();
        for _ in 0..10 {
            limiter.wait("example.com").await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_first_request_never_waits() {
        // 60 per minute gives a 1s interval; the first call must not use it
        let mut limiter = RateLimiter::new(60);

        let start = Instant::now();
        limiter.wait("example.com").await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_same_host_requests_are_spaced() {
        // 600 per minute gives a 100ms interval
        let mut limiter = RateLimiter::new(600);

        let start = Instant::now();
        limiter.wait("example.com").await;
        limiter.wait("example.com").await;
        limiter.wait("example.com").await;

        // Third call waits out two full intervals
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_different_hosts_do_not_serialize() {
        // 60 per minute gives a 1s interval; two hosts back to back must
        // finish well inside one interval
        let mut limiter = RateLimiter::new(60);

        let start = Instant::now();
        limiter.wait("a.example.com").await;
        limiter.wait("b.example.com").await;
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
