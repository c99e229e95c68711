//! Per-source request pacing.
//!
//! One limiter is created per external source and shared (cheap clone) by
//! every caller of that source, so concurrent callers still respect the
//! source's global rate.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Shared minimum-interval limiter for one external source.
#[derive(Clone)]
pub struct SourceLimiter {
    name: &'static str,
    interval: Duration,
    limiter: Arc<DirectRateLimiter>,
}

impl SourceLimiter {
    /// Allow one request per `interval`, no bursting.
    ///
    /// A zero interval disables pacing.
    pub fn min_interval(name: &'static str, interval: Duration) -> Self {
        let quota = Quota::with_period(interval)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MAX));
        Self {
            name,
            interval,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// No pacing at all (tests, local mirrors).
    pub fn unlimited(name: &'static str) -> Self {
        Self::min_interval(name, Duration::ZERO)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the next request to this source is allowed.
    pub async fn until_ready(&self) {
        self.limiter.until_ready().await;
    }
}

impl std::fmt::Debug for SourceLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceLimiter")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_min_interval_spaces_requests() {
        let limiter = SourceLimiter::min_interval("test", Duration::from_millis(200));
        let start = Instant::now();

        for _ in 0..3 {
            limiter.until_ready().await;
        }

        // first permit is immediate, the next two wait one interval each
        assert!(
            start.elapsed() >= Duration::from_millis(350),
            "Rate limiting not working: {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_clones_share_budget() {
        let limiter = SourceLimiter::min_interval("shared", Duration::from_millis(200));
        let other = limiter.clone();
        let start = Instant::now();

        limiter.until_ready().await;
        other.until_ready().await;

        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_unlimited_does_not_wait() {
        let limiter = SourceLimiter::unlimited("free");
        let start = Instant::now();
        for _ in 0..50 {
            limiter.until_ready().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
