//! Typed retry and a consecutive-failure circuit breaker.
//!
//! Auth and bad-request failures are never retried. Rate limits honour
//! `Retry-After` when present; other transient failures back off linearly
//! with a per-class multiplier.

use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::error::{LlmError, Result};

/// Retry policy for a single logical request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Unit multiplied by the per-class factor and the attempt number
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Policy that never sleeps (tests, or callers that own backoff).
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff_unit: Duration::ZERO,
        }
    }

    fn delay_for(&self, error: &LlmError, attempt: u32) -> Duration {
        let factor = match error {
            LlmError::RateLimited {
                retry_after: Some(after),
            } => return *after,
            LlmError::RateLimited { retry_after: None } => 5,
            LlmError::Network(_) => 5,
            LlmError::Server { .. } => 2,
            _ => 3,
        };
        self.backoff_unit * factor * (attempt + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct BreakerInner {
    failures: u32,
    opened_at: Option<Instant>,
}

/// Opens after `failure_threshold` consecutive failures, lets one trial call
/// through once `cooldown` has elapsed.
#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    cooldown: Duration,
    inner: Mutex<BreakerInner>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(4, Duration::from_secs(60))
    }
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            cooldown,
            inner: Mutex::new(BreakerInner {
                failures: 0,
                opened_at: None,
            }),
        }
    }

    pub fn state(&self) -> CircuitState {
        let inner = self.inner.lock().unwrap();
        match inner.opened_at {
            None => CircuitState::Closed,
            Some(at) if at.elapsed() >= self.cooldown => CircuitState::HalfOpen,
            Some(_) => CircuitState::Open,
        }
    }

    pub fn allow_request(&self) -> bool {
        self.state() != CircuitState::Open
    }

    pub fn failures(&self) -> u32 {
        self.inner.lock().unwrap().failures
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.failures = 0;
        inner.opened_at = None;
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.failures += 1;
        if inner.failures >= self.failure_threshold {
            inner.opened_at = Some(Instant::now());
        }
    }

    /// Close the breaker by hand, e.g. before a new pipeline stage.
    pub fn reset(&self) {
        self.record_success();
    }
}

/// Run `op` under `policy`, consulting and updating `breaker`.
pub async fn call_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    breaker: &CircuitBreaker,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if !breaker.allow_request() {
        return Err(LlmError::CircuitOpen {
            failures: breaker.failures(),
        });
    }

    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => {
                breaker.record_success();
                return Ok(value);
            }
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                let delay = policy.delay_for(&err, attempt);
                warn!(
                    error = %err,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "LLM call failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                breaker.record_failure();
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let breaker = CircuitBreaker::default();
        let calls = AtomicU32::new(0);

        let result = call_with_retry(&RetryPolicy::immediate(3), &breaker, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(LlmError::Server {
                        status: 503,
                        message: "busy".into(),
                    })
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(breaker.failures(), 0);
    }

    #[tokio::test]
    async fn test_auth_is_not_retried() {
        let breaker = CircuitBreaker::default();
        let calls = AtomicU32::new(0);

        let result: Result<()> = call_with_retry(&RetryPolicy::immediate(3), &breaker, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(LlmError::Auth("invalid key".into())) }
        })
        .await;

        assert!(result.unwrap_err().is_auth());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(breaker.failures(), 1);
    }

    #[tokio::test]
    async fn test_breaker_opens_and_short_circuits() {
        let breaker = CircuitBreaker::new(2, Duration::from_secs(600));
        let policy = RetryPolicy::immediate(0);

        for _ in 0..2 {
            let _: Result<()> = call_with_retry(&policy, &breaker, || async {
                Err(LlmError::Network("down".into()))
            })
            .await;
        }
        assert_eq!(breaker.state(), CircuitState::Open);

        let calls = AtomicU32::new(0);
        let result: Result<()> = call_with_retry(&policy, &breaker, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;
        assert!(matches!(result, Err(LlmError::CircuitOpen { failures: 2 })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        breaker.reset();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_after_cooldown() {
        let breaker = CircuitBreaker::new(1, Duration::ZERO);
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        assert!(breaker.allow_request());
    }

    #[test]
    fn test_retry_after_is_honoured() {
        let policy = RetryPolicy::default();
        let delay = policy.delay_for(
            &LlmError::RateLimited {
                retry_after: Some(Duration::from_secs(7)),
            },
            2,
        );
        assert_eq!(delay, Duration::from_secs(7));
        let delay = policy.delay_for(
            &LlmError::Server {
                status: 500,
                message: String::new(),
            },
            1,
        );
        assert_eq!(delay, Duration::from_secs(4));
    }
}
