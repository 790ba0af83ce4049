//! Retry with linear backoff.
//!
//! Only throttling (HTTP 429) and timeouts are retried. Everything else,
//! including local rate-limit rejections, is returned to the caller as is.

use polyrest_types::{PolyrestError, Result};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::transport::RawResponse;

/// Base delay between attempts; attempt `n` waits `n` times this.
pub const BASE_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Retry policy for one logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

impl RetryPolicy {
    /// Creates a policy allowing `max_retries` retries after the first attempt.
    #[must_use]
    pub const fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: BASE_RETRY_DELAY,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(0)
    }

    /// Overrides the base delay.
    #[must_use]
    pub const fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Returns the maximum number of retries.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the delay before retry number `retry` (1-based).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(retry)
    }

    /// Returns true if `outcome` warrants another attempt.
    #[must_use]
    pub fn should_retry(outcome: &Result<RawResponse>) -> bool {
        match outcome {
            Ok(response) => response.is_rate_limited(),
            Err(err) => matches!(err, PolyrestError::Timeout { .. }),
        }
    }

    /// Runs `attempt` until it succeeds, fails permanently or retries run out.
    ///
    /// The last outcome is returned unchanged, so a final 429 comes back as a
    /// response for the caller to classify.
    ///
    /// # Errors
    ///
    /// Returns [`PolyrestError::Cancelled`] if `cancel` fires before an attempt
    /// or during a backoff sleep, otherwise the error of the last attempt.
    pub async fn run<F, Fut>(&self, cancel: &CancellationToken, mut attempt: F) -> Result<RawResponse>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<RawResponse>>,
    {
        let mut retries = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(PolyrestError::Cancelled);
            }

            let outcome = attempt().await;
            if retries >= self.max_retries || !Self::should_retry(&outcome) {
                return outcome;
            }

            retries += 1;
            let delay = self.delay_for(retries);
            tracing::debug!(
                retry = retries,
                max_retries = self.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                reason = outcome_reason(&outcome),
                "Retrying request"
            );

            tokio::select! {
                () = cancel.cancelled() => return Err(PolyrestError::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
        }
    }
}

fn outcome_reason(outcome: &Result<RawResponse>) -> &'static str {
    match outcome {
        Ok(_) => "throttled",
        Err(_) => "timeout",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TOO_MANY_REQUESTS;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn throttled() -> Result<RawResponse> {
        Ok(RawResponse::new(TOO_MANY_REQUESTS, "{}"))
    }

    #[test]
    fn test_linear_delays() {
        let policy = RetryPolicy::new(3);
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for(3), Duration::from_millis(600));
    }

    #[test]
    fn test_retryable_outcomes() {
        assert!(RetryPolicy::should_retry(&throttled()));
        assert!(RetryPolicy::should_retry(&Err(PolyrestError::Timeout {
            timeout: Duration::from_secs(30)
        })));
        assert!(!RetryPolicy::should_retry(&Ok(RawResponse::new(500, ""))));
        assert!(!RetryPolicy::should_retry(&Err(PolyrestError::Transport(
            "reset".to_string()
        ))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_throttling_exhausts_retries() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let outcome = RetryPolicy::new(3)
            .run(&CancellationToken::new(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { throttled() }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(outcome.unwrap().status, TOO_MANY_REQUESTS);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(200 + 400 + 600), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(1300), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_throttling() {
        let calls = AtomicU32::new(0);
        let outcome = RetryPolicy::new(3)
            .run(&CancellationToken::new(), || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        throttled()
                    } else {
                        Ok(RawResponse::new(200, "{}"))
                    }
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(outcome.unwrap().status, 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_failures_not_retried() {
        let calls = AtomicU32::new(0);
        let outcome = RetryPolicy::new(3)
            .run(&CancellationToken::new(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(PolyrestError::Transport("connection refused".to_string())) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(outcome, Err(PolyrestError::Transport(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let cancel = CancellationToken::new();
        let calls = AtomicU32::new(0);
        let trigger = cancel.clone();

        let outcome = RetryPolicy::new(3)
            .run(&cancel, || {
                calls.fetch_add(1, Ordering::SeqCst);
                trigger.cancel();
                async { throttled() }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(outcome, Err(PolyrestError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = RetryPolicy::disabled()
            .run(&cancel, || async { Ok(RawResponse::new(200, "")) })
            .await;
        assert!(matches!(outcome, Err(PolyrestError::Cancelled)));
    }
}
