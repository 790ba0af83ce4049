//! Resilience policy: rate limiting composed with retry.
//!
//! The policy is `retry(rate_limited(attempt))`: every physical attempt,
//! retries included, must pass the shared limiter, and a local rejection is
//! final for the logical request.

use futures::future::{self, Either, Ready};
use polyrest_types::{ApiError, PolyrestError, Result};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;
use crate::transport::RawResponse;

/// Rate limiting and retry applied to every request of a client.
///
/// Clones share one limiter, so the budget holds across all concurrent
/// operations of the same client.
#[derive(Debug, Clone)]
pub struct ResiliencePolicy {
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl ResiliencePolicy {
    /// Creates a policy from its parts.
    #[must_use]
    pub const fn new(limiter: Arc<RateLimiter>, retry: RetryPolicy) -> Self {
        Self { limiter, retry }
    }

    /// Creates a policy from client configuration.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            Arc::new(RateLimiter::new(
                config.rate_limit_count,
                config.rate_limit_window(),
            )),
            RetryPolicy::new(config.max_retry_attempts),
        )
    }

    /// Returns the shared limiter.
    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Executes one logical request under the policy.
    ///
    /// # Errors
    ///
    /// Returns [`PolyrestError::RateLimited`] when the local budget is
    /// exhausted, [`PolyrestError::Cancelled`] on cancellation, or the error of
    /// the final attempt.
    pub async fn execute<F, Fut>(&self, cancel: &CancellationToken, attempt: F) -> Result<RawResponse>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<RawResponse>>,
    {
        self.retry
            .run(cancel, rate_limited(&self.limiter, attempt))
            .await
    }
}

/// Gates each invocation of `attempt` on `limiter`.
///
/// A rejected invocation resolves immediately to [`PolyrestError::RateLimited`]
/// without calling `attempt`.
pub fn rate_limited<F, Fut>(
    limiter: &RateLimiter,
    mut attempt: F,
) -> impl FnMut() -> Either<Ready<Result<RawResponse>>, Fut>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<RawResponse>>,
{
    move || match limiter.try_acquire() {
        Ok(()) => Either::Right(attempt()),
        Err(retry_after) => {
            tracing::warn!(
                capacity = limiter.capacity(),
                window_ms = u64::try_from(limiter.window().as_millis()).unwrap_or(u64::MAX),
                retry_after_ms = u64::try_from(retry_after.as_millis()).unwrap_or(u64::MAX),
                "Local rate limit reached, rejecting request"
            );
            Either::Left(future::ready(Err(PolyrestError::RateLimited(
                ApiError::rate_limited(Some(retry_after)),
            ))))
        }
    }
}
