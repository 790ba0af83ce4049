//! Client-side sliding-window rate limiter.
//!
//! The limiter admits at most `capacity` requests in any window of length
//! `window`. It never queues: a request that would exceed the budget is
//! rejected immediately with the time until the oldest admission expires.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Sliding-window request limiter shared by all clones of a client.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: u32,
    window: Duration,
    admitted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter admitting `capacity` requests per `window`.
    #[must_use]
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity,
            window,
            admitted: Mutex::new(VecDeque::with_capacity(capacity as usize)),
        }
    }

    /// Returns the configured capacity.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Returns the configured window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Tries to admit one request.
    ///
    /// # Errors
    ///
    /// Returns how long to wait before a slot frees up when the window is full.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        let now = Instant::now();
        let mut admitted = self.admitted.lock().unwrap_or_else(PoisonError::into_inner);
        self.evict_expired(&mut admitted, now);

        if admitted.len() < self.capacity as usize {
            admitted.push_back(now);
            return Ok(());
        }

        let wait = admitted
            .front()
            .map_or(self.window, |oldest| {
                self.window.saturating_sub(now.duration_since(*oldest))
            });
        Err(wait)
    }

    /// Returns how many requests would be admitted right now.
    #[must_use]
    pub fn available(&self) -> u32 {
        let mut admitted = self.admitted.lock().unwrap_or_else(PoisonError::into_inner);
        self.evict_expired(&mut admitted, Instant::now());
        let used = u32::try_from(admitted.len()).unwrap_or(u32::MAX);
        self.capacity.saturating_sub(used)
    }

    fn evict_expired(&self, admitted: &mut VecDeque<Instant>, now: Instant) {
        while admitted
            .front()
            .is_some_and(|oldest| now.duration_since(*oldest) >= self.window)
        {
            admitted.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_admits_up_to_capacity() {
        let limiter = RateLimiter::new(3, Duration::from_secs(1));
        for _ in 0..3 {
            assert!(limiter.try_acquire().is_ok());
        }
        assert_eq!(limiter.available(), 0);
        assert_eq!(limiter.try_acquire(), Err(Duration::from_secs(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_slides() {
        let limiter = RateLimiter::new(2, Duration::from_secs(1));
        limiter.try_acquire().unwrap();
        tokio::time::advance(Duration::from_millis(600)).await;
        limiter.try_acquire().unwrap();

        assert_eq!(limiter.try_acquire(), Err(Duration::from_millis(400)));

        tokio::time::advance(Duration::from_millis(400)).await;
        assert_eq!(limiter.available(), 1);
        assert!(limiter.try_acquire().is_ok());
        assert!(limiter.try_acquire().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejections_do_not_consume_budget() {
        let limiter = RateLimiter::new(1, Duration::from_secs(1));
        limiter.try_acquire().unwrap();
        for _ in 0..10 {
            assert!(limiter.try_acquire().is_err());
        }
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(limiter.try_acquire().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_across_tasks() {
        let limiter = Arc::new(RateLimiter::new(5, Duration::from_secs(60)));
        let handles: Vec<_> = (0..20)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.try_acquire().is_ok() })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 5);
    }
}
