//! Bounded retry with exponential backoff
//!
//! The policy is a plain value handed to whoever calls a generator; the
//! generators themselves never loop.

use crate::config::RetryConfig;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Attempts and delays for one retried operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    /// Create policy; at least one attempt is always made
    #[must_use]
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff: max_backoff.max(initial_backoff),
        }
    }

    /// Single attempt, no retries
    #[must_use]
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Attempts including the first
    #[inline]
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after failed attempt `attempt` (1-based), doubling up to the cap
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `operation` until it succeeds, fails permanently or the budget runs out
    ///
    /// Returns the final error together with the number of attempts made.
    ///
    /// # Errors
    /// Returns the last error when no attempt succeeded
    pub async fn run<T, E, F, Fut>(
        &self,
        mut operation: F,
        is_transient: impl Fn(&E) -> bool,
    ) -> Result<T, (E, u32)>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts && is_transient(&err) => {
                    let delay = self.backoff(attempt);
                    warn!(attempt, ?delay, error = %err, "Attempt failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err((err, attempt)),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.initial_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::ZERO, Duration::ZERO)
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100), Duration::from_millis(350));
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(350));
        assert_eq!(policy.backoff(40), Duration::from_millis(350));
    }

    #[test]
    fn defaults_from_config() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(RetryPolicy::new(0, Duration::ZERO, Duration::ZERO).max_attempts(), 1);
    }

    #[tokio::test]
    async fn retries_transient_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, (String, u32)> = fast(3)
            .run(
                |attempt| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if attempt < 3 {
                            Err("flaky".to_string())
                        } else {
                            Ok(attempt)
                        }
                    }
                },
                |_| true,
            )
            .await;
        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_on_permanent_error() {
        let result: Result<(), (String, u32)> = fast(5)
            .run(|_| async { Err("denied".to_string()) }, |_| false)
            .await;
        assert_eq!(result, Err(("denied".to_string(), 1)));
    }

    #[tokio::test]
    async fn exhausts_budget() {
        let result: Result<(), (String, u32)> = fast(2)
            .run(|_| async { Err("down".to_string()) }, |_| true)
            .await;
        assert_eq!(result, Err(("down".to_string(), 2)));
    }

    proptest! {
        #[test]
        fn backoff_is_monotone_and_capped(initial in 0u64..1_000, cap in 0u64..10_000, attempt in 1u32..64) {
            let policy = RetryPolicy::new(3, Duration::from_millis(initial), Duration::from_millis(cap));
            prop_assert!(policy.backoff(attempt) <= policy.backoff(attempt + 1));
            prop_assert!(policy.backoff(attempt) <= Duration::from_millis(cap.max(initial)));
        }
    }
}
