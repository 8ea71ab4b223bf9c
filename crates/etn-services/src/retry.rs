//! Bounded retry with exponential backoff
//!
//! The delay after failed attempt `n` is `base_delay * 2^(n-1)`. Nothing is slept
//! after the final attempt, so the default policy waits 1+2+4+8 = 15s at most.

use std::future::Future;
use std::time::Duration;

use etn_core::constants::{DEFAULT_MAX_UPLOAD_ATTEMPTS, DEFAULT_RETRY_BASE_DELAY_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; values below 1 behave as 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_UPLOAD_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay to wait after failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        self.base_delay
            .saturating_mul(2u32.checked_pow(exponent).unwrap_or(u32::MAX))
    }
}

/// Passed to the retry callback before each backoff sleep.
#[derive(Debug)]
pub struct RetryNotice<'a, E> {
    /// The attempt that just failed
    pub attempt: u32,
    pub delay: Duration,
    pub error: &'a E,
}

/// Run `operation` until it succeeds, fails with an error `should_retry` rejects, or
/// the policy runs out of attempts. The last error is returned on failure.
pub async fn with_retry<T, E, Op, Fut, S, N>(
    policy: &RetryPolicy,
    should_retry: S,
    mut on_retry: N,
    mut operation: Op,
) -> Result<T, E>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    S: Fn(&E) -> bool,
    N: FnMut(RetryNotice<'_, E>),
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= max_attempts || !should_retry(&error) {
                    return Err(error);
                }

                let delay = policy.delay_for(attempt);
                on_retry(RetryNotice {
                    attempt,
                    delay,
                    error: &error,
                });
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
