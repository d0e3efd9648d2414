//! Bounded-duration retry with exponential backoff.

use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::error::{Result, ServeError};

/// Retry configuration: how long to keep trying, how to back off, and which
/// errors are worth another attempt.
#[derive(Clone)]
pub struct RetryPolicy {
    /// Stop retrying once this much time has passed since the first attempt.
    pub max_elapsed: Duration,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Cap on any single delay.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub multiplier: f64,
    /// Errors for which this returns `false` are returned immediately.
    pub retry_if: fn(&ServeError) -> bool,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_elapsed", &self.max_elapsed)
            .field("initial_delay", &self.initial_delay)
            .field("max_delay", &self.max_delay)
            .field("multiplier", &self.multiplier)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    /// Policy for bringing the server up: retries transient errors for `max_elapsed`.
    pub fn startup(max_elapsed: Duration) -> Self {
        Self {
            max_elapsed,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            retry_if: ServeError::is_retryable,
        }
    }

    pub fn with_predicate(mut self, retry_if: fn(&ServeError) -> bool) -> Self {
        self.retry_if = retry_if;
        self
    }

    /// Calculate delay after a given (1-based) failed attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let base_delay = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::from_secs_f64(base_delay.min(self.max_delay.as_secs_f64()))
    }

    /// Run `f` until it succeeds, fails with a non-retryable error, or the
    /// time window closes. The last error is returned on give-up.
    pub async fn execute<F, Fut, T>(&self, mut f: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let started = Instant::now();
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let err = match f().await {
                Ok(result) => return Ok(result),
                Err(e) => e,
            };

            if !(self.retry_if)(&err) {
                return Err(err);
            }

            let elapsed = started.elapsed();
            if elapsed >= self.max_elapsed {
                tracing::warn!(
                    attempts = attempt,
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %err,
                    "Giving up after retry window elapsed"
                );
                return Err(err);
            }

            let delay = self
                .delay_for_attempt(attempt)
                .min(self.max_elapsed - elapsed);
            tracing::warn!(
                attempt = attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying after failure"
            );
            sleep(delay).await;
        }
    }
}
