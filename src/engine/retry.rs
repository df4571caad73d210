//! Bounded retry for writes that lost an optimistic-concurrency race.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::error::Error;

/// Exponential backoff for race-conflict retries.
///
/// Defaults: 5 retries, 10ms initial delay doubling up to 200ms.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(200),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder {
            policy: Self::default(),
        }
    }

    /// initial_delay * multiplier^attempt, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let exponent = u32::try_from(attempt).unwrap_or(u32::MAX);
        let factor = self.multiplier.saturating_pow(exponent);

        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicyBuilder {
    policy: RetryPolicy,
}

impl RetryPolicyBuilder {
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.policy.max_retries = max_retries;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.policy.initial_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.policy.max_delay = delay;
        self
    }

    pub fn multiplier(mut self, multiplier: u32) -> Self {
        self.policy.multiplier = multiplier;
        self
    }

    pub fn build(self) -> RetryPolicy {
        self.policy
    }
}

/// Runs `operation` until it stops failing with [`Error::RaceConflict`].
///
/// Every other outcome is returned as is. Once `max_retries` retries are spent the race
/// is surfaced as [`Error::Conflict`].
pub async fn retry_on_conflict<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Err(err) if err.is_race_conflict() => {
                if attempt >= policy.max_retries {
                    tracing::warn!(attempt, "write conflict persisted after max retries");
                    return Err(Error::Conflict);
                }

                let delay = policy.delay_for_attempt(attempt);
                tracing::debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "write conflict, retrying"
                );

                sleep(delay).await;
                attempt += 1;
            }
            result => {
                if attempt > 0 && result.is_ok() {
                    tracing::info!(attempt, "write succeeded after retry");
                }
                return result;
            }
        }
    }
}
