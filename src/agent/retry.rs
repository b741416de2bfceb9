use crate::agent::types::AgentError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Bounded retry with exponential backoff for transient agent failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
    /// Spread delays by ±10%
    pub jitter: bool,
}

/// Final result of a guarded call and how many attempts it took
#[derive(Debug)]
pub struct RetryOutcome<T> {
    pub result: Result<T, AgentError>,
    pub attempts: u32,
}

impl RetryPolicy {
    /// Single attempt, no backoff
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Delay before the attempt following failed attempt number `attempt` (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16) as i32;
        let base = self.initial_backoff_ms as f64 * self.backoff_multiplier.max(1.0).powi(exponent);
        let base = base.min(self.max_backoff_ms as f64);

        let delay = if self.jitter {
            let jitter = (rand::random::<f64>() - 0.5) * 0.2;
            base * (1.0 + jitter)
        } else {
            base
        };

        Duration::from_millis(delay.max(0.0) as u64)
    }

    pub fn should_retry(&self, error: &AgentError, attempt: u32) -> bool {
        attempt < self.max_attempts.max(1) && error.is_retryable()
    }

    /// Run `operation` under a per-attempt timeout, retrying transient
    /// failures. Cancellation interrupts both the call and the backoff sleep.
    pub async fn execute<T, F, Fut, R>(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
        mut on_retry: R,
        mut operation: F,
    ) -> RetryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AgentError>>,
        R: FnMut(u32, &AgentError, Duration),
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(AgentError::Cancelled),
                outcome = tokio::time::timeout(timeout, operation()) => match outcome {
                    Ok(result) => result,
                    Err(_) => Err(AgentError::Timeout(timeout)),
                },
            };

            let error = match result {
                Ok(value) => {
                    return RetryOutcome {
                        result: Ok(value),
                        attempts: attempt,
                    };
                }
                Err(error) => error,
            };

            if !self.should_retry(&error, attempt) {
                return RetryOutcome {
                    result: Err(error),
                    attempts: attempt,
                };
            }

            let delay = self.delay_for_attempt(attempt);
            debug!("Attempt {} failed ({}), retrying in {:?}", attempt, error, delay);
            on_retry(attempt, &error, delay);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return RetryOutcome {
                        result: Err(AgentError::Cancelled),
                        attempts: attempt,
                    };
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            backoff_multiplier: 2.0,
            max_backoff_ms: 10_000,
            jitter: true,
        }
    }
}
