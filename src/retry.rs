// Bounded retry with exponential backoff and a per-attempt timeout.
// Used for the invoice generation side effect; never for the primary transition.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::GenerationConfig;
use crate::shutdown::ShutdownSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(1000),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&GenerationConfig> for RetryPolicy {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_backoff: Duration::from_millis(config.base_backoff_ms),
            attempt_timeout: Duration::from_secs(config.attempt_timeout_seconds),
        }
    }
}

impl RetryPolicy {
    /// Wait inserted after a failed 1-based `attempt`: `base_backoff * 2^attempt`
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_backoff.saturating_mul(factor)
    }
}

/// Result of a single attempt
#[derive(Debug)]
pub enum AttemptOutcome<T, E> {
    Ok(T),
    TimedOut(Duration),
    Err(E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStatus {
    Pending,
    Success,
    Failure,
}

/// In-memory record of one try. Discarded with the run that produced it.
#[derive(Debug, Clone)]
pub struct GenerationAttempt {
    pub attempt_number: u32,
    pub started_at: DateTime<Utc>,
    pub outcome: AttemptStatus,
    pub timed_out: bool,
    pub backoff_before_next: Option<Duration>,
}

impl GenerationAttempt {
    fn start(attempt_number: u32) -> Self {
        Self {
            attempt_number,
            started_at: Utc::now(),
            outcome: AttemptStatus::Pending,
            timed_out: false,
            backoff_before_next: None,
        }
    }

    pub fn backoff_before_next_ms(&self) -> u64 {
        self.backoff_before_next
            .map(|backoff| backoff.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Why a single attempt did not produce a value
#[derive(Debug, Error)]
pub enum AttemptFailure<E> {
    #[error("timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),
    #[error("{0}")]
    Failed(E),
}

#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("all {attempts} attempts failed, last: {last}")]
    Exhausted { attempts: u32, last: AttemptFailure<E> },
    #[error("cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

/// Terminal result of a retry loop together with every attempt it made
#[derive(Debug)]
pub struct RetryRun<T, E> {
    pub result: Result<T, RetryError<E>>,
    pub attempts: Vec<GenerationAttempt>,
}

impl<T, E> RetryRun<T, E> {
    pub fn attempt_count(&self) -> u32 {
        self.attempts.len() as u32
    }
}

/// Run one attempt under `limit`. Dropping the timed-out future cancels the call.
pub async fn run_attempt<Fut, T, E>(limit: Duration, attempt: Fut) -> AttemptOutcome<T, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, attempt).await {
        Ok(Ok(value)) => AttemptOutcome::Ok(value),
        Ok(Err(error)) => AttemptOutcome::Err(error),
        Err(_) => AttemptOutcome::TimedOut(limit),
    }
}

/// Call `operation` with the 1-based attempt number until it succeeds or the
/// policy runs out of attempts. Attempts are strictly sequential.
pub async fn retry_with_backoff<F, Fut, T, E>(
    policy: &RetryPolicy,
    shutdown: &mut ShutdownSignal,
    mut operation: F,
) -> RetryRun<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = Vec::with_capacity(max_attempts as usize);
    let mut attempt_number = 1;

    loop {
        if shutdown.is_triggered() {
            return RetryRun {
                result: Err(RetryError::Cancelled {
                    attempts: attempt_number - 1,
                }),
                attempts,
            };
        }

        let mut record = GenerationAttempt::start(attempt_number);
        debug!(attempt = attempt_number, max_attempts, "Starting attempt");

        let outcome = tokio::select! {
            biased;
            _ = shutdown.triggered() => None,
            outcome = run_attempt(policy.attempt_timeout, operation(attempt_number)) => Some(outcome),
        };

        let failure = match outcome {
            None => {
                warn!(attempt = attempt_number, "Attempt interrupted by shutdown");
                record.outcome = AttemptStatus::Failure;
                attempts.push(record);
                return RetryRun {
                    result: Err(RetryError::Cancelled {
                        attempts: attempt_number,
                    }),
                    attempts,
                };
            }
            Some(AttemptOutcome::Ok(value)) => {
                debug!(attempt = attempt_number, "Attempt succeeded");
                record.outcome = AttemptStatus::Success;
                attempts.push(record);
                return RetryRun {
                    result: Ok(value),
                    attempts,
                };
            }
            Some(AttemptOutcome::TimedOut(limit)) => {
                warn!(
                    attempt = attempt_number,
                    timeout_ms = limit.as_millis() as u64,
                    "Attempt timed out and was aborted"
                );
                record.timed_out = true;
                AttemptFailure::TimedOut(limit)
            }
            Some(AttemptOutcome::Err(error)) => {
                warn!(attempt = attempt_number, error = %error, "Attempt failed");
                AttemptFailure::Failed(error)
            }
        };

        record.outcome = AttemptStatus::Failure;

        if attempt_number >= max_attempts {
            attempts.push(record);
            return RetryRun {
                result: Err(RetryError::Exhausted {
                    attempts: attempt_number,
                    last: failure,
                }),
                attempts,
            };
        }

        let backoff = policy.backoff_after(attempt_number);
        record.backoff_before_next = Some(backoff);
        attempts.push(record);

        debug!(
            attempt = attempt_number,
            backoff_ms = backoff.as_millis() as u64,
            "Backing off before next attempt"
        );

        tokio::select! {
            biased;
            _ = shutdown.triggered() => {
                warn!(attempt = attempt_number, "Backoff interrupted by shutdown");
                return RetryRun {
                    result: Err(RetryError::Cancelled { attempts: attempt_number }),
                    attempts,
                };
            }
            _ = tokio::time::sleep(backoff) => {}
        }

        attempt_number += 1;
    }
}
