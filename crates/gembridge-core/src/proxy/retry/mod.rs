//! Bounded exponential-backoff retry executor.
//!
//! The operation decides per attempt whether its failure is worth another
//! try by returning `AttemptError::Retryable` or `AttemptError::Terminal`.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use gembridge_types::{GatewayError, ProviderError, RetryConfig};

/// Outcome of one failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError<E> {
    Retryable(E),
    Terminal(E),
}

/// Classify through `GatewayError::is_retryable`.
pub fn classify(err: GatewayError) -> AttemptError<GatewayError> {
    if err.is_retryable() {
        AttemptError::Retryable(err)
    } else {
        AttemptError::Terminal(err)
    }
}

impl From<GatewayError> for AttemptError<GatewayError> {
    fn from(err: GatewayError) -> Self {
        classify(err)
    }
}

impl From<ProviderError> for AttemptError<GatewayError> {
    fn from(err: ProviderError) -> Self {
        classify(err.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub enabled: bool,
    pub retries: u32,
    pub factor: f64,
    pub min_timeout: Duration,
    pub max_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            enabled: config.enabled,
            retries: config.retries,
            factor: config.factor,
            min_timeout: Duration::from_millis(config.min_timeout),
            max_timeout: Duration::from_millis(config.max_timeout),
        }
    }
}

impl RetryPolicy {
    /// Total attempts, first try included.
    pub fn max_attempts(&self) -> u32 {
        if self.enabled {
            self.retries.saturating_add(1)
        } else {
            1
        }
    }

    /// Delay before retry number `retry` (0 for the first retry).
    pub fn backoff(&self, retry: u32) -> Duration {
        let min_ms = self.min_timeout.as_millis() as f64;
        let max_ms = self.max_timeout.as_millis() as f64;
        let delay_ms = (min_ms * self.factor.powi(retry as i32)).min(max_ms).max(0.0);
        Duration::from_millis(delay_ms as u64)
    }
}

/// Run `operation(attempt)` (attempt numbers start at 1) until it succeeds,
/// fails terminally, or the policy's attempts are exhausted.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AttemptError<E>>>,
    E: Display,
{
    let max_attempts = policy.max_attempts();
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Terminal(e)) => {
                debug!("Attempt {} failed terminally: {}", attempt, e);
                return Err(e);
            },
            Err(AttemptError::Retryable(e)) => {
                if attempt >= max_attempts {
                    return Err(e);
                }
                let delay = policy.backoff(attempt - 1);
                warn!(
                    "Retry attempt {}/{}: {} (next in {}ms)",
                    attempt,
                    max_attempts - 1,
                    e,
                    delay.as_millis()
                );
                sleep(delay).await;
            },
        }
    }
}
