//! Sequential retry with linear backoff

use crate::errors::GenerationError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Delay before the first retry; each further retry waits one more unit
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Linear backoff policy: wait `base_delay * (attempt + 1)` after a retryable failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: crate::types::DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Total attempts including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Wait after the failed attempt numbered `attempt` (zero-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt.saturating_add(1))
    }

    /// Run `operation` until it succeeds, fails terminally or the budget runs out.
    ///
    /// The closure receives the zero-based attempt number. Backoff is an async
    /// sleep on the caller's task, so dropping the returned future cancels any
    /// pending attempt or wait.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, GenerationError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        let mut attempt: u32 = 0;
        let mut last_error: Option<GenerationError> = None;

        while attempt < self.max_attempts() {
            debug!("Attempt {}/{}", attempt + 1, self.max_attempts());

            let error = match operation(attempt).await {
                Ok(value) => {
                    debug!("Attempt {} succeeded", attempt + 1);
                    return Ok(value);
                }
                Err(e) => e,
            };

            if !error.is_retryable() {
                warn!("Attempt {} failed, not retrying: {}", attempt + 1, error);
                return Err(error);
            }

            warn!("Attempt {} failed: {}", attempt + 1, error);
            last_error = Some(error);

            if attempt + 1 < self.max_attempts() {
                let delay = self.delay_for(attempt);
                debug!("Retrying in {}ms", delay.as_millis());
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }

        Err(last_error.unwrap_or_else(|| {
            GenerationError::Configuration("Retry policy allowed no attempts".to_string())
        }))
    }
}
