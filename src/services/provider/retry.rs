//! Bounded retry with exponential backoff for RPC calls.
use crate::{
    constants::{DEFAULT_RPC_INITIAL_BACKOFF_MS, DEFAULT_RPC_RETRIES},
    models::RpcError,
};
use log::warn;
use std::{future::Future, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub retries: u32,
    /// Delay before the first retry; doubles on every further retry.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RPC_RETRIES,
            initial_backoff: Duration::from_millis(DEFAULT_RPC_INITIAL_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, initial_backoff: Duration) -> Self {
        Self {
            retries,
            initial_backoff,
        }
    }

    /// Delay slept before retry number `attempt` (zero based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or the retry budget is spent. The last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, RpcError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RpcError>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.retries => {
                    let delay = self.backoff_for(attempt);
                    attempt += 1;
                    warn!(
                        "{} failed with {} (attempt {}/{}), retrying in {:?}",
                        label,
                        err.class(),
                        attempt,
                        self.retries + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
