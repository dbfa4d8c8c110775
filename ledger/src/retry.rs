//! Bounded retry for storage writes.
//!
//! The store offers no transactions, so a mutation path that has already
//! applied changes in memory must not lose its write to a transient backend
//! hiccup. Writes in mutation paths go through [`put_with_retry`]: transient
//! failures back off exponentially up to a small bounded attempt count, and
//! exhaustion surfaces the final error to the caller instead of silently
//! dropping the record.

use std::time::Duration;
use tokio::time::sleep;
use turnstile_core::{KvError, KvStore, StorageKey};

/// Retry policy for storage writes.
#[derive(Debug, Clone)]
pub struct StoreRetry {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each retry after that.
    pub initial_delay: Duration,
    /// Cap on the backoff delay.
    pub max_delay: Duration,
}

impl Default for StoreRetry {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
        }
    }
}

impl StoreRetry {
    /// Backoff delay after the given zero-based failed attempt.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let doubled = self
            .initial_delay
            .checked_mul(2u32.saturating_pow(attempt))
            .unwrap_or(self.max_delay);
        doubled.min(self.max_delay)
    }
}

/// Write `value` under `key`, retrying transient failures with backoff.
///
/// Non-transient errors fail immediately; transient errors retry until the
/// policy's attempts are spent.
///
/// # Errors
///
/// Returns the last [`KvError`] once attempts are exhausted or a
/// non-transient error occurs.
pub async fn put_with_retry(
    store: &dyn KvStore,
    policy: &StoreRetry,
    key: StorageKey,
    value: Vec<u8>,
) -> Result<(), KvError> {
    let mut attempt = 0;
    loop {
        match store.put(key.clone(), value.clone()).await {
            Ok(()) => {
                if attempt > 0 {
                    tracing::info!(%key, attempt, "storage write succeeded after retry");
                }
                return Ok(());
            }
            Err(err) if err.is_transient() && attempt + 1 < policy.max_attempts => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    %key,
                    attempt,
                    delay_ms = delay.as_millis(),
                    error = %err,
                    "transient storage failure, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                tracing::error!(%key, attempt, error = %err, "storage write failed");
                return Err(err);
            }
        }
    }
}
