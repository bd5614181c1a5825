//! Retry wrapper for OpenAI calls
//!
//! One extra attempt by default. Rate-limited calls wait longer than other
//! transient failures before retrying.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use dailygym_core::constants::{DEFAULT_MAX_RETRIES, RATE_LIMIT_DELAY_MS, RETRY_DELAY_MS};

use crate::error::Result;

#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub rate_limit_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
            rate_limit_delay: Duration::from_millis(RATE_LIMIT_DELAY_MS),
        }
    }
}

/// Run `operation`, retrying on rate limits and server errors up to
/// `config.max_retries` extra attempts. Non-retryable errors return
/// immediately.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !e.is_retryable() || attempt >= config.max_retries {
                    return Err(e);
                }
                let delay = if e.is_rate_limited() {
                    config.rate_limit_delay
                } else {
                    config.retry_delay
                };
                attempt += 1;
                debug!(
                    "Retry attempt {}/{} after {}ms: {e}",
                    attempt,
                    config.max_retries,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
