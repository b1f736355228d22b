//! Retry with exponential backoff
//!
//! An explicit loop over an async operation: the first attempt plus up to
//! `max_retries` retries, sleeping `base_delay * 2^attempt` between them.
//! The last error is handed back to the caller once retries are exhausted.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::config::ScrapingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_scraping_config(&ScrapingConfig::default())
    }
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub const fn from_scraping_config(config: &ScrapingConfig) -> Self {
        Self::new(config.max_retries, Duration::from_millis(config.retry_base_delay_ms))
    }

    /// Single attempt, no backoff
    pub const fn no_retry() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before retry number `attempt + 1`
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2_u32.saturating_pow(attempt))
    }

    /// Run `operation` until it succeeds or retries are exhausted
    ///
    /// The closure receives the zero-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, key: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 0;
        loop {
            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 0 {
                        info!("✅ {} succeeded after {} retries", key, attempt);
                    }
                    return Ok(value);
                }
                Err(e) if attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    warn!(
                        "🔄 {} failed (attempt {}/{}): {}; retrying in {:?}",
                        key,
                        attempt + 1,
                        self.max_retries + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!("❌ {} exhausted {} retries", key, self.max_retries);
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
    }

    #[test]
    fn test_default_policy_follows_scraping_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_always_failing_operation_runs_max_retries_plus_one() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let result: Result<(), String> = policy
            .run("X1", |_| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("boom".to_string())
                }
            })
            .await;

        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_recovers_on_later_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let result: Result<u32, String> = policy
            .run("X1", |attempt| async move {
                if attempt < 2 { Err(format!("fail {attempt}")) } else { Ok(attempt) }
            })
            .await;
        assert_eq!(result.unwrap(), 2);
    }

    #[test]
    fn test_no_retry_runs_once() {
        let calls = AtomicU32::new(0);
        let result: Result<(), &str> = tokio_test::block_on(RetryPolicy::no_retry().run("X1", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("nope") }
        }));
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
