//! Exponential-backoff retry for callers of the engine.
//!
//! The engine never retries on its own. Callers that want retries wrap the
//! call, typically with [`retry_translation`], which only retries errors
//! where `TranslationError::is_retryable` holds.

use crate::error::TranslationError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Attempt budget and backoff bounds. The delay doubles after every failed
/// attempt, capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts including the first; 0 behaves as 1
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    /// Wait before retry number `retry` (1-based).
    fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Three attempts waiting 2s then 4s, enough for a typical 429 window.
impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
        }
    }
}

/// Run `operation` until it succeeds, `should_retry` rejects its error, or
/// the attempt budget is spent. The last error is returned.
pub async fn with_retry_if<T, E, F, Fut, P>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let budget = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if !should_retry(&error) {
            debug!("{}: not retrying: {}", operation_name, error);
            return Err(error);
        }
        if attempt >= budget {
            warn!(
                "{}: giving up after {} attempts: {}",
                operation_name, budget, error
            );
            return Err(error);
        }

        let wait = config.backoff(attempt);
        warn!(
            "{}: attempt {}/{} failed ({}), retrying in {:?}",
            operation_name, attempt, budget, error, wait
        );
        sleep(wait).await;
        attempt += 1;
    }
}

/// Retry a translation call on transient failures only.
pub async fn retry_translation<T, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    operation: F,
) -> Result<T, TranslationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TranslationError>>,
{
    with_retry_if(config, operation_name, operation, TranslationError::is_retryable).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig::new(max_attempts, Duration::from_millis(10))
    }

    fn unavailable(status: Option<u16>) -> TranslationError {
        TranslationError::ProviderUnavailable {
            provider: "openai".to_string(),
            status,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_default_budget() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.backoff(1), Duration::from_secs(2));
        assert_eq!(config.backoff(2), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let config = RetryConfig {
            max_delay: Duration::from_secs(3),
            ..RetryConfig::new(10, Duration::from_secs(1))
        };

        assert_eq!(config.backoff(1), Duration::from_secs(1));
        assert_eq!(config.backoff(2), Duration::from_secs(2));
        assert_eq!(config.backoff(3), Duration::from_secs(3));
        assert_eq!(config.backoff(40), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_with_retry_if_succeeds_after_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<u32, &str> = with_retry_if(
            &fast_config(3),
            "test",
            || {
                let c = counter_clone.clone();
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err("temporary failure")
                    } else {
                        Ok(42)
                    }
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_if_gives_up_after_max_attempts() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<u32, &str> = with_retry_if(
            &fast_config(3),
            "test",
            || {
                let c = counter_clone.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err("server error 500")
                }
            },
            |e: &&str| e.contains("500"),
        )
        .await;

        assert_eq!(result.unwrap_err(), "server error 500");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<u32, &str> = with_retry_if(
            &fast_config(0),
            "test",
            || {
                let c = counter_clone.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err("failure")
                }
            },
            |_| true,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    // ==================== Translation Error Retry Tests ====================

    #[tokio::test]
    async fn test_retry_translation_retries_rate_limit() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_translation(&fast_config(3), "translate", || {
            let c = counter_clone.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(unavailable(Some(429)))
                } else {
                    Ok("ok")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_translation_stops_on_client_error() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), _> = retry_translation(&fast_config(3), "translate", || {
            let c = counter_clone.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(unavailable(Some(401)))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_translation_never_retries_caller_errors() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), _> = retry_translation(&fast_config(3), "translate", || {
            let c = counter_clone.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(TranslationError::NoSourceText)
            }
        })
        .await;

        assert!(matches!(result, Err(TranslationError::NoSourceText)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
