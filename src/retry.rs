//! Explicit retry policy for remote calls.
//!
//! Replaces ad-hoc retry loops scattered near UI state: one policy object
//! applied uniformly by the engine, with a caller-supplied fallback that
//! produces a degraded-but-usable value once attempts are exhausted.

use std::time::Duration;

/// Bounded retry with fixed backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts beyond the first call (2 retries = 3 calls total).
    pub max_retries: u32,
    /// Fixed delay between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_secs(2),
        }
    }
}

/// Outcome of a retried operation: either a real result or the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retried<T> {
    pub value: T,
    /// True when the value came from the fallback, not the operation.
    pub degraded: bool,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Run `op` up to `1 + max_retries` times, sleeping `backoff` between
    /// attempts. When every attempt fails, synthesize a value with
    /// `fallback` and mark the result degraded.
    pub async fn run_with_fallback<T, E, Op, Fut, Fb>(
        &self,
        label: &str,
        mut op: Op,
        fallback: Fb,
    ) -> Retried<T>
    where
        E: std::fmt::Display,
        Op: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        Fb: FnOnce() -> T,
    {
        let attempts = 1 + self.max_retries;
        for attempt in 1..=attempts {
            match op().await {
                Ok(value) => {
                    return Retried {
                        value,
                        degraded: false,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        "{label} attempt {attempt}/{attempts} failed: {e}"
                    );
                    if attempt < attempts {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }
        tracing::warn!("{label}: all attempts failed, using fallback");
        Retried {
            value: fallback(),
            degraded: true,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(2, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn first_attempt_success_is_not_degraded() {
        let result = fast_policy()
            .run_with_fallback("test", || async { Ok::<_, String>(42) }, || 0)
            .await;
        assert_eq!(result.value, 42);
        assert!(!result.degraded);
    }

    #[tokio::test]
    async fn succeeds_on_retry() {
        let calls = AtomicU32::new(0);
        let result = fast_policy()
            .run_with_fallback(
                "test",
                || {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if n < 2 {
                            Err("boom".to_string())
                        } else {
                            Ok(7)
                        }
                    }
                },
                || 0,
            )
            .await;
        assert_eq!(result.value, 7);
        assert!(!result.degraded);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_attempts_use_fallback() {
        let calls = AtomicU32::new(0);
        let result = fast_policy()
            .run_with_fallback(
                "test",
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err::<u32, _>("down".to_string()) }
                },
                || 99,
            )
            .await;
        assert_eq!(result.value, 99);
        assert!(result.degraded);
        // 1 initial + 2 retries
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn default_matches_observed_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.backoff, Duration::from_secs(2));
    }
}
