//! Bounded retry policy for model calls.
//!
//! The policy and the sleeper are injected into the executor so tests can
//! run the full retry path without real delays.

use std::time::Duration;

use async_trait::async_trait;

/// Bounded retry with linear backoff: 1s, 2.5s, 4s, ...
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 2 }
    }
}

impl RetryPolicy {
    /// Delay before re-attempting after failed attempt `attempt` (0-based):
    /// `1 + attempt * 1.5` seconds. Linear, not exponential.
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(1_000 + u64::from(attempt) * 1_500)
    }
}

/// Clock seam for backoff waits.
#[async_trait]
pub trait Sleep: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the Tokio timer.
pub struct TokioSleep;

#[async_trait]
impl Sleep for TokioSleep {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_linear() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_millis(1_000));
        assert_eq!(policy.backoff(1), Duration::from_millis(2_500));
        assert_eq!(policy.backoff(2), Duration::from_millis(4_000));
    }

    #[test]
    fn test_default_allows_two_retries() {
        assert_eq!(RetryPolicy::default().max_retries, 2);
    }
}
