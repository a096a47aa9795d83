use std::collections::BTreeSet;
use std::time::Duration;

use super::classify::{is_retryable, Classify, DEFAULT_RETRYABLE_MATCHERS};

/// Upper bound of the jitter component as a fraction of the exponential part.
pub const JITTER_FRACTION: f64 = 0.3;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff policy with jitter, a cap, and a keyword table of retryable errors.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first). Treated as at least 1.
    pub max_attempts: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
    /// Lowercase substrings that mark an error signature as retryable.
    pub retryable_matchers: BTreeSet<String>,
}

/// Per-unit fetch policy: 3 attempts, 1s base, 10s cap.
impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            retryable_matchers: default_matchers(),
        }
    }
}

pub fn default_matchers() -> BTreeSet<String> {
    DEFAULT_RETRYABLE_MATCHERS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            retryable_matchers: default_matchers(),
        }
    }

    /// Replace the keyword table. Matchers are lowercased; empty ones are dropped.
    pub fn with_matchers<I, S>(mut self, matchers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.retryable_matchers = matchers
            .into_iter()
            .map(|m| m.as_ref().trim().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        self
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Backoff after failed `attempt` (1-based): `min(base * 2^(attempt-1) + jitter, max)`,
    /// with `jitter = 0.3 * exponential part * jitter_unit`, `jitter_unit` in `[0, 1)`.
    pub fn backoff_delay(&self, attempt: u32, jitter_unit: f64) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let exp = self.base_delay.saturating_mul(1u32 << shift);
        let jitter = exp.mul_f64(JITTER_FRACTION * jitter_unit.clamp(0.0, 1.0));
        exp.saturating_add(jitter).min(self.max_delay)
    }

    /// Decide whether failed `attempt` (1-based) should be retried, and after how long.
    pub fn decide<E: Classify + ?Sized>(
        &self,
        attempt: u32,
        error: &E,
        jitter_unit: f64,
    ) -> RetryDecision {
        if attempt >= self.attempts() || !is_retryable(error, &self.retryable_matchers) {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.backoff_delay(attempt, jitter_unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::TransferError;

    #[test]
    fn no_retry_for_client_errors() {
        let p = RetryPolicy::default();
        assert_eq!(
            p.decide(1, &TransferError::Http { status: 404 }, 0.0),
            RetryDecision::NoRetry
        );
    }

    #[test]
    fn backoff_without_jitter_doubles() {
        let p = RetryPolicy::new(10, Duration::from_millis(100), Duration::from_secs(60));
        assert_eq!(p.backoff_delay(1, 0.0), Duration::from_millis(100));
        assert_eq!(p.backoff_delay(2, 0.0), Duration::from_millis(200));
        assert_eq!(p.backoff_delay(3, 0.0), Duration::from_millis(400));
    }

    #[test]
    fn jitter_is_bounded_by_thirty_percent() {
        let p = RetryPolicy::new(10, Duration::from_millis(1000), Duration::from_secs(60));
        assert_eq!(p.backoff_delay(1, 1.0), Duration::from_millis(1300));
        assert_eq!(p.backoff_delay(2, 0.5), Duration::from_millis(2300));
    }

    #[test]
    fn backoff_is_capped() {
        let p = RetryPolicy::default();
        assert_eq!(p.backoff_delay(5, 0.0), Duration::from_secs(10));
        assert_eq!(p.backoff_delay(40, 1.0), Duration::from_secs(10));
    }

    #[test]
    fn respects_max_attempts() {
        let p = RetryPolicy::default();
        let e = TransferError::Timeout("read".into());
        assert!(matches!(p.decide(1, &e, 0.0), RetryDecision::RetryAfter(_)));
        assert!(matches!(p.decide(2, &e, 0.0), RetryDecision::RetryAfter(_)));
        assert_eq!(p.decide(3, &e, 0.0), RetryDecision::NoRetry);
    }

    #[test]
    fn zero_attempts_behaves_like_one() {
        let mut p = RetryPolicy::default();
        p.max_attempts = 0;
        assert_eq!(p.attempts(), 1);
        assert_eq!(
            p.decide(1, &TransferError::Timeout("x".into()), 0.0),
            RetryDecision::NoRetry
        );
    }

    #[test]
    fn with_matchers_normalizes() {
        let p = RetryPolicy::default().with_matchers(["  HTTP 404 ", ""]);
        assert_eq!(p.retryable_matchers.len(), 1);
        assert!(p.retryable_matchers.contains("http 404"));
    }
}
