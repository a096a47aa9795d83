//! Retry loop: run an async operation until success, a final error, or cancellation.

use std::future::Future;
use std::time::Duration;

use crate::control::{CancelToken, Cancelled};

use super::classify::Classify;
use super::policy::{RetryDecision, RetryPolicy};

/// Runs `operation` until it succeeds or the policy says to stop.
///
/// The cancel token is checked before every attempt; once set, no further attempts
/// are made and `Cancelled` is returned. On a retryable failure `on_retry(attempt,
/// &error, delay)` is called, then the loop sleeps for `delay`. The last error is
/// always returned when attempts run out.
pub async fn execute_with_retry<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    mut on_retry: R,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + From<Cancelled>,
    R: FnMut(u32, &E, Duration),
{
    let mut attempt = 1u32;
    loop {
        cancel.check()?;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => match policy.decide(attempt, &e, rand::random::<f64>()) {
                RetryDecision::NoRetry => return Err(e),
                RetryDecision::RetryAfter(delay) => {
                    on_retry(attempt, &e, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            },
        }
    }
}
