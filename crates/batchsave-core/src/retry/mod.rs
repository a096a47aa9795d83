//! Retry and backoff.
//!
//! Error classification by keyword table, exponential backoff with jitter, and an
//! async executor shared by the fetch scheduler and any other per-unit operation.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{
    classify_curl_error, classify_http_status, is_retryable, signature, Classify,
    DEFAULT_RETRYABLE_MATCHERS,
};
pub use error::TransferError;
pub use policy::{default_matchers, RetryDecision, RetryPolicy, JITTER_FRACTION};
pub use run::execute_with_retry;
