//! Keyword-based retry classification, plus mapping of HTTP status and curl errors.

use std::collections::BTreeSet;

use super::error::TransferError;

/// Keywords that mark an error signature as transient (network, timeout, 5xx, throttling).
pub const DEFAULT_RETRYABLE_MATCHERS: &[&str] = &[
    "network",
    "timeout",
    "timed out",
    "connection",
    "reset",
    "unreachable",
    "http 5",
    "http 429",
];

/// Errors the retry executor can classify.
pub trait Classify: std::fmt::Display {
    /// Short type-like name, e.g. `"TimeoutError"`.
    fn kind_name(&self) -> &str;
}

impl Classify for TransferError {
    fn kind_name(&self) -> &str {
        TransferError::kind_name(self)
    }
}

impl Classify for anyhow::Error {
    fn kind_name(&self) -> &str {
        "Error"
    }
}

/// Lowercase `"<kind> <message>"` string matched against the keyword table.
pub fn signature<E: Classify + ?Sized>(e: &E) -> String {
    format!("{} {}", e.kind_name(), e).to_lowercase()
}

/// True if any matcher is a substring of the error's signature.
pub fn is_retryable<E: Classify + ?Sized>(e: &E, matchers: &BTreeSet<String>) -> bool {
    let sig = signature(e);
    matchers.iter().any(|m| sig.contains(m.as_str()))
}

/// Classify an HTTP status code. `None` for 2xx.
pub fn classify_http_status(code: u32) -> Option<TransferError> {
    match code {
        200..=299 => None,
        _ => Some(TransferError::Http { status: code }),
    }
}

/// Classify a curl error into a transfer error.
pub fn classify_curl_error(e: &curl::Error) -> TransferError {
    if e.is_operation_timedout() {
        return TransferError::Timeout(e.to_string());
    }
    if e.is_url_malformed() || e.is_unsupported_protocol() || e.is_bad_content_encoding() {
        return TransferError::Malformed(e.to_string());
    }
    TransferError::Network(e.to_string())
}
