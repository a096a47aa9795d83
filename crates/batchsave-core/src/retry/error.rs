//! Per-unit transfer error, classified by the retry executor.

use crate::control::Cancelled;

/// Error returned by a single unit's fetch or save.
///
/// Every variant carries a short `kind_name` so the retry executor can match
/// `"<kind> <message>"` against its keyword table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    /// Response had a non-2xx status.
    #[error("HTTP {status}")]
    Http { status: u32 },
    /// Connect, DNS, reset or other transport-level failure.
    #[error("network error: {0}")]
    Network(String),
    /// Connect or read timed out.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Response or URL could not be used (bad URL, truncated body, etc.).
    #[error("malformed response: {0}")]
    Malformed(String),
    /// Payload exceeded the configured per-item size limit.
    #[error("payload exceeds size limit of {limit} bytes")]
    TooLarge { limit: u64 },
    /// The file sink failed to persist the item.
    #[error("save failed: {0}")]
    Save(String),
    /// Caller aborted the job.
    #[error("transfer cancelled")]
    Cancelled,
}

impl TransferError {
    /// Type-like name used as the first word of the retry signature.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TransferError::Http { .. } => "HttpError",
            TransferError::Network(_) => "NetworkError",
            TransferError::Timeout(_) => "TimeoutError",
            TransferError::Malformed(_) => "MalformedResponse",
            TransferError::TooLarge { .. } => "SizeLimitError",
            TransferError::Save(_) => "SaveError",
            TransferError::Cancelled => "Cancelled",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransferError::Cancelled)
    }
}

impl From<Cancelled> for TransferError {
    fn from(_: Cancelled) -> Self {
        TransferError::Cancelled
    }
}

impl From<std::io::Error> for TransferError {
    fn from(e: std::io::Error) -> Self {
        TransferError::Save(e.to_string())
    }
}
