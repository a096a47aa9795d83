//! Job-level errors. Per-unit failures are `TransferError` and never surface here
//! unless the job runs with `fail_fast`.

use crate::retry::{Classify, TransferError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The job has no units.
    #[error("transfer job has no units")]
    EmptyJob,
    /// The engine is already running a job.
    #[error("another transfer is already running on this engine")]
    Busy,
    /// A unit failed and the job runs with `fail_fast`.
    #[error("unit '{display_name}' failed: {source}")]
    UnitFailed {
        display_name: String,
        #[source]
        source: TransferError,
    },
    /// ZIP assembly failed.
    #[error("archive build failed: {0}")]
    Archive(#[from] zip::result::ZipError),
    /// Handing the finished archive to the file sink failed.
    #[error("saving archive failed: {0}")]
    Save(#[source] TransferError),
}

impl Classify for EngineError {
    fn kind_name(&self) -> &str {
        match self {
            EngineError::EmptyJob => "InvalidJob",
            EngineError::Busy => "BusyError",
            EngineError::UnitFailed { source, .. } | EngineError::Save(source) => {
                source.kind_name()
            }
            EngineError::Archive(_) => "ArchiveError",
        }
    }
}
