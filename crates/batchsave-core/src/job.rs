//! Transfer job model: units, job, fetched payloads, outcome and job state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::network::{concurrency_from, NetworkQualityProvider};

/// One item to fetch and save. Supplied by the caller, never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferUnit {
    /// Remote key; turned into a URL by the injected resolver.
    pub source_key: String,
    /// Name of the entry in the archive or of the saved file.
    pub display_name: String,
}

impl TransferUnit {
    pub fn new(source_key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            source_key: source_key.into(),
            display_name: display_name.into(),
        }
    }
}

/// A user-triggered transfer. Lives only for the duration of one `run_transfer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferJob {
    pub units: Vec<TransferUnit>,
    /// Raw job name; sanitized before it becomes a filename.
    pub job_name: String,
    /// Fetches in flight at once on the archive path. Always >= 1.
    pub concurrency_limit: usize,
}

impl TransferJob {
    pub fn new(units: Vec<TransferUnit>, job_name: impl Into<String>, concurrency_limit: usize) -> Self {
        Self {
            units,
            job_name: job_name.into(),
            concurrency_limit: concurrency_limit.max(1),
        }
    }

    /// Job whose concurrency comes from the provider's network quality.
    /// No provider means `unknown`.
    pub fn for_network(
        units: Vec<TransferUnit>,
        job_name: impl Into<String>,
        provider: Option<&dyn NetworkQualityProvider>,
    ) -> Self {
        Self::new(units, job_name, concurrency_from(provider))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Payload of a successfully fetched unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedItem {
    pub display_name: String,
    pub bytes: Vec<u8>,
}

/// Final result of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every unit transferred.
    Completed(usize),
    /// Some units were skipped after exhausting retries. Still a success.
    PartiallyCompleted { succeeded: usize, skipped: usize },
    /// No unit transferred; nothing was saved.
    FailedNoUnits,
    /// Caller aborted the job.
    Cancelled,
}

impl Outcome {
    /// Outcome for a job that ran to the end with the given counts.
    pub fn from_counts(succeeded: usize, skipped: usize) -> Self {
        match (succeeded, skipped) {
            (0, _) => Outcome::FailedNoUnits,
            (n, 0) => Outcome::Completed(n),
            (succeeded, skipped) => Outcome::PartiallyCompleted { succeeded, skipped },
        }
    }

    pub fn state(&self) -> JobState {
        match self {
            Outcome::Completed(_) => JobState::Completed,
            Outcome::PartiallyCompleted { .. } => JobState::PartiallyCompleted,
            Outcome::FailedNoUnits => JobState::FailedNoUnits,
            Outcome::Cancelled => JobState::Cancelled,
        }
    }

    /// Completed or partially completed.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Outcome::Completed(_) | Outcome::PartiallyCompleted { .. }
        )
    }

    pub fn succeeded(&self) -> usize {
        match self {
            Outcome::Completed(n) => *n,
            Outcome::PartiallyCompleted { succeeded, .. } => *succeeded,
            Outcome::FailedNoUnits | Outcome::Cancelled => 0,
        }
    }

    pub fn skipped(&self) -> usize {
        match self {
            Outcome::PartiallyCompleted { skipped, .. } => *skipped,
            _ => 0,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed(n) => write!(f, "completed: {} file(s) saved", n),
            Outcome::PartiallyCompleted { succeeded, skipped } => write!(
                f,
                "partially completed: {} file(s) saved, {} skipped",
                succeeded, skipped
            ),
            Outcome::FailedNoUnits => write!(f, "failed: no files could be transferred"),
            Outcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Job lifecycle: `Idle → Running → {Completed | PartiallyCompleted | FailedNoUnits | Cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Running,
    Completed,
    PartiallyCompleted,
    FailedNoUnits,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobState::Idle | JobState::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Idle => "idle",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::PartiallyCompleted => "partially_completed",
            JobState::FailedNoUnits => "failed_no_units",
            JobState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
