//! What a scheduler run produced: successes, skipped units, and why it stopped early.

use crate::job::{FetchedItem, TransferUnit};
use crate::retry::TransferError;

/// A unit that was skipped after its error became final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    /// Position of the unit in the job.
    pub index: usize,
    pub unit: TransferUnit,
    pub error: TransferError,
}

/// Reason a run ended before processing every unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    /// The cancel token was set.
    Cancelled,
    /// A unit failed and the job runs with `fail_fast`.
    FailFast,
}

/// Result of the archive-path fetch.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Fetched payloads in input order.
    pub items: Vec<FetchedItem>,
    pub failures: Vec<UnitFailure>,
    pub stopped: Option<Stop>,
}

/// Result of the sequential path.
#[derive(Debug, Default)]
pub struct SequentialReport {
    pub saved: usize,
    pub failures: Vec<UnitFailure>,
    pub stopped: Option<Stop>,
}
