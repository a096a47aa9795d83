//! Transfer scheduling for both strategies.
//!
//! `fetch` drives the archive path (chunked concurrent fetches with retry),
//! `sequential` drives the one-file-at-a-time path. Both report progress after
//! every unit and contain per-unit failures.

mod fetch;
mod progress;
mod report;
mod sequential;

pub use fetch::{transfer_concurrently, FetchSettings};
pub use progress::{Progress, ProgressReporter};
pub use report::{FetchReport, SequentialReport, Stop, UnitFailure};
pub use sequential::{transfer_sequentially, DEFAULT_SEQUENTIAL_DELAY};
