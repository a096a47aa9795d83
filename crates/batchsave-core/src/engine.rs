//! Job orchestration: pick a strategy, run the matching path, report the outcome.
//!
//! A `TransferEngine` runs one job at a time. The archive path fetches every unit into
//! memory and hands a single ZIP to the file sink; the sequential path asks the sink
//! to save each unit directly, with a pause between saves.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::Sender;

use crate::archive::build_archive;
use crate::checksum::sha256_bytes;
use crate::control::CancelToken;
use crate::error::EngineError;
use crate::job::{JobState, Outcome, TransferJob};
use crate::resolver::UrlResolver;
use crate::retry::{RetryPolicy, TransferError};
use crate::scheduler::{
    transfer_concurrently, transfer_sequentially, FetchSettings, Progress, ProgressReporter, Stop,
    UnitFailure, DEFAULT_SEQUENTIAL_DELAY,
};
use crate::strategy::{select_strategy, ClientHints, Strategy};
use crate::transport::{FileSink, HttpClient};
use crate::url_model::DEFAULT_JOB_NAME_MAX;

/// Tunables shared by every job the engine runs.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Retry policy applied to each unit fetch on the archive path.
    pub fetch_policy: RetryPolicy,
    /// Pause between saves on the sequential path.
    pub sequential_delay: Duration,
    /// Abort the job on the first unit that fails for good.
    pub fail_fast: bool,
    /// Maximum length of the sanitized job name used for the archive filename.
    pub max_job_name_len: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            fetch_policy: RetryPolicy::default(),
            sequential_delay: DEFAULT_SEQUENTIAL_DELAY,
            fail_fast: false,
            max_job_name_len: DEFAULT_JOB_NAME_MAX,
        }
    }
}

/// Clears the engine's running flag when a job ends, however it ends.
struct ActiveJobGuard<'a> {
    active: &'a AtomicBool,
}

impl<'a> ActiveJobGuard<'a> {
    fn acquire(active: &'a AtomicBool) -> Result<Self, EngineError> {
        active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EngineError::Busy)?;
        Ok(Self { active })
    }
}

impl Drop for ActiveJobGuard<'_> {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

/// Outcome of a finished job plus the units it skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub outcome: Outcome,
    /// Skipped units in job order, each with its final error.
    pub failures: Vec<UnitFailure>,
}

impl JobReport {
    pub fn new(outcome: Outcome, failures: Vec<UnitFailure>) -> Self {
        Self { outcome, failures }
    }

    /// Final error of the last skipped unit.
    pub fn last_error(&self) -> Option<&TransferError> {
        self.failures.last().map(|f| &f.error)
    }
}

pub struct TransferEngine {
    client: Arc<dyn HttpClient>,
    sink: Arc<dyn FileSink>,
    resolver: Arc<dyn UrlResolver>,
    options: EngineOptions,
    active: AtomicBool,
}

impl TransferEngine {
    pub fn new(
        client: Arc<dyn HttpClient>,
        sink: Arc<dyn FileSink>,
        resolver: Arc<dyn UrlResolver>,
    ) -> Self {
        Self {
            client,
            sink,
            resolver,
            options: EngineOptions::default(),
            active: AtomicBool::new(false),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// True while a job is running.
    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Runs `job` with the strategy `select_strategy(hints)` picks.
    ///
    /// Per-unit failures never make this return `Err`: they show up as skipped units in
    /// the outcome. `Err` means the job could not run at all, the archive could not be
    /// built or saved, or a unit failed while `fail_fast` is set.
    pub async fn run_transfer(
        &self,
        job: &TransferJob,
        hints: &ClientHints,
        progress_tx: Option<&Sender<Progress>>,
        cancel: &CancelToken,
    ) -> Result<Outcome, EngineError> {
        let strategy = select_strategy(hints);
        self.run_with_strategy(job, strategy, progress_tx, cancel)
            .await
    }

    /// Runs `job` on an explicitly chosen path.
    pub async fn run_with_strategy(
        &self,
        job: &TransferJob,
        strategy: Strategy,
        progress_tx: Option<&Sender<Progress>>,
        cancel: &CancelToken,
    ) -> Result<Outcome, EngineError> {
        self.run_with_report(job, strategy, progress_tx, cancel)
            .await
            .map(|report| report.outcome)
    }

    /// Like [`run_with_strategy`](Self::run_with_strategy), but also returns the
    /// skipped units with their final errors.
    pub async fn run_with_report(
        &self,
        job: &TransferJob,
        strategy: Strategy,
        progress_tx: Option<&Sender<Progress>>,
        cancel: &CancelToken,
    ) -> Result<JobReport, EngineError> {
        if job.is_empty() {
            return Err(EngineError::EmptyJob);
        }
        let _guard = ActiveJobGuard::acquire(&self.active)?;

        tracing::info!(
            job = %job.job_name,
            units = job.len(),
            strategy = %strategy,
            state = %JobState::Running,
            "transfer started"
        );

        let mut progress = ProgressReporter::new(job.len(), progress_tx);
        let result = match strategy {
            Strategy::Archive => self.run_archive(job, cancel, &mut progress).await,
            Strategy::Sequential => self.run_sequential(job, cancel, &mut progress).await,
        };

        match &result {
            Ok(JobReport { outcome, .. }) => tracing::info!(
                job = %job.job_name,
                state = %outcome.state(),
                succeeded = outcome.succeeded(),
                skipped = outcome.skipped(),
                "transfer finished"
            ),
            Err(e) => tracing::error!(job = %job.job_name, error = %e, "transfer failed"),
        }
        result
    }

    async fn run_archive(
        &self,
        job: &TransferJob,
        cancel: &CancelToken,
        progress: &mut ProgressReporter<'_>,
    ) -> Result<JobReport, EngineError> {
        let client = self.client.as_ref();
        let resolver = self.resolver.as_ref();
        let settings = FetchSettings {
            concurrency_limit: job.concurrency_limit,
            policy: &self.options.fetch_policy,
            cancel,
            fail_fast: self.options.fail_fast,
        };

        let report = transfer_concurrently(
            &job.units,
            settings,
            |unit| {
                let url = resolver.resolve(&unit.source_key);
                async move { client.fetch_bytes(&url).await }
            },
            progress,
        )
        .await;

        match report.stopped {
            Some(Stop::Cancelled) => {
                return Ok(JobReport::new(Outcome::Cancelled, report.failures))
            }
            Some(Stop::FailFast) => return Err(first_failure(report.failures)),
            None => {}
        }
        if report.items.is_empty() {
            return Ok(JobReport::new(Outcome::FailedNoUnits, report.failures));
        }

        let blob = build_archive(&report.items, &job.job_name, self.options.max_job_name_len)?;
        tracing::info!(
            archive = %blob.filename,
            entries = blob.entries.len(),
            bytes = blob.bytes.len(),
            sha256 = %sha256_bytes(&blob.bytes),
            "archive built"
        );
        self.sink
            .save_blob(blob.bytes, &blob.filename)
            .await
            .map_err(EngineError::Save)?;

        let outcome = Outcome::from_counts(report.items.len(), report.failures.len());
        Ok(JobReport::new(outcome, report.failures))
    }

    async fn run_sequential(
        &self,
        job: &TransferJob,
        cancel: &CancelToken,
        progress: &mut ProgressReporter<'_>,
    ) -> Result<JobReport, EngineError> {
        let report = transfer_sequentially(
            &job.units,
            self.resolver.as_ref(),
            self.sink.as_ref(),
            self.options.sequential_delay,
            cancel,
            self.options.fail_fast,
            progress,
        )
        .await;

        let outcome = match report.stopped {
            Some(Stop::Cancelled) => Outcome::Cancelled,
            Some(Stop::FailFast) => return Err(first_failure(report.failures)),
            None => Outcome::from_counts(report.saved, report.failures.len()),
        };
        Ok(JobReport::new(outcome, report.failures))
    }
}

fn first_failure(failures: Vec<UnitFailure>) -> EngineError {
    match failures.into_iter().next() {
        Some(f) => EngineError::UnitFailed {
            display_name: f.unit.display_name,
            source: f.error,
        },
        None => EngineError::UnitFailed {
            display_name: String::new(),
            source: TransferError::Cancelled,
        },
    }
}
