//! Per-job progress: units done out of a total fixed at job start.
//!
//! The reporter is owned by exactly one running job and handed around by `&mut`,
//! so two jobs can never advance the same counter.

use tokio::sync::mpsc::Sender;

/// Snapshot sent to the caller after every unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Units finished (succeeded or skipped). Never decreases.
    pub current: usize,
    /// Units in the job.
    pub total: usize,
}

impl Progress {
    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.current as f64 / self.total as f64).min(1.0)
    }

    pub fn is_done(&self) -> bool {
        self.current >= self.total
    }
}

/// Counts finished units and forwards each new snapshot to the optional sink.
pub struct ProgressReporter<'a> {
    current: usize,
    total: usize,
    tx: Option<&'a Sender<Progress>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(total: usize, tx: Option<&'a Sender<Progress>>) -> Self {
        Self {
            current: 0,
            total,
            tx,
        }
    }

    pub fn snapshot(&self) -> Progress {
        Progress {
            current: self.current,
            total: self.total,
        }
    }

    /// Marks one more unit finished and reports it. Saturates at `total`.
    pub async fn advance(&mut self) -> Progress {
        self.current = (self.current + 1).min(self.total);
        let snapshot = self.snapshot();
        if let Some(tx) = self.tx {
            if tx.send(snapshot).await.is_err() {
                tracing::trace!("progress receiver dropped");
            }
        }
        snapshot
    }
}
