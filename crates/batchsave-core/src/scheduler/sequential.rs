//! Sequential path: save each unit on its own, with a pause between saves.
//!
//! Clients block bursts of downloads, so every save except the last is followed by
//! a fixed delay. Input order is kept strictly.

use std::time::Duration;

use crate::control::CancelToken;
use crate::job::TransferUnit;
use crate::resolver::UrlResolver;
use crate::transport::FileSink;

use super::progress::ProgressReporter;
use super::report::{SequentialReport, Stop, UnitFailure};

/// Pause between individual saves.
pub const DEFAULT_SEQUENTIAL_DELAY: Duration = Duration::from_millis(1500);

/// Saves units one by one through `sink`. Per-unit failures are logged and skipped.
pub async fn transfer_sequentially(
    units: &[TransferUnit],
    resolver: &dyn UrlResolver,
    sink: &dyn FileSink,
    delay: Duration,
    cancel: &CancelToken,
    fail_fast: bool,
    progress: &mut ProgressReporter<'_>,
) -> SequentialReport {
    let mut report = SequentialReport::default();

    for (index, unit) in units.iter().enumerate() {
        if cancel.is_cancelled() {
            report.stopped = Some(Stop::Cancelled);
            break;
        }

        let url = resolver.resolve(&unit.source_key);
        match sink.save_url(&url, &unit.display_name).await {
            Ok(()) => report.saved += 1,
            Err(error) => {
                tracing::warn!(
                    unit = %unit.display_name,
                    key = %unit.source_key,
                    error = %error,
                    "skipping unit after save error"
                );
                report.failures.push(UnitFailure {
                    index,
                    unit: unit.clone(),
                    error,
                });
                if fail_fast {
                    progress.advance().await;
                    report.stopped = Some(Stop::FailFast);
                    break;
                }
            }
        }
        progress.advance().await;

        if index + 1 < units.len() {
            tokio::time::sleep(delay).await;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::TransferError;
    use crate::scheduler::progress::Progress;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::Instant;

    #[derive(Default)]
    struct RecordingSink {
        saves: Mutex<Vec<(String, String, Instant)>>,
        fail_urls: Vec<String>,
    }

    #[async_trait]
    impl FileSink for RecordingSink {
        async fn save_blob(&self, _bytes: Vec<u8>, _filename: &str) -> Result<(), TransferError> {
            unreachable!("sequential path never saves blobs")
        }

        async fn save_url(&self, url: &str, filename: &str) -> Result<(), TransferError> {
            self.saves
                .lock()
                .unwrap()
                .push((url.to_string(), filename.to_string(), Instant::now()));
            if self.fail_urls.iter().any(|u| u == url) {
                return Err(TransferError::Http { status: 404 });
            }
            Ok(())
        }
    }

    fn resolver(key: &str) -> String {
        format!("https://cdn.example.com/{}", key)
    }

    fn units() -> Vec<TransferUnit> {
        vec![
            TransferUnit::new("k1", "a.jpg"),
            TransferUnit::new("k2", "a.jpg"),
            TransferUnit::new("k3", "b.jpg"),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn saves_in_order_with_delay_between_items_only() {
        let sink = RecordingSink::default();
        let all = units();
        let mut progress = ProgressReporter::new(all.len(), None);
        let start = Instant::now();

        let report = transfer_sequentially(
            &all,
            &resolver,
            &sink,
            DEFAULT_SEQUENTIAL_DELAY,
            &CancelToken::new(),
            false,
            &mut progress,
        )
        .await;

        assert_eq!(report.saved, 3);
        assert!(report.failures.is_empty());
        assert_eq!(start.elapsed(), Duration::from_millis(3000));

        let saves = sink.saves.lock().unwrap();
        let urls: Vec<_> = saves.iter().map(|(u, _, _)| u.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://cdn.example.com/k1",
                "https://cdn.example.com/k2",
                "https://cdn.example.com/k3"
            ]
        );
        assert_eq!(saves[1].2 - saves[0].2, Duration::from_millis(1500));
        assert_eq!(saves[2].2 - saves[1].2, Duration::from_millis(1500));
        assert_eq!(progress.snapshot(), Progress { current: 3, total: 3 });
    }

    #[tokio::test(start_paused = true)]
    async fn failed_save_is_skipped_and_progress_advances() {
        let sink = RecordingSink {
            fail_urls: vec!["https://cdn.example.com/k2".to_string()],
            ..Default::default()
        };
        let all = units();
        let mut progress = ProgressReporter::new(all.len(), None);

        let report = transfer_sequentially(
            &all,
            &resolver,
            &sink,
            DEFAULT_SEQUENTIAL_DELAY,
            &CancelToken::new(),
            false,
            &mut progress,
        )
        .await;

        assert_eq!(report.saved, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].unit.source_key, "k2");
        assert_eq!(progress.snapshot().current, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_before_next_unit() {
        let sink = RecordingSink::default();
        let all = units();
        let cancel = CancelToken::new();
        let mut progress = ProgressReporter::new(all.len(), None);
        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                cancel.cancel();
            })
        };

        let report = transfer_sequentially(
            &all,
            &resolver,
            &sink,
            DEFAULT_SEQUENTIAL_DELAY,
            &cancel,
            false,
            &mut progress,
        )
        .await;
        canceller.await.unwrap();

        assert_eq!(report.saved, 1);
        assert_eq!(report.stopped, Some(Stop::Cancelled));
        assert_eq!(sink.saves.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fail_fast_stops_on_first_failure() {
        let sink = RecordingSink {
            fail_urls: vec!["https://cdn.example.com/k1".to_string()],
            ..Default::default()
        };
        let all = units();
        let mut progress = ProgressReporter::new(all.len(), None);

        let report = transfer_sequentially(
            &all,
            &resolver,
            &sink,
            DEFAULT_SEQUENTIAL_DELAY,
            &CancelToken::new(),
            true,
            &mut progress,
        )
        .await;

        assert_eq!(report.stopped, Some(Stop::FailFast));
        assert_eq!(report.saved, 0);
        assert_eq!(sink.saves.lock().unwrap().len(), 1);
    }
}
