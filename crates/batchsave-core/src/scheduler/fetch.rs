//! Archive path: fetch units in fixed-size chunks, all fetches of a chunk concurrently.
//!
//! Chunks run strictly one after another, so at most `concurrency_limit` fetches are
//! pending at any time. A slow unit holds back the next chunk (no backfill).

use std::future::Future;

use futures_util::stream::{FuturesUnordered, StreamExt};

use crate::control::CancelToken;
use crate::job::{FetchedItem, TransferUnit};
use crate::retry::{execute_with_retry, RetryPolicy, TransferError};

use super::progress::ProgressReporter;
use super::report::{FetchReport, Stop, UnitFailure};

/// Knobs for one concurrent fetch run.
#[derive(Debug, Clone, Copy)]
pub struct FetchSettings<'a> {
    pub concurrency_limit: usize,
    pub policy: &'a RetryPolicy,
    pub cancel: &'a CancelToken,
    /// Stop after the first unit whose error is final.
    pub fail_fast: bool,
}

/// Fetches every unit with `fetch_one`, retried per `settings.policy`.
///
/// Progress advances once per finished unit, including skipped ones. Results of a
/// chunk are put back into input order before they are recorded, so the returned
/// items follow the job order regardless of which fetch finished first.
pub async fn transfer_concurrently<F, Fut>(
    units: &[TransferUnit],
    settings: FetchSettings<'_>,
    fetch_one: F,
    progress: &mut ProgressReporter<'_>,
) -> FetchReport
where
    F: Fn(&TransferUnit) -> Fut,
    Fut: Future<Output = Result<Vec<u8>, TransferError>>,
{
    let limit = settings.concurrency_limit.max(1);
    let fetch_one = &fetch_one;
    let mut report = FetchReport::default();

    for (chunk_idx, chunk) in units.chunks(limit).enumerate() {
        if settings.cancel.is_cancelled() {
            report.stopped = Some(Stop::Cancelled);
            break;
        }
        let base = chunk_idx * limit;
        tracing::debug!(chunk = chunk_idx, size = chunk.len(), "starting fetch chunk");

        let mut pending: FuturesUnordered<_> = chunk
            .iter()
            .enumerate()
            .map(|(offset, unit)| async move {
                let result = execute_with_retry(
                    settings.policy,
                    settings.cancel,
                    |attempt, e: &TransferError, delay| {
                        tracing::debug!(
                            unit = %unit.display_name,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "fetch failed, retrying"
                        );
                    },
                    || fetch_one(unit),
                )
                .await;
                (base + offset, unit, result)
            })
            .collect();

        let mut finished = Vec::with_capacity(chunk.len());
        while let Some((index, unit, result)) = pending.next().await {
            if !matches!(result, Err(TransferError::Cancelled)) {
                progress.advance().await;
            }
            finished.push((index, unit, result));
        }
        finished.sort_by_key(|(index, _, _)| *index);

        for (index, unit, result) in finished {
            match result {
                Ok(bytes) => report.items.push(FetchedItem {
                    display_name: unit.display_name.clone(),
                    bytes,
                }),
                Err(TransferError::Cancelled) => report.stopped = Some(Stop::Cancelled),
                Err(error) => {
                    tracing::warn!(
                        unit = %unit.display_name,
                        key = %unit.source_key,
                        error = %error,
                        "skipping unit after final fetch error"
                    );
                    report.failures.push(UnitFailure {
                        index,
                        unit: unit.clone(),
                        error,
                    });
                    if settings.fail_fast && report.stopped.is_none() {
                        report.stopped = Some(Stop::FailFast);
                    }
                }
            }
        }

        if report.stopped.is_some() {
            break;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::progress::Progress;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn units(n: usize) -> Vec<TransferUnit> {
        (0..n)
            .map(|i| TransferUnit::new(format!("k{}", i), format!("f{}.jpg", i)))
            .collect()
    }

    fn quick_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(50))
    }

    #[tokio::test(start_paused = true)]
    async fn never_exceeds_concurrency_limit() {
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let (in_flight, peak) = (&in_flight, &peak);
        let policy = quick_policy();
        let cancel = CancelToken::new();
        let all = units(7);
        let mut progress = ProgressReporter::new(all.len(), None);

        let report = transfer_concurrently(
            &all,
            FetchSettings {
                concurrency_limit: 3,
                policy: &policy,
                cancel: &cancel,
                fail_fast: false,
            },
            move |unit| {
                let delay = 10 + unit.source_key.len() as u64 * 7;
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(vec![1u8])
                }
            },
            &mut progress,
        )
        .await;

        assert_eq!(report.items.len(), 7);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
        assert_eq!(progress.snapshot(), Progress { current: 7, total: 7 });
    }

    #[tokio::test(start_paused = true)]
    async fn items_keep_input_order_when_completion_is_reversed() {
        let policy = quick_policy();
        let cancel = CancelToken::new();
        let all = units(4);
        let mut progress = ProgressReporter::new(all.len(), None);

        let report = transfer_concurrently(
            &all,
            FetchSettings {
                concurrency_limit: 4,
                policy: &policy,
                cancel: &cancel,
                fail_fast: false,
            },
            move |unit| {
                let idx: u64 = unit.source_key[1..].parse().unwrap();
                let name = unit.display_name.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(100 - idx * 20)).await;
                    Ok(name.into_bytes())
                }
            },
            &mut progress,
        )
        .await;

        let names: Vec<_> = report.items.iter().map(|i| i.display_name.as_str()).collect();
        assert_eq!(names, vec!["f0.jpg", "f1.jpg", "f2.jpg", "f3.jpg"]);
        assert_eq!(report.items[2].bytes, b"f2.jpg".to_vec());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_unit_is_skipped_and_still_counted() {
        let policy = quick_policy();
        let cancel = CancelToken::new();
        let all = units(3);
        let (tx, mut rx) = tokio::sync::mpsc::channel(16);
        let mut progress = ProgressReporter::new(all.len(), Some(&tx));

        let report = transfer_concurrently(
            &all,
            FetchSettings {
                concurrency_limit: 2,
                policy: &policy,
                cancel: &cancel,
                fail_fast: false,
            },
            move |unit| {
                let fail = unit.source_key == "k1";
                async move {
                    if fail {
                        Err(TransferError::Http { status: 404 })
                    } else {
                        Ok(vec![0u8; 4])
                    }
                }
            },
            &mut progress,
        )
        .await;
        drop(progress);
        drop(tx);

        assert_eq!(report.items.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[0].error, TransferError::Http { status: 404 });
        assert!(report.stopped.is_none());

        let mut last = None;
        while let Some(p) = rx.recv().await {
            last = Some(p);
        }
        assert_eq!(last, Some(Progress { current: 3, total: 3 }));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_is_retried() {
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let policy = quick_policy();
        let cancel = CancelToken::new();
        let all = units(1);
        let mut progress = ProgressReporter::new(1, None);

        let report = transfer_concurrently(
            &all,
            FetchSettings {
                concurrency_limit: 1,
                policy: &policy,
                cancel: &cancel,
                fail_fast: false,
            },
            move |_unit| async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(TransferError::Network("connection reset".into()))
                } else {
                    Ok(vec![9u8])
                }
            },
            &mut progress,
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.items.len(), 1);
        assert!(report.failures.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn fail_fast_stops_after_failing_chunk() {
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let policy = quick_policy();
        let cancel = CancelToken::new();
        let all = units(6);
        let mut progress = ProgressReporter::new(all.len(), None);

        let report = transfer_concurrently(
            &all,
            FetchSettings {
                concurrency_limit: 2,
                policy: &policy,
                cancel: &cancel,
                fail_fast: true,
            },
            move |unit| {
                let fail = unit.source_key == "k0";
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    if fail {
                        Err(TransferError::Http { status: 403 })
                    } else {
                        Ok(vec![])
                    }
                }
            },
            &mut progress,
        )
        .await;

        assert_eq!(report.stopped, Some(Stop::FailFast));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.items.len(), 1);
    }

    #[tokio::test]
    async fn cancelled_before_start_fetches_nothing() {
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let policy = quick_policy();
        let cancel = CancelToken::new();
        cancel.cancel();
        let all = units(3);
        let mut progress = ProgressReporter::new(all.len(), None);

        let report = transfer_concurrently(
            &all,
            FetchSettings {
                concurrency_limit: 2,
                policy: &policy,
                cancel: &cancel,
                fail_fast: false,
            },
            move |_unit| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![])
            },
            &mut progress,
        )
        .await;

        assert_eq!(report.stopped, Some(Stop::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(progress.snapshot().current, 0);
    }
}
