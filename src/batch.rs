//! The Batch Pipeline: many Conversion Units on a bounded worker pool.
//!
//! A single coordinating loop owns all batch state. It keeps up to
//! `parallel_workers` conversions in flight on spawned tasks and refills a
//! slot as soon as any of them finishes, so a slow item only ever holds its
//! own slot. Outcomes that finish ahead of an earlier item are buffered and
//! reported once every item before them has been, which keeps `success` and
//! `failed` events in submission order.
//!
//! Cancellation is cooperative. The [`CancelToken`] is checked only right
//! before each dispatch; conversions already running are always awaited and
//! reported.

use crate::config::{ConversionSettings, MAX_WORKERS, MIN_WORKERS};
use crate::convert::convert_one;
use crate::error::ItemError;
use crate::output::{BatchPhase, BatchReport, BatchSnapshot, Outcome};
use crate::pipeline::extract::Extractor;
use crate::progress::{BatchEvent, BatchObserver};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Shared flag to stop a batch from dispatching further items.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counters owned by the coordinating loop. Observers only ever see
/// [`BatchSnapshot`] copies.
#[derive(Debug)]
pub struct BatchState {
    total: usize,
    completed: usize,
    successful: usize,
    failed: usize,
    cancel_requested: bool,
    current_item: Option<String>,
    phase: BatchPhase,
}

impl BatchState {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            successful: 0,
            failed: 0,
            cancel_requested: false,
            current_item: None,
            phase: BatchPhase::Idle,
        }
    }

    pub fn snapshot(&self) -> BatchSnapshot {
        BatchSnapshot {
            total: self.total,
            completed: self.completed,
            successful: self.successful,
            failed: self.failed,
            cancel_requested: self.cancel_requested,
            current_item: self.current_item.clone(),
        }
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    fn record(&mut self, outcome: &Outcome) {
        self.completed += 1;
        if outcome.success {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Convert `items` into `output_dir`, reporting every step to `observer`.
///
/// Returns once every dispatched item has finished. The report holds one
/// [`Outcome`] per dispatched item, in submission order; items never
/// dispatched because of cancellation have none.
pub async fn run_batch(
    items: Vec<String>,
    output_dir: &Path,
    settings: &ConversionSettings,
    extractor: Arc<dyn Extractor>,
    observer: &dyn BatchObserver,
    cancel: &CancelToken,
) -> BatchReport {
    let start = Instant::now();
    let workers = settings.parallel_workers.clamp(MIN_WORKERS, MAX_WORKERS);
    let shared_settings = Arc::new(settings.clone());
    let output_dir = output_dir.to_path_buf();

    let mut state = BatchState::new(items.len());
    state.phase = BatchPhase::Running;
    info!(
        "Batch start: {} items, {} workers → {}",
        state.total,
        workers,
        output_dir.display()
    );

    let mut pending = items.into_iter().enumerate().peekable();
    let mut running = FuturesUnordered::new();
    // Finished out of order, waiting for every earlier item to be reported.
    let mut finished: BTreeMap<usize, Outcome> = BTreeMap::new();
    let mut next_report = 0;
    let mut outcomes: Vec<Outcome> = Vec::with_capacity(state.total);

    loop {
        // ── Fill free worker slots ───────────────────────────────────────
        while running.len() < workers && pending.peek().is_some() {
            if cancel.is_cancelled() {
                if !state.cancel_requested {
                    info!("Cancellation requested; no further items will be dispatched");
                }
                state.cancel_requested = true;
                break;
            }
            let Some((index, item)) = pending.next() else {
                break;
            };

            state.current_item = Some(item.clone());
            observer.on_event(&BatchEvent::Converting {
                index,
                item: item.clone(),
                progress: state.snapshot(),
            });
            debug!("Dispatching item {}: {}", index + 1, item);

            let handle = tokio::spawn({
                let source = item.clone();
                let dir = output_dir.clone();
                let settings = Arc::clone(&shared_settings);
                let extractor = Arc::clone(&extractor);
                async move { convert_one(&source, &dir, &settings, extractor.as_ref()).await }
            });
            running.push(async move { (index, item, handle.await) });
        }

        // ── Wait for whichever worker finishes first ─────────────────────
        let Some((index, item, joined)) = running.next().await else {
            break;
        };
        let outcome = joined.unwrap_or_else(|e| {
            warn!("Worker for {} did not finish: {}", item, e);
            Outcome::failed(
                item.as_str(),
                ItemError::Internal(format!("worker for '{item}' failed: {e}")),
            )
        });
        finished.insert(index, outcome);

        // ── Report in submission order ───────────────────────────────────
        while let Some(outcome) = finished.remove(&next_report) {
            state.record(&outcome);
            let event = if outcome.success {
                BatchEvent::Success {
                    index: next_report,
                    outcome: outcome.clone(),
                    progress: state.snapshot(),
                }
            } else {
                BatchEvent::Failed {
                    index: next_report,
                    outcome: outcome.clone(),
                    progress: state.snapshot(),
                }
            };
            observer.on_event(&event);
            outcomes.push(outcome);
            next_report += 1;
        }

        // Let observers and other tasks interleave between items.
        tokio::task::yield_now().await;
    }

    let stopped_early = state.cancel_requested && pending.peek().is_some();
    state.phase = if stopped_early {
        BatchPhase::Cancelled
    } else {
        BatchPhase::Completed
    };
    state.current_item = None;
    let progress = state.snapshot();

    observer.on_event(&BatchEvent::Complete {
        outcomes: outcomes.clone(),
        progress: progress.clone(),
        cancelled: stopped_early,
    });

    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Batch {}: {}/{} succeeded, {} failed, {} not dispatched, {}ms",
        if stopped_early { "cancelled" } else { "complete" },
        progress.successful,
        progress.total,
        progress.failed,
        progress.total - progress.completed,
        duration_ms
    );

    BatchReport {
        outcomes,
        progress,
        phase: state.phase(),
        duration_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extract::BuiltinExtractor;
    use crate::progress::NoopObserver;

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn state_counts_outcomes() {
        let mut state = BatchState::new(3);
        state.record(&Outcome::succeeded("a", "a.md".into()));
        state.record(&Outcome::failed("b", ItemError::Internal("x".into())));
        let snap = state.snapshot();
        assert_eq!((snap.completed, snap.successful, snap.failed), (2, 1, 1));
        assert_eq!(state.phase(), BatchPhase::Idle);
    }

    #[tokio::test]
    async fn empty_batch_completes() {
        let dir = tempfile::tempdir().unwrap();
        let report = run_batch(
            Vec::new(),
            dir.path(),
            &ConversionSettings::default(),
            Arc::new(BuiltinExtractor::new()),
            &NoopObserver,
            &CancelToken::new(),
        )
        .await;
        assert!(report.outcomes.is_empty());
        assert_eq!(report.phase, BatchPhase::Completed);
    }

    #[tokio::test]
    async fn pre_cancelled_batch_dispatches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let report = run_batch(
            vec!["a.txt".into(), "b.txt".into()],
            dir.path(),
            &ConversionSettings::default(),
            Arc::new(BuiltinExtractor::new()),
            &NoopObserver,
            &cancel,
        )
        .await;
        assert!(report.outcomes.is_empty());
        assert!(report.was_cancelled());
        assert!(report.progress.cancel_requested);
    }
}
