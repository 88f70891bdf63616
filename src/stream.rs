//! Channel transport for batch events.
//!
//! [`crate::batch::run_batch`] calls its observer inline on the coordinating
//! task. A UI that repaints, or a server that pushes events over a socket,
//! should not do that work there. [`event_channel`] gives it a
//! [`ChannelObserver`] that only enqueues, and an [`EventStream`] to drain at
//! its own pace. The channel is unbounded, so the coordinator never waits on a
//! slow consumer; events keep their order.

use crate::batch::{run_batch, CancelToken};
use crate::config::ConversionSettings;
use crate::output::BatchReport;
use crate::pipeline::extract::Extractor;
use crate::progress::{BatchEvent, BatchObserver};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;

/// Ordered stream of batch events. Ends after `complete`.
pub type EventStream = UnboundedReceiverStream<BatchEvent>;

/// Observer that forwards every event into a channel.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<BatchEvent>,
}

impl BatchObserver for ChannelObserver {
    fn on_event(&self, event: &BatchEvent) {
        if self.tx.send(event.clone()).is_err() {
            debug!("Event receiver dropped; discarding {} event", event.status());
        }
    }
}

/// Create a connected observer/stream pair.
pub fn event_channel() -> (ChannelObserver, EventStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelObserver { tx }, UnboundedReceiverStream::new(rx))
}

/// Run a batch on a spawned task.
///
/// Returns the task handle, which resolves to the [`BatchReport`], and the
/// stream of its events. Keep a clone of `cancel` to stop dispatch early.
///
/// # Example
/// ```rust,no_run
/// use mdbatch::{spawn_batch, BuiltinExtractor, CancelToken, ConversionSettings};
/// use futures::StreamExt;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let cancel = CancelToken::new();
/// let (handle, mut events) = spawn_batch(
///     vec!["notes.txt".into(), "readme.md".into()],
///     "markdown".into(),
///     ConversionSettings::default(),
///     Arc::new(BuiltinExtractor::new()),
///     cancel.clone(),
/// );
/// while let Some(event) = events.next().await {
///     println!("{}", event.status());
/// }
/// let report = handle.await.unwrap();
/// println!("{} outcomes", report.outcomes.len());
/// # }
/// ```
pub fn spawn_batch(
    items: Vec<String>,
    output_dir: PathBuf,
    settings: ConversionSettings,
    extractor: Arc<dyn Extractor>,
    cancel: CancelToken,
) -> (JoinHandle<BatchReport>, EventStream) {
    let (observer, events) = event_channel();
    let handle = tokio::spawn(async move {
        run_batch(items, &output_dir, &settings, extractor, &observer, &cancel).await
    });
    (handle, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::BatchSnapshot;
    use futures::StreamExt;

    #[tokio::test]
    async fn channel_preserves_order_and_closes() {
        let (observer, mut events) = event_channel();
        for index in 0..3 {
            observer.on_event(&BatchEvent::Converting {
                index,
                item: format!("i{index}"),
                progress: BatchSnapshot::default(),
            });
        }
        drop(observer);

        let mut seen = Vec::new();
        while let Some(e) = events.next().await {
            seen.push(e.index());
        }
        assert_eq!(seen, [Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn send_after_receiver_dropped_is_harmless() {
        let (observer, events) = event_channel();
        drop(events);
        observer.on_event(&BatchEvent::Complete {
            outcomes: vec![],
            progress: BatchSnapshot::default(),
            cancelled: false,
        });
    }
}
