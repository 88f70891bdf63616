//! Batch progress events and the observer trait that receives them.
//!
//! The batch coordinator emits one immutable [`BatchEvent`] per step:
//!
//! ```text
//! converting(1) → success|failed(1) → converting(2) → … → complete
//! ```
//!
//! Events arrive strictly in item-submission order no matter which worker
//! finishes first, and every batch ends with exactly one `complete` event,
//! cancelled or not.
//!
//! Observers run on the coordinator's task, so they must return quickly.
//! Anything slow (a UI repaint, a network push) belongs behind
//! [`crate::stream::event_channel`], which hands events to a stream instead.
//!
//! # Example
//!
//! ```rust
//! use mdbatch::{BatchEvent, BatchObserver};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let finished = AtomicUsize::new(0);
//! let observer = |event: &BatchEvent| {
//!     if matches!(event, BatchEvent::Success { .. } | BatchEvent::Failed { .. }) {
//!         finished.fetch_add(1, Ordering::SeqCst);
//!     }
//! };
//! observer.on_event(&BatchEvent::Complete {
//!     outcomes: vec![],
//!     progress: Default::default(),
//!     cancelled: false,
//! });
//! assert_eq!(finished.load(Ordering::SeqCst), 0);
//! ```

use crate::output::{BatchSnapshot, Outcome};
use serde::Serialize;

/// One step of a running batch.
///
/// `index` is the item's zero-based submission position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchEvent {
    /// About to dispatch `item`.
    Converting {
        index: usize,
        item: String,
        progress: BatchSnapshot,
    },
    /// Item finished and produced a file.
    Success {
        index: usize,
        outcome: Outcome,
        progress: BatchSnapshot,
    },
    /// Item failed or was skipped.
    Failed {
        index: usize,
        outcome: Outcome,
        progress: BatchSnapshot,
    },
    /// Batch ended. Emitted exactly once.
    Complete {
        outcomes: Vec<Outcome>,
        progress: BatchSnapshot,
        cancelled: bool,
    },
}

impl BatchEvent {
    /// Wire name of the event: `converting`, `success`, `failed`, `complete`.
    pub fn status(&self) -> &'static str {
        match self {
            BatchEvent::Converting { .. } => "converting",
            BatchEvent::Success { .. } => "success",
            BatchEvent::Failed { .. } => "failed",
            BatchEvent::Complete { .. } => "complete",
        }
    }

    /// Counters at the time of the event.
    pub fn progress(&self) -> &BatchSnapshot {
        match self {
            BatchEvent::Converting { progress, .. }
            | BatchEvent::Success { progress, .. }
            | BatchEvent::Failed { progress, .. }
            | BatchEvent::Complete { progress, .. } => progress,
        }
    }

    /// Submission index, for per-item events.
    pub fn index(&self) -> Option<usize> {
        match self {
            BatchEvent::Converting { index, .. }
            | BatchEvent::Success { index, .. }
            | BatchEvent::Failed { index, .. } => Some(*index),
            BatchEvent::Complete { .. } => None,
        }
    }
}

/// Receives batch events in order.
///
/// Called from the coordinator between dispatches; must not block.
pub trait BatchObserver: Send + Sync {
    fn on_event(&self, event: &BatchEvent);
}

impl<F> BatchObserver for F
where
    F: Fn(&BatchEvent) + Send + Sync,
{
    fn on_event(&self, event: &BatchEvent) {
        self(event)
    }
}

/// Discards every event.
pub struct NoopObserver;

impl BatchObserver for NoopObserver {
    fn on_event(&self, _event: &BatchEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn converting(index: usize) -> BatchEvent {
        BatchEvent::Converting {
            index,
            item: format!("item{index}"),
            progress: BatchSnapshot::default(),
        }
    }

    #[test]
    fn closure_observer_receives_events() {
        let seen = Mutex::new(Vec::new());
        let observer = |e: &BatchEvent| seen.lock().unwrap().push(e.index());
        observer.on_event(&converting(0));
        observer.on_event(&converting(1));
        assert_eq!(*seen.lock().unwrap(), [Some(0), Some(1)]);
    }

    #[test]
    fn events_serialise_with_status_tag() {
        let json = serde_json::to_value(converting(2)).unwrap();
        assert_eq!(json["status"], "converting");
        assert_eq!(json["index"], 2);
        assert_eq!(json["progress"]["total"], 0);
        assert_eq!(converting(2).status(), "converting");
    }
}
