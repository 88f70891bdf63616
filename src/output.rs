//! Result types: per-item outcomes, batch progress snapshots, and the final
//! batch report.

use crate::error::ItemError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How one item ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failed,
    /// Destination existed under the `skip` policy.
    Skipped,
}

/// The immutable result of converting one item.
///
/// Built once by the Conversion Unit and never mutated afterwards; the batch
/// only moves it into events and the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// The item as the caller supplied it (path or URL).
    pub source_name: String,
    pub success: bool,
    /// Written file; for a skip, the existing file that blocked the write.
    pub output_path: Option<PathBuf>,
    pub error: Option<ItemError>,
    pub status: OutcomeStatus,
}

impl Outcome {
    pub fn succeeded(source_name: impl Into<String>, output_path: PathBuf) -> Self {
        Self {
            source_name: source_name.into(),
            success: true,
            output_path: Some(output_path),
            error: None,
            status: OutcomeStatus::Success,
        }
    }

    /// Failure outcome. [`ItemError::Skipped`] gets the `skipped` status and
    /// keeps the blocking path.
    pub fn failed(source_name: impl Into<String>, error: ItemError) -> Self {
        let (status, output_path) = match &error {
            ItemError::Skipped { path } => (OutcomeStatus::Skipped, Some(path.clone())),
            _ => (OutcomeStatus::Failed, None),
        };
        Self {
            source_name: source_name.into(),
            success: false,
            output_path,
            error: Some(error),
            status,
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.status == OutcomeStatus::Skipped
    }
}

/// Lifecycle of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchPhase {
    #[default]
    Idle,
    Running,
    /// Dispatch stopped early on request.
    Cancelled,
    /// Every item was dispatched and finished.
    Completed,
}

/// Point-in-time copy of the batch counters, carried by every event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSnapshot {
    pub total: usize,
    pub completed: usize,
    pub successful: usize,
    /// Includes skipped items.
    pub failed: usize,
    pub cancel_requested: bool,
    pub current_item: Option<String>,
}

/// Everything a finished batch produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// One per dispatched item, in submission order.
    pub outcomes: Vec<Outcome>,
    pub progress: BatchSnapshot,
    pub phase: BatchPhase,
    pub duration_ms: u64,
}

impl BatchReport {
    pub fn was_cancelled(&self) -> bool {
        self.phase == BatchPhase::Cancelled
    }

    /// Failures other than skips.
    pub fn hard_failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_outcome_keeps_path_and_status() {
        let o = Outcome::failed(
            "doc.txt",
            ItemError::Skipped {
                path: "out/doc.md".into(),
            },
        );
        assert!(!o.success);
        assert!(o.is_skipped());
        assert_eq!(o.output_path, Some(PathBuf::from("out/doc.md")));
    }

    #[test]
    fn failure_outcome_has_no_path() {
        let o = Outcome::failed(
            "a.txt",
            ItemError::EmptyContent {
                source_name: "a.txt".into(),
            },
        );
        assert_eq!(o.status, OutcomeStatus::Failed);
        assert!(o.output_path.is_none());
    }

    #[test]
    fn hard_failures_exclude_skips() {
        let report = BatchReport {
            outcomes: vec![
                Outcome::succeeded("a", "a.md".into()),
                Outcome::failed("b", ItemError::Skipped { path: "b.md".into() }),
                Outcome::failed("c", ItemError::Internal("boom".into())),
            ],
            progress: BatchSnapshot::default(),
            phase: BatchPhase::Completed,
            duration_ms: 0,
        };
        let names: Vec<_> = report.hard_failures().map(|o| o.source_name.as_str()).collect();
        assert_eq!(names, ["c"]);
        assert!(!report.was_cancelled());
    }

    #[test]
    fn status_serialises_lowercase() {
        let json = serde_json::to_string(&OutcomeStatus::Skipped).unwrap();
        assert_eq!(json, r#""skipped""#);
    }
}
