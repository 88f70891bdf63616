//! Error types for the mdbatch library.
//!
//! Three error types reflect three distinct failure scopes:
//!
//! * [`MdBatchError`] is fatal: the operation cannot proceed at all
//!   (invalid settings, unreadable settings file). Returned as
//!   `Err(MdBatchError)` from fallible entry points.
//!
//! * [`ItemError`] is per item: a single item failed (extraction failed,
//!   nothing extracted, output already exists) but the rest of the batch is
//!   fine. Stored inside [`crate::output::Outcome`] so callers can inspect
//!   partial success rather than losing the whole batch to one bad file.
//!
//! * [`ExtractError`]: what an [`crate::pipeline::extract::Extractor`]
//!   reports. The Conversion Unit folds it into an [`ItemError`].
//!
//! Cancellation is not an error: a cancelled batch still returns every
//! outcome produced before dispatch stopped.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the mdbatch library.
///
/// Item-level failures use [`ItemError`] and are stored in
/// [`crate::output::Outcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum MdBatchError {
    /// Builder or settings-file validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The settings document is not valid JSON for [`crate::ConversionSettings`].
    #[error("Failed to parse settings: {0}")]
    SettingsParse(#[from] serde_json::Error),

    /// An input could not be read directly (enhance-only mode).
    #[error("Failed to read '{path}': {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single batch item.
///
/// The batch continues after any of these. `Skipped` is reported with its own
/// [`crate::output::OutcomeStatus::Skipped`] status and is not treated as a
/// hard failure by the CLI exit code.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemError {
    /// The extractor could not read or parse the source.
    #[error("Extraction failed for '{source_name}': {detail}")]
    Extraction { source_name: String, detail: String },

    /// The extractor does not handle this kind of input.
    #[error("Unsupported format '{extension}' for '{source_name}'")]
    UnsupportedFormat {
        source_name: String,
        extension: String,
    },

    /// Extraction succeeded but produced no text.
    #[error("No content extracted from '{source_name}'")]
    EmptyContent { source_name: String },

    /// Destination exists and the overwrite policy is `skip`.
    #[error("File exists (skipped): '{path}'")]
    Skipped { path: PathBuf },

    /// Creating the output directory or writing the file failed.
    #[error("Failed to write '{path}': {detail}")]
    Filesystem { path: PathBuf, detail: String },

    /// The worker running this item panicked or was aborted.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure reported by an extractor.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Source file does not exist.
    #[error("file not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Process may not read the source file.
    #[error("permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// No extraction backend for this extension.
    #[error("unsupported format '{extension}'")]
    Unsupported { extension: String },

    /// URL fetch failed.
    #[error("failed to download '{url}': {reason}")]
    Download { url: String, reason: String },

    /// URL fetch exceeded its timeout.
    #[error("download timed out after {secs}s for '{url}'")]
    Timeout { url: String, secs: u64 },

    /// Any other I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Backend-specific failure from a third-party extractor.
    #[error("{0}")]
    Other(String),
}

impl ExtractError {
    /// Fold into the per-item error recorded on an outcome.
    pub fn into_item_error(self, source_name: &str) -> ItemError {
        match self {
            ExtractError::Unsupported { extension } => ItemError::UnsupportedFormat {
                source_name: source_name.to_string(),
                extension,
            },
            other => ItemError::Extraction {
                source_name: source_name.to_string(),
                detail: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_display_mentions_path() {
        let e = ItemError::Skipped {
            path: PathBuf::from("out/doc.md"),
        };
        assert!(e.to_string().contains("skipped"));
        assert!(e.to_string().contains("doc.md"));
    }

    #[test]
    fn unsupported_maps_to_unsupported_format() {
        let e = ExtractError::Unsupported {
            extension: ".bin".into(),
        };
        assert_eq!(
            e.into_item_error("blob.bin"),
            ItemError::UnsupportedFormat {
                source_name: "blob.bin".into(),
                extension: ".bin".into(),
            }
        );
    }

    #[test]
    fn other_extract_errors_map_to_extraction() {
        let e = ExtractError::Timeout {
            url: "https://youtu.be/x".into(),
            secs: 5,
        };
        match e.into_item_error("clip") {
            ItemError::Extraction { source_name, detail } => {
                assert_eq!(source_name, "clip");
                assert!(detail.contains("5s"), "got: {detail}");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn item_error_serialises_with_kind_tag() {
        let e = ItemError::EmptyContent {
            source_name: "a.txt".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains(r#""kind":"empty_content""#), "got: {json}");
    }
}
