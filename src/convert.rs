//! The Conversion Unit: one item from source to written `.md` file.
//!
//! ```text
//! resolve ──▶ extract ──▶ enhance ──▶ name ──▶ write
//! ```
//!
//! [`convert_one`] never fails; every problem ends up in the returned
//! [`Outcome`], so one bad item cannot take down a batch.

use crate::config::{ConversionSettings, EnhancementSettings};
use crate::error::{ItemError, MdBatchError};
use crate::output::Outcome;
use crate::pipeline::enhance::enhance;
use crate::pipeline::extract::{self, Extractor};
use crate::pipeline::{input, write};
use std::path::Path;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Convert a single file or URL into `output_dir`.
pub async fn convert_one(
    source: &str,
    output_dir: &Path,
    settings: &ConversionSettings,
    extractor: &dyn Extractor,
) -> Outcome {
    let start = Instant::now();
    match try_convert(source, output_dir, settings, extractor).await {
        Ok(path) => {
            info!(
                "Converted {} → {} in {}ms",
                source,
                path.display(),
                start.elapsed().as_millis()
            );
            Outcome::succeeded(source, path)
        }
        Err(e) => {
            if matches!(e, ItemError::Skipped { .. }) {
                info!("{}", e);
            } else {
                warn!("{}", e);
            }
            Outcome::failed(source, e)
        }
    }
}

async fn try_convert(
    source: &str,
    output_dir: &Path,
    settings: &ConversionSettings,
    extractor: &dyn Extractor,
) -> Result<std::path::PathBuf, ItemError> {
    // ── Step 1: Resolve and extract ──────────────────────────────────────
    let resolved = input::resolve_source(source).await;
    let doc = extract::extract(&resolved, extractor)
        .await
        .map_err(|e| e.into_item_error(source))?;

    if doc.text.trim().is_empty() {
        return Err(ItemError::EmptyContent {
            source_name: source.to_string(),
        });
    }
    debug!("Extracted {} bytes from {}", doc.text.len(), source);

    // ── Step 2: Enhance (CPU-bound) ──────────────────────────────────────
    let enhancement = settings.enhancement();
    let markdown = tokio::task::spawn_blocking(move || {
        enhance(&doc.text, &doc.source_extension, &enhancement)
    })
    .await
    .map_err(|e| ItemError::Internal(format!("enhancement task failed: {e}")))?;

    // ── Step 3: Name and write ───────────────────────────────────────────
    let timestamp = settings.add_timestamp.then(unix_timestamp);
    let file_name = write::destination_name(&resolved.stem(), timestamp);
    write::write_output(output_dir, &file_name, &markdown, settings.overwrite_policy).await
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Enhance a local text file without writing anything.
///
/// The file is read as UTF-8 (lossily) and enhanced with its own extension as
/// the format hint. Used by the CLI's `--enhance-only` mode.
pub async fn enhance_file(
    path: impl AsRef<Path>,
    settings: &EnhancementSettings,
) -> Result<String, MdBatchError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| MdBatchError::InputRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let ext = input::ResolvedInput::Local(path.to_path_buf()).extension();
    let settings = *settings;

    tokio::task::spawn_blocking(move || enhance(&text, &ext, &settings))
        .await
        .map_err(|e| MdBatchError::Internal(format!("enhancement task failed: {e}")))
}
