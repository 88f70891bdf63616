//! Output naming and atomic writes.
//!
//! Destination names follow `{stem}[_{timestamp}][_{n}].md`. The exists-check
//! and the write that follows it run under a per-directory async lock, so two
//! items in one batch that resolve to the same name under the rename policy
//! get `_1` and `_2` rather than both claiming `_1`. The lock is in-process
//! only; another process writing the same directory can still race.

use crate::config::OverwritePolicy;
use crate::error::ItemError;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// `{stem}[_{timestamp}].md`.
pub fn destination_name(stem: &str, timestamp: Option<u64>) -> String {
    match timestamp {
        Some(ts) => format!("{stem}_{ts}.md"),
        None => format!("{stem}.md"),
    }
}

/// Result of resolving a destination against the overwrite policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteTarget {
    /// Free, or replaced under `overwrite`.
    Write(PathBuf),
    /// Exists and the policy is `skip`.
    Skip(PathBuf),
}

/// Pick the final path for `base` under `policy`. Does not write.
pub async fn resolve_target(base: &Path, policy: OverwritePolicy) -> WriteTarget {
    if !exists(base).await {
        return WriteTarget::Write(base.to_path_buf());
    }
    match policy {
        OverwritePolicy::Skip => WriteTarget::Skip(base.to_path_buf()),
        OverwritePolicy::Overwrite => WriteTarget::Write(base.to_path_buf()),
        OverwritePolicy::Rename => {
            let stem = base
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut n: u32 = 1;
            loop {
                let candidate = base.with_file_name(format!("{stem}_{n}.md"));
                if !exists(&candidate).await {
                    return WriteTarget::Write(candidate);
                }
                n += 1;
            }
        }
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

// One lock per output directory, shared by every worker in the process.
// Keys are canonical paths so `out` and `./out` share a lock.
static DIR_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn dir_lock(dir: &Path) -> Arc<tokio::sync::Mutex<()>> {
    let mut locks = DIR_LOCKS.lock().unwrap_or_else(|e| e.into_inner());
    Arc::clone(locks.entry(dir.to_path_buf()).or_default())
}

/// Write `markdown` as `file_name` inside `output_dir` under `policy`.
///
/// Creates `output_dir` (with parents) first; concurrent creation is fine.
/// Returns the path written, or [`ItemError::Skipped`] when the destination
/// exists and `policy` is `skip`.
pub async fn write_output(
    output_dir: &Path,
    file_name: &str,
    markdown: &str,
    policy: OverwritePolicy,
) -> Result<PathBuf, ItemError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| ItemError::Filesystem {
            path: output_dir.to_path_buf(),
            detail: e.to_string(),
        })?;

    let canonical = tokio::fs::canonicalize(output_dir)
        .await
        .map_err(|e| ItemError::Filesystem {
            path: output_dir.to_path_buf(),
            detail: e.to_string(),
        })?;
    let lock = dir_lock(&canonical);
    let _guard = lock.lock().await;

    let path = match resolve_target(&output_dir.join(file_name), policy).await {
        WriteTarget::Write(path) => path,
        WriteTarget::Skip(path) => {
            info!("Skipping existing file: {}", path.display());
            return Err(ItemError::Skipped { path });
        }
    };

    // Atomic write: write to temp, then rename
    let tmp_path = path.with_extension("md.tmp");
    let fs_err = |e: std::io::Error| ItemError::Filesystem {
        path: path.clone(),
        detail: e.to_string(),
    };
    tokio::fs::write(&tmp_path, markdown).await.map_err(fs_err)?;
    tokio::fs::rename(&tmp_path, &path).await.map_err(fs_err)?;

    debug!("Wrote {} bytes to {}", markdown.len(), path.display());
    Ok(path)
}
