//! # mdbatch
//!
//! Batch-convert documents to structured Markdown.
//!
//! ## Why this crate?
//!
//! Document extractors return text whose structure only survives as visual
//! hints: a shouted title, a `•` bullet, columns lined up with spaces. This
//! crate rebuilds that structure as Markdown with a fixed, ordered set of
//! deterministic passes, and drives many such conversions at once on a
//! bounded worker pool with ordered progress events and cooperative
//! cancellation.
//!
//! ## Pipeline Overview
//!
//! ```text
//! items ──▶ run_batch (pool of 1–8 workers, ordered events)
//!             │
//!             └─ per item: convert_one
//!                  ├─ 1. Resolve   file, URL, or .url/.txt shortcut
//!                  ├─ 2. Extract   Extractor file or URL mode
//!                  ├─ 3. Enhance   up to 11 passes (spawn_blocking)
//!                  ├─ 4. Name      {stem}[_{ts}][_{n}].md under overwrite policy
//!                  └─ 5. Write     atomic temp file + rename
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mdbatch::{run_batch, BatchEvent, BuiltinExtractor, CancelToken, ConversionSettings};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = ConversionSettings::builder().parallel_workers(2).build()?;
//!     let report = run_batch(
//!         vec!["notes.txt".into(), "https://youtu.be/abc".into()],
//!         Path::new("markdown"),
//!         &settings,
//!         Arc::new(BuiltinExtractor::new()),
//!         &|event: &BatchEvent| eprintln!("{}", event.status()),
//!         &CancelToken::new(),
//!     )
//!     .await;
//!     println!("{} converted", report.progress.successful);
//!     Ok(())
//! }
//! ```
//!
//! Just the enhancer:
//!
//! ```rust
//! use mdbatch::{enhance, EnhancementSettings};
//!
//! let md = enhance("REPORT\n• first\n• second\n", ".txt", &EnhancementSettings::default());
//! assert!(md.starts_with("# REPORT\n\n- first\n- second"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mdbatch` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! mdbatch = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{run_batch, CancelToken};
pub use config::{
    ConversionSettings, ConversionSettingsBuilder, EnhancementLevel, EnhancementSettings,
    OverwritePolicy,
};
pub use convert::{convert_one, enhance_file};
pub use error::{ExtractError, ItemError, MdBatchError};
pub use output::{BatchPhase, BatchReport, BatchSnapshot, Outcome, OutcomeStatus};
pub use pipeline::enhance::enhance;
pub use pipeline::extract::{BuiltinExtractor, Extractor};
pub use progress::{BatchEvent, BatchObserver, NoopObserver};
pub use stream::{event_channel, spawn_batch, EventStream};
