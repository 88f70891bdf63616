//! CLI binary for mdbatch.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionSettings`, runs the batch, and renders its event stream.

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use mdbatch::pipeline::input::{is_supported, is_url};
use mdbatch::{
    enhance_file, spawn_batch, BatchEvent, BatchObserver, BatchReport, BuiltinExtractor,
    CancelToken, ConversionSettings, EnhancementLevel, OutcomeStatus, OverwritePolicy,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── Terminal progress using indicatif ────────────────────────────────────────

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Renders batch events as a progress bar plus one log line per item.
///
/// Without a bar (`--no-progress`, `--json`) only the per-item lines are
/// printed, and with `--quiet` nothing is.
struct CliProgress {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl CliProgress {
    fn new(total: usize, show_bar: bool, quiet: bool) -> Self {
        let bar = show_bar.then(|| {
            let bar = ProgressBar::new(total as u64);
            let style = ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} files  \
                 ⏱ {elapsed_precise}  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS);
            bar.set_style(style);
            bar.set_prefix("Converting");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        Self { bar, quiet }
    }

    fn line(&self, text: String) {
        if self.quiet {
            return;
        }
        match &self.bar {
            Some(bar) => bar.println(text),
            None => eprintln!("{text}"),
        }
    }

    fn note_cancel(&self) {
        self.line(format!(
            "{} Cancelling: running items will finish, nothing new starts",
            yellow("⚠")
        ));
        if let Some(bar) = &self.bar {
            bar.set_prefix("Cancelling");
        }
    }
}

impl BatchObserver for CliProgress {
    fn on_event(&self, event: &BatchEvent) {
        match event {
            BatchEvent::Converting { item, .. } => {
                if let Some(bar) = &self.bar {
                    bar.set_message(item.clone());
                }
            }
            BatchEvent::Success { outcome, .. } | BatchEvent::Failed { outcome, .. } => {
                let line = match (outcome.status, &outcome.output_path, &outcome.error) {
                    (OutcomeStatus::Success, Some(path), _) => format!(
                        "  {} {}  {}",
                        green("✓"),
                        outcome.source_name,
                        dim(&format!("→ {}", path.display()))
                    ),
                    (OutcomeStatus::Skipped, _, _) => format!(
                        "  {} {}  {}",
                        yellow("↷"),
                        outcome.source_name,
                        dim("exists, skipped")
                    ),
                    (_, _, error) => {
                        let msg = error
                            .as_ref()
                            .map(|e| e.to_string())
                            .unwrap_or_else(|| "unknown error".to_string());
                        format!("  {} {}  {}", red("✗"), outcome.source_name, red(&truncate(&msg, 80)))
                    }
                };
                self.line(line);
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
            }
            BatchEvent::Complete { .. } => {
                if let Some(bar) = &self.bar {
                    bar.finish_and_clear();
                }
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max - 1).collect();
        format!("{head}\u{2026}")
    } else {
        s.to_string()
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a folder of documents into ./markdown
  mdbatch docs/

  # Recurse, four workers, advanced enhancement
  mdbatch -r -w 4 --level advanced docs/ -o out/

  # Keep existing outputs, write doc_1.md, doc_2.md, … instead
  mdbatch --overwrite rename report.txt

  # Video link or internet shortcut
  mdbatch https://youtu.be/abc123 talk.url

  # Enhance a text file and print the Markdown
  mdbatch --enhance-only notes.txt

  # Machine-readable report
  mdbatch --json docs/ > report.json

SETTINGS FILE (--settings):
  {
    "enhancement_level": "standard",   // basic | standard | advanced
    "preserve_structure": true,
    "overwrite_policy": "skip",        // skip | overwrite | rename
    "add_timestamp": false,
    "parallel_workers": 4              // 1–8
  }
  Flags given on the command line override values from the file.

ENVIRONMENT VARIABLES:
  MDBATCH_OUTPUT_DIR, MDBATCH_LEVEL, MDBATCH_OVERWRITE, MDBATCH_WORKERS,
  MDBATCH_TIMESTAMP, MDBATCH_SETTINGS, MDBATCH_DOWNLOAD_TIMEOUT
  RUST_LOG                 Override log filtering (e.g. mdbatch=debug)

Press Ctrl-C once to stop dispatching new items; items already running
finish and are reported.
"#;

/// Batch-convert documents to structured Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "mdbatch",
    version,
    about = "Batch-convert documents, links and shortcuts to structured Markdown",
    long_about = "Convert many documents at once to Markdown. Extracted text is rebuilt into \
headings, lists, tables and links by a fixed set of heuristic passes. Items run on a bounded \
worker pool and are reported in submission order.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Files, directories, or HTTP/HTTPS URLs.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Directory for the generated .md files.
    #[arg(short, long, env = "MDBATCH_OUTPUT_DIR", default_value = "markdown")]
    output_dir: PathBuf,

    /// Recurse into sub-directories of directory inputs.
    #[arg(short, long)]
    recursive: bool,

    /// Load settings from a JSON file.
    #[arg(long, env = "MDBATCH_SETTINGS")]
    settings: Option<PathBuf>,

    /// Enhancement level.
    #[arg(short, long, env = "MDBATCH_LEVEL", value_enum)]
    level: Option<LevelArg>,

    /// What to do when the output file already exists.
    #[arg(long, env = "MDBATCH_OVERWRITE", value_enum)]
    overwrite: Option<OverwriteArg>,

    /// Run the full heuristic passes on Markdown sources too.
    #[arg(long)]
    no_preserve_structure: bool,

    /// Append `_{unix seconds}` to output names.
    #[arg(long, env = "MDBATCH_TIMESTAMP")]
    timestamp: bool,

    /// Number of parallel workers (1–8).
    #[arg(short, long, env = "MDBATCH_WORKERS",
          value_parser = clap::value_parser!(u8).range(1..=8))]
    workers: Option<u8>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "MDBATCH_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Enhance local files and print the Markdown to stdout; nothing is written.
    #[arg(long)]
    enhance_only: bool,

    /// Print the batch report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LevelArg {
    Basic,
    Standard,
    Advanced,
}

impl From<LevelArg> for EnhancementLevel {
    fn from(v: LevelArg) -> Self {
        match v {
            LevelArg::Basic => EnhancementLevel::Basic,
            LevelArg::Standard => EnhancementLevel::Standard,
            LevelArg::Advanced => EnhancementLevel::Advanced,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OverwriteArg {
    Skip,
    Overwrite,
    Rename,
}

impl From<OverwriteArg> for OverwritePolicy {
    fn from(v: OverwriteArg) -> Self {
        match v {
            OverwriteArg::Skip => OverwritePolicy::Skip,
            OverwriteArg::Overwrite => OverwritePolicy::Overwrite,
            OverwriteArg::Rename => OverwritePolicy::Rename,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs would tear the progress bar; only errors show with it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.enhance_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let settings = build_settings(&cli).await?;

    // ── Enhance-only mode ────────────────────────────────────────────────
    if cli.enhance_only {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        for input in &cli.inputs {
            let markdown = enhance_file(input, &settings.enhancement())
                .await
                .with_context(|| format!("Failed to enhance {input}"))?;
            handle
                .write_all(markdown.as_bytes())
                .context("Failed to write to stdout")?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    // ── Collect items ────────────────────────────────────────────────────
    let items = collect_inputs(&cli.inputs, cli.recursive)?;
    if items.is_empty() {
        anyhow::bail!("No supported files found in the given inputs");
    }
    if !cli.quiet && !cli.json {
        eprintln!(
            "{} {} items → {}  {}",
            bold("◆"),
            items.len(),
            cli.output_dir.display(),
            dim(&format!(
                "level={} overwrite={} workers={}",
                settings.enhancement_level, settings.overwrite_policy, settings.parallel_workers
            )),
        );
    }

    // ── Run batch ────────────────────────────────────────────────────────
    let display = CliProgress::new(items.len(), show_progress, cli.quiet || cli.json);
    let cancel = CancelToken::new();
    let extractor = Arc::new(BuiltinExtractor::new().with_download_timeout(cli.download_timeout));
    let (handle, mut events) = spawn_batch(
        items,
        cli.output_dir.clone(),
        settings,
        extractor,
        cancel.clone(),
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;
    loop {
        tokio::select! {
            event = events.next() => match event {
                Some(event) => display.on_event(&event),
                None => break,
            },
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                cancel.cancel();
                display.note_cancel();
            }
        }
    }

    let report = handle.await.context("Batch task failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&report);
    }

    Ok(if report.hard_failures().next().is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_summary(report: &BatchReport) {
    let p = &report.progress;
    let skipped = report.outcomes.iter().filter(|o| o.is_skipped()).count();
    let hard_failed = p.failed - skipped;
    let mark = if hard_failed == 0 && !report.was_cancelled() {
        green("✔")
    } else if p.successful == 0 && hard_failed > 0 {
        red("✘")
    } else {
        yellow("⚠")
    };
    eprintln!(
        "{mark} {}/{} converted  {} failed  {} skipped  {}ms{}",
        bold(&p.successful.to_string()),
        p.total,
        hard_failed,
        skipped,
        report.duration_ms,
        if report.was_cancelled() {
            format!("  ({} not started)", p.total - p.completed)
        } else {
            String::new()
        }
    );
}

/// Start from `--settings` (or defaults) and apply explicit flags on top.
async fn build_settings(cli: &Cli) -> Result<ConversionSettings> {
    let base = match &cli.settings {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read settings from {:?}", path))?;
            ConversionSettings::from_json(&json)
                .with_context(|| format!("Invalid settings file {:?}", path))?
        }
        None => ConversionSettings::default(),
    };

    ConversionSettings::builder()
        .enhancement_level(cli.level.map(Into::into).unwrap_or(base.enhancement_level))
        .overwrite_policy(cli.overwrite.map(Into::into).unwrap_or(base.overwrite_policy))
        .preserve_structure(base.preserve_structure && !cli.no_preserve_structure)
        .add_timestamp(base.add_timestamp || cli.timestamp)
        .parallel_workers(cli.workers.map(usize::from).unwrap_or(base.parallel_workers))
        .build()
        .context("Invalid configuration")
}

/// Expand directories to their supported files; URLs and files pass through.
fn collect_inputs(inputs: &[String], recursive: bool) -> Result<Vec<String>> {
    let mut items = Vec::new();
    for input in inputs {
        let path = Path::new(input);
        if is_url(input) || !path.is_dir() {
            items.push(input.clone());
            continue;
        }
        let mut found = Vec::new();
        walk_dir(path, recursive, &mut found)?;
        found.sort();
        items.extend(found.into_iter().map(|p| p.to_string_lossy().into_owned()));
    }
    Ok(items)
}

fn walk_dir(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read directory {:?}", dir))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read directory {:?}", dir))?
            .path();
        if path.is_dir() {
            if recursive {
                walk_dir(&path, recursive, out)?;
            }
        } else if is_supported(&path) {
            out.push(path);
        }
    }
    Ok(())
}
