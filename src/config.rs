//! Settings types for enhancement and batch conversion.
//!
//! All conversion behaviour is controlled through [`ConversionSettings`],
//! built via its [`ConversionSettingsBuilder`] or deserialised from the JSON
//! document a settings UI writes. The settings are owned by the caller; the
//! batch pipeline only ever reads them, so one value can be shared by every
//! worker without synchronisation.

use crate::error::MdBatchError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest accepted worker-pool size.
pub const MIN_WORKERS: usize = 1;
/// Largest accepted worker-pool size.
pub const MAX_WORKERS: usize = 8;

/// Settings for a batch conversion.
///
/// # Example
/// ```rust
/// use mdbatch::{ConversionSettings, EnhancementLevel, OverwritePolicy};
///
/// let settings = ConversionSettings::builder()
///     .enhancement_level(EnhancementLevel::Advanced)
///     .overwrite_policy(OverwritePolicy::Rename)
///     .parallel_workers(2)
///     .build()
///     .unwrap();
/// assert_eq!(settings.parallel_workers, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSettings {
    /// Which enhancement passes run. Default: [`EnhancementLevel::Standard`].
    pub enhancement_level: EnhancementLevel,

    /// Keep Markdown sources as Markdown: `.md` inputs only get their
    /// headings, bullets and spacing normalised. Default: true.
    pub preserve_structure: bool,

    /// What to do when the destination file already exists. Default: skip.
    pub overwrite_policy: OverwritePolicy,

    /// Append `_{unix seconds}` to every output stem. Default: false.
    pub add_timestamp: bool,

    /// Worker-pool size, 1–8. Default: 4.
    pub parallel_workers: usize,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            enhancement_level: EnhancementLevel::default(),
            preserve_structure: true,
            overwrite_policy: OverwritePolicy::default(),
            add_timestamp: false,
            parallel_workers: 4,
        }
    }
}

impl ConversionSettings {
    /// Create a new builder for `ConversionSettings`.
    pub fn builder() -> ConversionSettingsBuilder {
        ConversionSettingsBuilder {
            settings: Self::default(),
        }
    }

    /// Parse the externally owned settings document and validate it.
    ///
    /// Missing keys take their defaults, so a partial document is fine.
    pub fn from_json(json: &str) -> Result<Self, MdBatchError> {
        let settings: ConversionSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// The subset of settings the Structural Enhancer consumes.
    pub fn enhancement(&self) -> EnhancementSettings {
        EnhancementSettings {
            level: self.enhancement_level,
            preserve_structure: self.preserve_structure,
        }
    }

    fn validate(&self) -> Result<(), MdBatchError> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&self.parallel_workers) {
            return Err(MdBatchError::InvalidConfig(format!(
                "parallel_workers must be {MIN_WORKERS}–{MAX_WORKERS}, got {}",
                self.parallel_workers
            )));
        }
        Ok(())
    }
}

/// Builder for [`ConversionSettings`].
#[derive(Debug)]
pub struct ConversionSettingsBuilder {
    settings: ConversionSettings,
}

impl ConversionSettingsBuilder {
    pub fn enhancement_level(mut self, level: EnhancementLevel) -> Self {
        self.settings.enhancement_level = level;
        self
    }

    pub fn preserve_structure(mut self, v: bool) -> Self {
        self.settings.preserve_structure = v;
        self
    }

    pub fn overwrite_policy(mut self, policy: OverwritePolicy) -> Self {
        self.settings.overwrite_policy = policy;
        self
    }

    pub fn add_timestamp(mut self, v: bool) -> Self {
        self.settings.add_timestamp = v;
        self
    }

    pub fn parallel_workers(mut self, n: usize) -> Self {
        self.settings.parallel_workers = n.clamp(MIN_WORKERS, MAX_WORKERS);
        self
    }

    /// Build the settings, validating constraints.
    pub fn build(self) -> Result<ConversionSettings, MdBatchError> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

/// Settings for a single [`crate::enhance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancementSettings {
    pub level: EnhancementLevel,
    pub preserve_structure: bool,
}

impl Default for EnhancementSettings {
    fn default() -> Self {
        ConversionSettings::default().enhancement()
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Tier controlling which enhancement passes run.
///
/// Each level runs every pass of the level below it plus its own:
///
/// | Level | Passes |
/// |-------|--------|
/// | Basic | line endings, headings, lists, spacing |
/// | Standard | Basic + tables, links, emphasis, code blocks |
/// | Advanced | Standard + title spacing, table of contents, readability |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementLevel {
    Basic,
    #[default]
    Standard,
    Advanced,
}

impl fmt::Display for EnhancementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnhancementLevel::Basic => write!(f, "basic"),
            EnhancementLevel::Standard => write!(f, "standard"),
            EnhancementLevel::Advanced => write!(f, "advanced"),
        }
    }
}

/// What to do when the destination `.md` file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Leave the existing file alone and report the item as skipped.
    #[default]
    Skip,
    /// Replace the existing file.
    Overwrite,
    /// Write to `{stem}_1.md`, `{stem}_2.md`, … whichever is free first.
    Rename,
}

impl fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverwritePolicy::Skip => write!(f, "skip"),
            OverwritePolicy::Overwrite => write!(f, "overwrite"),
            OverwritePolicy::Rename => write!(f, "rename"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_settings_surface() {
        let s = ConversionSettings::default();
        assert_eq!(s.enhancement_level, EnhancementLevel::Standard);
        assert!(s.preserve_structure);
        assert_eq!(s.overwrite_policy, OverwritePolicy::Skip);
        assert!(!s.add_timestamp);
        assert_eq!(s.parallel_workers, 4);
    }

    #[test]
    fn builder_clamps_workers() {
        let s = ConversionSettings::builder()
            .parallel_workers(32)
            .build()
            .unwrap();
        assert_eq!(s.parallel_workers, MAX_WORKERS);

        let s = ConversionSettings::builder()
            .parallel_workers(0)
            .build()
            .unwrap();
        assert_eq!(s.parallel_workers, MIN_WORKERS);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(EnhancementLevel::Basic < EnhancementLevel::Standard);
        assert!(EnhancementLevel::Standard < EnhancementLevel::Advanced);
    }

    #[test]
    fn from_json_reads_partial_document() {
        let s = ConversionSettings::from_json(
            r#"{"enhancement_level": "advanced", "overwrite_policy": "rename"}"#,
        )
        .unwrap();
        assert_eq!(s.enhancement_level, EnhancementLevel::Advanced);
        assert_eq!(s.overwrite_policy, OverwritePolicy::Rename);
        assert_eq!(s.parallel_workers, 4);
    }

    #[test]
    fn from_json_rejects_out_of_range_workers() {
        let err = ConversionSettings::from_json(r#"{"parallel_workers": 12}"#).unwrap_err();
        assert!(matches!(err, MdBatchError::InvalidConfig(_)), "got: {err}");
    }

    #[test]
    fn from_json_rejects_unknown_level() {
        let err = ConversionSettings::from_json(r#"{"enhancement_level": "extreme"}"#).unwrap_err();
        assert!(matches!(err, MdBatchError::SettingsParse(_)));
    }

    #[test]
    fn enhancement_subset() {
        let s = ConversionSettings::builder()
            .enhancement_level(EnhancementLevel::Basic)
            .preserve_structure(false)
            .build()
            .unwrap();
        assert_eq!(
            s.enhancement(),
            EnhancementSettings {
                level: EnhancementLevel::Basic,
                preserve_structure: false,
            }
        );
    }
}
