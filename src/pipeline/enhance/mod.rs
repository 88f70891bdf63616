//! Structural Enhancer: rebuild Markdown structure from loosely-structured
//! extracted text.
//!
//! Extractors hand back text whose structure survived only as visual hints:
//! a shouted title line, a `•` glyph, columns aligned with runs of spaces. The
//! enhancer turns those hints into Markdown through an ordered list of pure
//! `&str → String` passes. Composition order is part of the contract: heading
//! detection must see the raw bullets before list detection rewrites them,
//! and spacing cleanup must run after both so it sees the final line kinds.
//!
//! ## Passes per level
//!
//! | # | Pass | Basic | Standard | Advanced |
//! |---|------|:-----:|:--------:|:--------:|
//! | 1 | line endings | ✓ | ✓ | ✓ |
//! | 2 | headings | ✓ | ✓ | ✓ |
//! | 3 | lists | ✓ | ✓ | ✓ |
//! | 4 | spacing | ✓ | ✓ | ✓ |
//! | 5 | tables | | ✓ | ✓ |
//! | 6 | links | | ✓ | ✓ |
//! | 7 | emphasis | | ✓ | ✓ |
//! | 8 | code blocks | | ✓ | ✓ |
//! | 9 | title spacing | | | ✓ |
//! | 10 | table of contents | | | ✓ |
//! | 11 | readability | | | ✓ |
//!
//! Markdown sources with `preserve_structure` skip all of this and only get
//! their existing headings, bullets and spacing normalised.

mod document;
mod headings;
mod inline;
mod lists;
mod normalize;
mod tables;

pub use document::TocEntry;
pub use headings::HeadingCandidate;
pub use lists::ListItem;
pub use tables::TableBlock;

use crate::config::{EnhancementLevel, EnhancementSettings};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Instant;
use tracing::debug;

/// One named text → text transform.
#[derive(Clone, Copy)]
pub struct Pass {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

impl std::fmt::Debug for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Pass").field(&self.name).finish()
    }
}

const BASIC_PASSES: &[Pass] = &[
    Pass {
        name: "line_endings",
        apply: normalize::fix_line_endings,
    },
    Pass {
        name: "headings",
        apply: headings::enhance_headings,
    },
    Pass {
        name: "lists",
        apply: lists::enhance_lists,
    },
    Pass {
        name: "spacing",
        apply: normalize::clean_spacing,
    },
];

const STANDARD_PASSES: &[Pass] = &[
    Pass {
        name: "tables",
        apply: tables::enhance_tables,
    },
    Pass {
        name: "links",
        apply: inline::enhance_links,
    },
    Pass {
        name: "emphasis",
        apply: inline::enhance_emphasis,
    },
    Pass {
        name: "code_blocks",
        apply: inline::enhance_code_blocks,
    },
];

const ADVANCED_PASSES: &[Pass] = &[
    Pass {
        name: "structure",
        apply: document::enhance_structure,
    },
    Pass {
        name: "table_of_contents",
        apply: document::add_table_of_contents,
    },
    Pass {
        name: "readability",
        apply: document::optimize_readability,
    },
];

const MARKDOWN_PASSES: &[Pass] = &[
    Pass {
        name: "standardize_headings",
        apply: normalize::standardize_headings,
    },
    Pass {
        name: "standardize_lists",
        apply: normalize::standardize_lists,
    },
    Pass {
        name: "spacing",
        apply: normalize::clean_spacing,
    },
];

/// The ordered heuristic passes run at `level`.
pub fn passes(level: EnhancementLevel) -> impl Iterator<Item = &'static Pass> {
    let standard: &'static [Pass] = if level >= EnhancementLevel::Standard {
        STANDARD_PASSES
    } else {
        &[]
    };
    let advanced: &'static [Pass] = if level >= EnhancementLevel::Advanced {
        ADVANCED_PASSES
    } else {
        &[]
    };
    BASIC_PASSES.iter().chain(standard).chain(advanced)
}

/// The normalise-existing passes run on Markdown sources.
pub fn markdown_passes() -> impl Iterator<Item = &'static Pass> {
    MARKDOWN_PASSES.iter()
}

/// Enhance extracted text into structured Markdown.
///
/// Never fails: malformed input just matches fewer rules. Empty or
/// whitespace-only input is returned unchanged.
///
/// `source_extension` is the original file's extension (`".md"`, `"pdf"`, or
/// `""` for URLs); it only matters for recognising Markdown sources.
pub fn enhance(text: &str, source_extension: &str, settings: &EnhancementSettings) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    if settings.preserve_structure && is_markdown_extension(source_extension) {
        run_passes(text, markdown_passes())
    } else {
        run_passes(text, passes(settings.level))
    }
}

fn run_passes<'a>(text: &str, passes: impl Iterator<Item = &'a Pass>) -> String {
    passes.fold(text.to_string(), |current, pass| {
        let start = Instant::now();
        let next = (pass.apply)(&current);
        debug!(
            "pass {}: {} → {} bytes in {:?}",
            pass.name,
            current.len(),
            next.len(),
            start.elapsed()
        );
        next
    })
}

/// True for `md`/`markdown`, with or without the leading dot, any case.
pub fn is_markdown_extension(ext: &str) -> bool {
    let ext = ext.trim_start_matches('.');
    ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown")
}

// ── Shared line predicates ───────────────────────────────────────────────────

static RE_ATX_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s").unwrap());

/// `# Title` … `###### Title`: one to six hashes followed by whitespace.
pub(crate) fn is_atx_heading(line: &str) -> bool {
    RE_ATX_HEADING.is_match(line)
}

/// Ends in sentence punctuation (`.`, `!`, `?`).
pub(crate) fn ends_sentence(line: &str) -> bool {
    line.ends_with(['.', '!', '?'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(level: EnhancementLevel) -> EnhancementSettings {
        EnhancementSettings {
            level,
            preserve_structure: true,
        }
    }

    fn names(level: EnhancementLevel) -> Vec<&'static str> {
        passes(level).map(|p| p.name).collect()
    }

    #[test]
    fn each_level_extends_the_one_below() {
        let basic = names(EnhancementLevel::Basic);
        let standard = names(EnhancementLevel::Standard);
        let advanced = names(EnhancementLevel::Advanced);

        assert_eq!(basic, ["line_endings", "headings", "lists", "spacing"]);
        assert_eq!(&standard[..basic.len()], &basic[..]);
        assert_eq!(
            &standard[basic.len()..],
            ["tables", "links", "emphasis", "code_blocks"]
        );
        assert_eq!(&advanced[..standard.len()], &standard[..]);
        assert_eq!(
            &advanced[standard.len()..],
            ["structure", "table_of_contents", "readability"]
        );
    }

    #[test]
    fn empty_and_whitespace_input_unchanged() {
        for input in ["", "   ", "\n\n", " \t\n  "] {
            for level in [
                EnhancementLevel::Basic,
                EnhancementLevel::Standard,
                EnhancementLevel::Advanced,
            ] {
                assert_eq!(enhance(input, ".txt", &settings(level)), input);
            }
        }
    }

    #[test]
    fn markdown_source_only_normalised() {
        let input = "#Intro\nSOME CAPS LINE\n* one\n+ two\n";
        let out = enhance(input, ".md", &settings(EnhancementLevel::Advanced));
        assert_eq!(out, "# Intro\n\nSOME CAPS LINE\n- one\n- two\n");
    }

    #[test]
    fn markdown_source_without_preserve_runs_heuristics() {
        let input = "intro text that is long enough to not be a title at all, really.\nSOME CAPS LINE\nbody";
        let s = EnhancementSettings {
            level: EnhancementLevel::Basic,
            preserve_structure: false,
        };
        let out = enhance(input, "md", &s);
        assert!(out.contains("# SOME CAPS LINE"), "got: {out}");
    }

    #[test]
    fn markdown_extension_detection() {
        assert!(is_markdown_extension(".md"));
        assert!(is_markdown_extension("MD"));
        assert!(is_markdown_extension(".markdown"));
        assert!(!is_markdown_extension(".txt"));
        assert!(!is_markdown_extension(""));
    }

    #[test]
    fn all_caps_outranks_list_lookahead() {
        let out = enhance("NOTES\n- item", ".txt", &settings(EnhancementLevel::Basic));
        assert_eq!(out.lines().next(), Some("# NOTES"));
    }

    #[test]
    fn setext_titles_become_atx() {
        let s = settings(EnhancementLevel::Basic);
        assert_eq!(enhance("Title\n===\n", ".txt", &s), "# Title\n");
        assert_eq!(enhance("Title\n---\n", ".txt", &s), "## Title\n");
    }

    #[test]
    fn toc_only_with_three_headings() {
        let s = settings(EnhancementLevel::Advanced);

        let three = "MAIN TITLE\nIntro paragraph that explains the document in full.\nBackground:\nSome background text goes here.\nMethods:\nSome methods text goes here.\n";
        let out = enhance(three, ".txt", &s);
        assert!(out.contains("## Table of Contents"), "got:\n{out}");
        assert!(out.contains("  - [Background:](#background)"), "got:\n{out}");

        let two = "MAIN TITLE\nIntro paragraph that explains the document in full.\nBackground:\nSome background text goes here.\n";
        let out = enhance(two, ".txt", &s);
        assert!(!out.contains("Table of Contents"), "got:\n{out}");
    }

    #[test]
    fn advanced_output_ends_with_single_newline() {
        let out = enhance(
            "REPORT\nFirst sentence here.\nSecond one follows.\n\n\n\n",
            ".txt",
            &settings(EnhancementLevel::Advanced),
        );
        assert!(out.ends_with('\n'));
        assert!(!out.ends_with("\n\n"));
    }
}
