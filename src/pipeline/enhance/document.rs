//! Whole-document passes run at the Advanced level.

use super::is_atx_heading;
use once_cell::sync::Lazy;
use regex::Regex;

fn is_title(line: &str) -> bool {
    line.trim().starts_with("# ")
}

// ── Pass 9: title spacing ────────────────────────────────────────────────────

/// Ensure the first level-1 heading is followed by a blank line.
pub(crate) fn enhance_structure(input: &str) -> String {
    let mut lines: Vec<&str> = input.split('\n').collect();
    if let Some(title) = lines.iter().position(|l| is_title(l)) {
        if lines.get(title + 1).is_some_and(|next| !next.trim().is_empty()) {
            lines.insert(title + 1, "");
        }
    }
    lines.join("\n")
}

// ── Pass 10: table of contents ───────────────────────────────────────────────

/// Fewest headings for which a table of contents is generated.
pub const TOC_MIN_HEADINGS: usize = 3;

/// One line of the generated table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub level: usize,
    pub title: String,
    pub anchor: String,
}

impl TocEntry {
    pub fn new(level: usize, title: &str) -> Self {
        Self {
            level,
            title: title.to_string(),
            anchor: anchor_for(title),
        }
    }

    /// `- [title](#anchor)`, indented two spaces per level below 2.
    pub fn render(&self) -> String {
        format!(
            "{}- [{}](#{})",
            "  ".repeat(self.level.saturating_sub(2)),
            self.title,
            self.anchor
        )
    }
}

/// Lowercase, spaces to `-`, colons dropped.
pub fn anchor_for(title: &str) -> String {
    title.to_lowercase().replace(' ', "-").replace(':', "")
}

fn collect_headings(lines: &[&str]) -> Vec<TocEntry> {
    lines
        .iter()
        .filter(|line| is_atx_heading(line))
        .map(|line| {
            let level = line.len() - line.trim_start_matches('#').len();
            TocEntry::new(level, line.trim_matches('#').trim())
        })
        .collect()
}

/// Insert a table of contents after the title when there are at least three
/// headings. Level-1 headings are counted but not listed.
pub(crate) fn add_table_of_contents(input: &str) -> String {
    let mut lines: Vec<&str> = input.split('\n').collect();
    let headings = collect_headings(&lines);
    if headings.len() < TOC_MIN_HEADINGS {
        return input.to_string();
    }
    let Some(title) = lines.iter().position(|l| is_title(l)) else {
        return input.to_string();
    };

    // Past the title's own paragraph and one blank line.
    let mut insert_at = title + 1;
    while insert_at < lines.len()
        && !lines[insert_at].trim().is_empty()
        && !lines[insert_at].starts_with('#')
    {
        insert_at += 1;
    }
    if lines.get(insert_at).is_some_and(|l| l.trim().is_empty()) {
        insert_at += 1;
    }

    let entries: Vec<String> = headings
        .iter()
        .filter(|h| h.level != 1)
        .map(TocEntry::render)
        .collect();

    let mut toc: Vec<&str> = vec!["## Table of Contents", ""];
    toc.extend(entries.iter().map(String::as_str));
    toc.extend(["", "---", ""]);

    let tail = lines.split_off(insert_at);
    lines.extend(toc);
    lines.extend(tail);
    lines.join("\n")
}

// ── Pass 11: readability ─────────────────────────────────────────────────────

static RE_SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.!?])\n([A-Z])").unwrap());
static RE_NEWLINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

/// Paragraph breaks between sentences, at most two blank lines in a row, and
/// exactly one trailing newline.
pub(crate) fn optimize_readability(input: &str) -> String {
    let text = RE_SENTENCE_BREAK.replace_all(input, "$1\n\n$2");
    let text = RE_NEWLINE_RUN.replace_all(&text, "\n\n\n");
    let mut out = text.trim_start_matches('\n').trim_end().to_string();
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_after_title() {
        assert_eq!(enhance_structure("# T\nbody\n# U\nx"), "# T\n\nbody\n# U\nx");
        assert_eq!(enhance_structure("# T\n\nbody"), "# T\n\nbody");
        assert_eq!(enhance_structure("## only\nbody"), "## only\nbody");
    }

    #[test]
    fn anchors() {
        assert_eq!(anchor_for("Next Steps: Phase 2"), "next-steps-phase-2");
        assert_eq!(TocEntry::new(3, "Deep Dive").render(), "  - [Deep Dive](#deep-dive)");
        assert_eq!(TocEntry::new(2, "Top").render(), "- [Top](#top)");
    }

    #[test]
    fn toc_inserted_after_title_block() {
        let input = "# Doc\n\nIntro line.\n\n## One\n\ntext\n\n### Two\n\ntext";
        let out = add_table_of_contents(input);
        assert_eq!(
            out,
            "# Doc\n\n## Table of Contents\n\n- [One](#one)\n  - [Two](#two)\n\n---\n\nIntro line.\n\n## One\n\ntext\n\n### Two\n\ntext"
        );
    }

    #[test]
    fn toc_needs_three_headings() {
        let input = "# Doc\n\n## One\n\ntext";
        assert_eq!(add_table_of_contents(input), input);
    }

    #[test]
    fn toc_needs_a_title() {
        let input = "## A\n## B\n## C";
        assert_eq!(add_table_of_contents(input), input);
    }

    #[test]
    fn toc_directly_before_next_heading() {
        let out = add_table_of_contents("# Doc\n## A\n## B");
        assert!(out.starts_with("# Doc\n## Table of Contents\n"), "got:\n{out}");
        assert!(out.ends_with("---\n\n## A\n## B"), "got:\n{out}");
    }

    #[test]
    fn readability_spacing() {
        assert_eq!(
            optimize_readability("One.\nTwo!\nthree\n\n\n\n\nFour"),
            "One.\n\nTwo!\nthree\n\n\nFour\n"
        );
    }

    #[test]
    fn readability_single_trailing_newline() {
        assert_eq!(optimize_readability("\n\ntext\n\n\n"), "text\n");
        assert_eq!(optimize_readability("text"), "text\n");
    }
}
