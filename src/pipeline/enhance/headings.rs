//! Heading detection.
//!
//! Extracted text rarely carries heading markup. Titles show up as shouted
//! lines, setext underlines, `Label:` lines, or short labels sitting on top
//! of a list. Each line is tested against those shapes in priority order and
//! rewritten as an ATX heading on the first match.

use super::{ends_sentence, is_atx_heading, lists};
use once_cell::sync::Lazy;
use regex::Regex;

/// A line recognised as a heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingCandidate {
    /// Zero-based index of the source line.
    pub line_index: usize,
    /// 1–6.
    pub level: u8,
    /// Heading text with decoration stripped.
    pub text: String,
}

impl HeadingCandidate {
    /// ATX form, e.g. `## Results`.
    pub fn render(&self) -> String {
        format!("{} {}", "#".repeat(self.level as usize), self.text)
    }
}

static RE_SETEXT_H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"^=+$").unwrap());
static RE_SETEXT_H2: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-+$").unwrap());

const MAX_LABEL_CHARS: usize = 60;
const MAX_LABEL_WORDS: usize = 4;
const MAX_TITLE_CHARS: usize = 80;

// ── Pass 2 ───────────────────────────────────────────────────────────────────

/// Rewrite heading-shaped lines as ATX headings.
///
/// A setext underline that triggered a heading is consumed along with it.
/// Lines that are not headings pass through untouched.
pub(crate) fn enhance_headings(input: &str) -> String {
    let lines: Vec<&str> = input.split('\n').collect();
    let first_content = lines.iter().position(|l| !l.trim().is_empty());

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        match detect_heading(&lines, i, first_content) {
            Some(candidate) => {
                out.push(candidate.render());
                if lines.get(i + 1).is_some_and(|next| is_setext_underline(next.trim())) {
                    i += 1;
                }
            }
            None => out.push(lines[i].to_string()),
        }
        i += 1;
    }

    out.join("\n")
}

/// Decide whether `lines[index]` is a heading, and at what level.
///
/// Rules, first match wins:
///
/// 1. already `#`-prefixed: left alone
/// 2. all caps, more than 3 chars, no closing punctuation: level 1
/// 3. followed by `===`: level 1; by `---`: level 2
/// 4. ends with `:`, under 60 chars, at most two colons: level 3
/// 5. short label (≤ 4 words) introducing a list or a sentence: level 2
/// 6. first content line, under 80 chars, not ending in `.`: level 1
pub fn detect_heading(
    lines: &[&str],
    index: usize,
    first_content: Option<usize>,
) -> Option<HeadingCandidate> {
    let line = lines.get(index)?.trim();
    if line.is_empty() || is_atx_heading(line) {
        return None;
    }
    let next = lines.get(index + 1).map(|l| l.trim());
    // Measured in list-canonical form, which is what the next run sees.
    let chars = lists::parse_list_item(line)
        .map_or_else(|| line.chars().count(), |item| item.render().chars().count());

    let level = if is_all_caps(line) && chars > 3 && !ends_sentence(line) {
        1
    } else if next.is_some_and(|n| RE_SETEXT_H1.is_match(n)) {
        1
    } else if next.is_some_and(|n| RE_SETEXT_H2.is_match(n)) {
        2
    } else if line.ends_with(':') && chars < MAX_LABEL_CHARS && line.matches(':').count() <= 2 {
        3
    } else if is_section_label(line, lines, index) {
        2
    } else if Some(index) == first_content && chars < MAX_TITLE_CHARS && !line.ends_with('.') {
        1
    } else {
        return None;
    };

    let text = clean_heading_text(line);
    if text.is_empty() {
        return None;
    }

    Some(HeadingCandidate {
        line_index: index,
        level,
        text: text.to_string(),
    })
}

fn is_all_caps(line: &str) -> bool {
    line.chars().any(char::is_uppercase) && !line.chars().any(char::is_lowercase)
}

fn is_setext_underline(line: &str) -> bool {
    RE_SETEXT_H1.is_match(line) || RE_SETEXT_H2.is_match(line)
}

/// A short unpunctuated label that introduces what follows.
///
/// The following line (or, across blank lines, the next content line) must be
/// a list item, a long sentence, or an existing heading.
fn is_section_label(line: &str, lines: &[&str], index: usize) -> bool {
    if line.chars().count() >= MAX_LABEL_CHARS
        || ends_sentence(line)
        || lists::is_list_item(line)
        || line.split_whitespace().count() > MAX_LABEL_WORDS
    {
        return false;
    }
    let Some(next) = lines.get(index + 1).map(|l| l.trim()) else {
        return false;
    };

    if !next.is_empty() {
        return lists::is_list_item(next)
            || (next.chars().count() > 15 && next.ends_with('.'))
            || next.starts_with('#');
    }

    // Spacing may already have put a blank line between label and list.
    lines[index + 1..]
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .is_some_and(lists::is_list_item)
}

fn clean_heading_text(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || matches!(c, '#' | '-' | '=' | '_' | '*'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_of(text: &str, index: usize) -> Option<u8> {
        let lines: Vec<&str> = text.split('\n').collect();
        let first = lines.iter().position(|l| !l.trim().is_empty());
        detect_heading(&lines, index, first).map(|c| c.level)
    }

    #[test]
    fn all_caps_line_is_level_one() {
        assert_eq!(
            enhance_headings("intro text goes here.\nINTRODUCTION\nBody text."),
            "intro text goes here.\n# INTRODUCTION\nBody text."
        );
    }

    #[test]
    fn short_caps_and_shouted_sentences_skipped() {
        assert_eq!(level_of("body.\nABC", 1), None);
        assert_eq!(level_of("body.\nSTOP NOW!", 1), None);
    }

    #[test]
    fn setext_underlines_consumed() {
        assert_eq!(
            enhance_headings("intro.\nOverview\n========\ntext."),
            "intro.\n# Overview\ntext."
        );
        assert_eq!(
            enhance_headings("intro.\nDetails\n-------\ntext."),
            "intro.\n## Details\ntext."
        );
    }

    #[test]
    fn colon_label_is_level_three() {
        assert_eq!(level_of("intro.\nKey findings:\nthe rest", 1), Some(3));
        assert_eq!(level_of("intro.\na: b: c: d:\nx", 1), None);
    }

    #[test]
    fn label_before_list_is_level_two() {
        assert_eq!(
            enhance_headings("Some intro text here.\nKey Points\n- first"),
            "Some intro text here.\n## Key Points\n- first"
        );
    }

    #[test]
    fn label_before_list_across_blank_line() {
        assert_eq!(level_of("intro.\nKey Points\n\n• first", 1), Some(2));
    }

    #[test]
    fn label_before_list_across_blank_run() {
        // Same answer as once spacing has collapsed the run.
        assert_eq!(level_of("intro.\nKey Points\n\n\n\n- a", 1), Some(2));
        assert_eq!(level_of("intro.\nKey Points\n\n\nplain words", 1), None);
    }

    #[test]
    fn label_before_sentence_is_level_two() {
        assert_eq!(
            level_of("intro.\nBackground\nThis part explains the background.", 1),
            Some(2)
        );
    }

    #[test]
    fn label_without_trailing_context_is_not_heading() {
        assert_eq!(level_of("intro.\nKey Points", 1), None);
        assert_eq!(level_of("intro.\nKey Points\nshort", 1), None);
        assert_eq!(level_of("intro.\nfive words are too many\n- a", 1), None);
    }

    #[test]
    fn first_content_line_is_title() {
        assert_eq!(
            enhance_headings("\n\nQuarterly report for Acme Corp\nIt was a good quarter."),
            "\n\n# Quarterly report for Acme Corp\nIt was a good quarter."
        );
        assert_eq!(level_of("This first line is a sentence.\nmore", 0), None);
    }

    #[test]
    fn existing_headings_untouched() {
        let text = "# Title\n## Sub\nbody.";
        assert_eq!(enhance_headings(text), text);
    }

    #[test]
    fn decoration_stripped_from_text() {
        let c = detect_heading(&["** SUMMARY **"], 0, Some(0)).unwrap();
        assert_eq!(c.text, "SUMMARY");
        assert_eq!(c.render(), "# SUMMARY");
    }

    #[test]
    fn decoration_only_line_is_not_heading() {
        assert_eq!(level_of("intro.\n***\n", 1), None);
    }

    #[test]
    fn non_heading_lines_keep_indentation() {
        assert_eq!(
            enhance_headings("intro.\n    indented code line.\n"),
            "intro.\n    indented code line.\n"
        );
    }

    #[test]
    fn unspaced_caps_bullets_measured_as_rendered() {
        assert_eq!(level_of("intro.\n–AB", 1), Some(1));
        assert_eq!(level_of("intro.\n1)A", 1), Some(1));
        assert_eq!(level_of("intro.\n- AB", 1), Some(1));
        assert_eq!(level_of("intro.\n–A", 1), None);
    }

    #[test]
    fn pass_is_idempotent() {
        let input = "REPORT TITLE\nintro.\nKey Points\n\n- a\nNotes:\nfin.";
        let once = enhance_headings(input);
        assert_eq!(enhance_headings(&once), once);
    }
}
