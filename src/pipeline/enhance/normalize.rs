//! Line-ending normalisation, spacing cleanup, and the Markdown-source
//! standardisation passes.

use super::{is_atx_heading, lists};
use once_cell::sync::Lazy;
use regex::Regex;

// ── Pass 1: line endings ─────────────────────────────────────────────────────

/// CRLF/CR → LF, then strip trailing whitespace from every line.
pub(crate) fn fix_line_endings(input: &str) -> String {
    input
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Pass 4: spacing cleanup ──────────────────────────────────────────────────

// Three or more line breaks, ignoring whitespace-only lines between them.
static RE_BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n(?:[ \t]*\n){2,}").unwrap());

/// Collapse blank-line runs, then frame headings and paragraphs with blank lines.
///
/// - a run of two or more blank lines becomes one
/// - a heading gets a blank line before it, unless it opens the document
/// - a heading gets a blank line after it, unless the next line is blank or
///   another heading
/// - a line ending in `.` gets a blank line after it when the next line opens
///   a new paragraph (longer than 20 chars or capitalised) and is neither a
///   heading nor a list item
pub(crate) fn clean_spacing(input: &str) -> String {
    let collapsed = RE_BLANK_RUN.replace_all(input, "\n\n");
    let lines: Vec<&str> = collapsed.split('\n').collect();
    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 16);

    for (i, line) in lines.iter().enumerate() {
        let current = line.trim();
        let heading = is_atx_heading(current);

        if heading && i > 0 && out.last().is_some_and(|prev| !prev.trim().is_empty()) {
            out.push("");
        }
        out.push(line);

        let Some(next) = lines.get(i + 1).map(|l| l.trim()) else {
            continue;
        };
        if next.is_empty() {
            continue;
        }

        if heading {
            if !is_atx_heading(next) {
                out.push("");
            }
        } else if current.ends_with('.') && starts_new_paragraph(next) {
            out.push("");
        }
    }

    out.join("\n")
}

fn starts_new_paragraph(next: &str) -> bool {
    if is_atx_heading(next) || lists::is_list_item(next) {
        return false;
    }
    next.chars().count() > 20 || next.chars().next().is_some_and(char::is_uppercase)
}

// ── Markdown sources ─────────────────────────────────────────────────────────

static RE_HASH_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s*(.*)$").unwrap());

/// `#Title`, `##   Title  ` → `# Title`, `## Title`.
pub(crate) fn standardize_headings(input: &str) -> String {
    input
        .split('\n')
        .map(|line| match RE_HASH_PREFIX.captures(line) {
            Some(caps) => {
                let text = caps[2].trim();
                if text.is_empty() || text.starts_with('#') {
                    line.to_string()
                } else {
                    format!("{} {}", &caps[1], text)
                }
            }
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

static RE_ALT_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)[*+](\s)").unwrap());

/// `* item` / `+ item` → `- item`, keeping indentation.
pub(crate) fn standardize_lists(input: &str) -> String {
    input
        .split('\n')
        .map(|line| RE_ALT_BULLET.replace(line, "${1}-${2}").into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_endings_normalised_and_trailing_space_stripped() {
        assert_eq!(fix_line_endings("a  \r\nb\t\rc \n"), "a\nb\nc\n");
    }

    #[test]
    fn line_endings_keep_leading_indentation() {
        assert_eq!(fix_line_endings("    code  \n"), "    code\n");
    }

    #[test]
    fn blank_runs_collapse_to_one() {
        assert_eq!(clean_spacing("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(clean_spacing("a\n  \n\t\n\nb"), "a\n\nb");
        assert_eq!(clean_spacing("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn heading_framed_by_blank_lines() {
        assert_eq!(
            clean_spacing("intro\n# Heading\nbody"),
            "intro\n\n# Heading\n\nbody"
        );
    }

    #[test]
    fn heading_at_start_gets_no_leading_blank() {
        assert_eq!(clean_spacing("# Title\nbody"), "# Title\n\nbody");
    }

    #[test]
    fn consecutive_headings_not_separated_after() {
        assert_eq!(clean_spacing("# A\n## B\ntext"), "# A\n\n## B\n\ntext");
    }

    #[test]
    fn paragraph_break_after_sentence() {
        assert_eq!(
            clean_spacing("One sentence.\nAnother starts here"),
            "One sentence.\n\nAnother starts here"
        );
    }

    #[test]
    fn no_paragraph_break_before_list_or_short_lowercase() {
        assert_eq!(clean_spacing("Intro.\n- item"), "Intro.\n- item");
        assert_eq!(clean_spacing("Intro.\nshort tail"), "Intro.\nshort tail");
    }

    #[test]
    fn spacing_is_idempotent() {
        let once = clean_spacing("a.\nLong following sentence here\n# H\nx\n\n\n\ny");
        assert_eq!(clean_spacing(&once), once);
    }

    #[test]
    fn standardize_heading_forms() {
        assert_eq!(
            standardize_headings("#Title\n##   Sub  \n#\n####### seven"),
            "# Title\n## Sub\n#\n####### seven"
        );
    }

    #[test]
    fn standardize_bullets() {
        assert_eq!(
            standardize_lists("* a\n  + b\n- c\n**bold**"),
            "- a\n  - b\n- c\n**bold**"
        );
    }
}
