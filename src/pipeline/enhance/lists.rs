//! List normalisation.
//!
//! Bullets arrive as whatever glyph the source used (`•`, `▪`, `–`, `*`) and
//! numbered items as `1.` or `1)`. Everything becomes `- text` or `N. text`.

use once_cell::sync::Lazy;
use regex::Regex;

/// A recognised list line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    /// `3) text` or `3. text`; the number is kept as written.
    Ordered { number: String, text: String },
    /// Any bullet glyph.
    Unordered { text: String },
}

impl ListItem {
    /// Canonical Markdown form.
    pub fn render(&self) -> String {
        match self {
            ListItem::Ordered { number, text } => format!("{number}. {text}"),
            ListItem::Unordered { text } => format!("- {text}"),
        }
    }
}

// Already canonical; rewriting these would be a no-op at best.
static RE_CANONICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:[-*+]|\d+\.)\s").unwrap());

const BULLET_GLYPHS: &[char] = &['•', '·', '▪', '▫', '‣', '⁃', '–', '—'];

// ── Pass 3 ───────────────────────────────────────────────────────────────────

/// Rewrite bullet and numbered lines into canonical Markdown list items.
pub(crate) fn enhance_lists(input: &str) -> String {
    input
        .split('\n')
        .map(|line| match parse_list_item(line) {
            Some(item) if !RE_CANONICAL.is_match(line) => item.render(),
            _ => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse one line as a list item, if it looks like one.
pub fn parse_list_item(line: &str) -> Option<ListItem> {
    let trimmed = line.trim();
    parse_ordered(trimmed).or_else(|| parse_unordered(trimmed))
}

/// Canonical or convertible list line.
pub(crate) fn is_list_item(line: &str) -> bool {
    RE_CANONICAL.is_match(line) || parse_list_item(line).is_some()
}

fn parse_ordered(line: &str) -> Option<ListItem> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let (number, rest) = line.split_at(digits);
    let rest = rest.strip_prefix(['.', ')'])?;
    // `3.14` is a number, not an item.
    if rest.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let text = rest.trim();
    if text.is_empty() {
        return None;
    }
    Some(ListItem::Ordered {
        number: number.to_string(),
        text: text.to_string(),
    })
}

fn parse_unordered(line: &str) -> Option<ListItem> {
    let mut chars = line.chars();
    let first = chars.next()?;
    let rest = chars.as_str();

    let is_bullet = match first {
        c if BULLET_GLYPHS.contains(&c) => true,
        // `---` is a rule and `**bold**` is emphasis.
        '-' => !rest.starts_with('-'),
        '*' => !rest.starts_with('*'),
        _ => false,
    };
    if !is_bullet {
        return None;
    }

    let text = rest.trim();
    if text.is_empty() {
        return None;
    }
    Some(ListItem::Unordered {
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_bullets_become_dashes() {
        assert_eq!(
            enhance_lists("• first\n▪ second\n– third\n*fourth"),
            "- first\n- second\n- third\n- fourth"
        );
    }

    #[test]
    fn paren_numbers_become_dot_numbers() {
        assert_eq!(enhance_lists("1) first\n2) second"), "1. first\n2. second");
        assert_eq!(enhance_lists("3.missing space"), "3. missing space");
    }

    #[test]
    fn canonical_items_untouched() {
        let text = "- a\n  * nested\n+ b\n1. one\n   2. two";
        assert_eq!(enhance_lists(text), text);
    }

    #[test]
    fn rules_emphasis_and_decimals_untouched() {
        let text = "---\n**bold** text\n3.14 is pi\n2024\n•";
        assert_eq!(enhance_lists(text), text);
    }

    #[test]
    fn parse_exposes_number() {
        assert_eq!(
            parse_list_item("12) twelve"),
            Some(ListItem::Ordered {
                number: "12".into(),
                text: "twelve".into()
            })
        );
    }

    #[test]
    fn list_predicate() {
        assert!(is_list_item("- a"));
        assert!(is_list_item("• a"));
        assert!(is_list_item("2) b"));
        assert!(!is_list_item("Plain sentence."));
        assert!(!is_list_item("---"));
    }

    #[test]
    fn pass_is_idempotent() {
        let once = enhance_lists("• a\n2) b\n— c");
        assert_eq!(enhance_lists(&once), once);
    }
}
