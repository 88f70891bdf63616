//! Links, emphasis, and code regions.
//!
//! All three passes work line by line and leave fenced code alone.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// ── Code regions ─────────────────────────────────────────────────────────────

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// `true` for every line inside a ``` fence, fence lines included.
pub(crate) fn code_mask(lines: &[&str]) -> Vec<bool> {
    let mut in_fence = false;
    lines
        .iter()
        .map(|line| {
            if is_fence(line) {
                in_fence = !in_fence;
                true
            } else {
                in_fence
            }
        })
        .collect()
}

fn map_prose_lines(input: &str, f: impl Fn(&str) -> String) -> String {
    let lines: Vec<&str> = input.split('\n').collect();
    let in_code = code_mask(&lines);
    lines
        .iter()
        .zip(in_code)
        .map(|(line, code)| if code { line.to_string() } else { f(line) })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Pass 6: links ────────────────────────────────────────────────────────────

// Alternatives are tried leftmost-first, so a URL inside inline code, an
// autolink or an existing link is consumed whole before the bare-URL branch
// can see it.
static RE_LINK_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?P<code>`[^`\n]+`)",
        r"|(?P<auto><https?://[^>\s]+>)",
        r"|\[(?P<text>[^\]\n]+)\]\s*\((?P<url>[^)\n]+)\)",
        r#"|(?P<bare>\bhttps?://[^\s<>"{}|\\^`\[\]]+)"#,
    ))
    .unwrap()
});

/// Bare URLs become `[url](url)`; `[text] (url)` loses the gap.
pub(crate) fn enhance_links(input: &str) -> String {
    map_prose_lines(input, |line| {
        RE_LINK_TOKEN
            .replace_all(line, |caps: &Captures| {
                if let Some(url) = caps.name("bare") {
                    let url = url.as_str();
                    format!("[{url}]({url})")
                } else if let (Some(text), Some(url)) = (caps.name("text"), caps.name("url")) {
                    format!("[{}]({})", text.as_str(), url.as_str().trim())
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned()
    })
}

// ── Pass 7: emphasis ─────────────────────────────────────────────────────────

static RE_INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`\n]+`").unwrap());
static RE_HEAVY_STARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*{3,}([^*\n]+)\*{3,}").unwrap());
static RE_HEAVY_UNDERSCORES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_{3,}([^_\n]+)_{3,}").unwrap());
static RE_BOLD_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*[^*\n]+?\*\*").unwrap());

/// `***x***` / `___x___` → `**x**`, then pad `**x**` spans glued to words.
pub(crate) fn enhance_emphasis(input: &str) -> String {
    map_prose_lines(input, |line| outside_inline_code(line, normalize_emphasis))
}

fn normalize_emphasis(segment: &str) -> String {
    let collapsed = RE_HEAVY_STARS.replace_all(segment, "**$1**");
    let collapsed = RE_HEAVY_UNDERSCORES.replace_all(&collapsed, "**$1**");
    pad_bold_spans(&collapsed)
}

fn pad_bold_spans(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut last = 0;
    for m in RE_BOLD_SPAN.find_iter(text) {
        out.push_str(&text[last..m.start()]);
        if text[..m.start()].chars().next_back().is_some_and(char::is_alphanumeric) {
            out.push(' ');
        }
        out.push_str(m.as_str());
        if text[m.end()..].chars().next().is_some_and(char::is_alphanumeric) {
            out.push(' ');
        }
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

/// Apply `f` to the parts of `line` outside `` `code` `` spans.
fn outside_inline_code(line: &str, f: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for m in RE_INLINE_CODE.find_iter(line) {
        out.push_str(&f(&line[last..m.start()]));
        out.push_str(m.as_str());
        last = m.end();
    }
    out.push_str(&f(&line[last..]));
    out
}

// ── Pass 8: code blocks ──────────────────────────────────────────────────────

/// Code regions pass through untouched.
///
/// Fenced content and 4-space/tab-indented blocks are never rewritten; the
/// only change is dropping stray spaces between a fence and its info string
/// (```` ```  rust ```` → ```` ```rust ````).
pub(crate) fn enhance_code_blocks(input: &str) -> String {
    let mut in_fence = false;
    input
        .split('\n')
        .map(|line| {
            if !is_fence(line) {
                return line.to_string();
            }
            let opening = !in_fence;
            in_fence = !in_fence;
            let indent = &line[..line.len() - line.trim_start().len()];
            let info = line.trim_start()[3..].trim_start();
            if opening && !info.starts_with('`') {
                format!("{indent}```{info}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
