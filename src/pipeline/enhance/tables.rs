//! Table detection and rendering.

use super::inline::code_mask;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_WIDE_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());
static RE_SEPARATOR_CELL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:?-+:?$").unwrap());

/// Delimiter a row matched, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Pipe,
    Tab,
    Spaces,
}

fn row_delimiter(line: &str) -> Option<Delimiter> {
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    if line.matches('|').count() >= 2 {
        Some(Delimiter::Pipe)
    } else if line.contains('\t') && line.split('\t').count() >= 3 {
        Some(Delimiter::Tab)
    } else if RE_WIDE_GAP.split(line).count() >= 3 {
        Some(Delimiter::Spaces)
    } else {
        None
    }
}

fn split_row(line: &str, delimiter: Delimiter) -> Vec<String> {
    match delimiter {
        Delimiter::Pipe => {
            let mut cells: Vec<String> = line.split('|').map(|c| c.trim().to_string()).collect();
            if cells.first().is_some_and(String::is_empty) {
                cells.remove(0);
            }
            if cells.last().is_some_and(String::is_empty) {
                cells.pop();
            }
            cells
        }
        Delimiter::Tab => line.split('\t').map(|c| c.trim().to_string()).collect(),
        Delimiter::Spaces => RE_WIDE_GAP
            .split(line)
            .map(|c| c.trim().to_string())
            .collect(),
    }
}

fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty() && cells.iter().all(|c| RE_SEPARATOR_CELL.is_match(c))
}

/// Rows of one detected table, padded to a common width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBlock {
    rows: Vec<Vec<String>>,
}

impl TableBlock {
    /// Right-pad every row with empty cells to the widest row.
    pub fn new(mut rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self { rows }
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Header row, `|---|` separator, then data rows.
    pub fn render(&self) -> Vec<String> {
        let Some((header, body)) = self.rows.split_first() else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        out.push(render_row(header));
        out.push(format!("|{}", "---|".repeat(self.column_count())));
        out.extend(body.iter().map(|row| render_row(row)));
        out
    }
}

fn render_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

// ── Pass 5 ───────────────────────────────────────────────────────────────────

/// Render runs of two or more tabular lines as Markdown tables.
///
/// An existing `|---|` separator row is dropped and regenerated, so a table
/// that is already Markdown comes out unchanged apart from cell spacing.
pub(crate) fn enhance_tables(input: &str) -> String {
    let lines: Vec<&str> = input.split('\n').collect();
    let in_code = code_mask(&lines);
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    let mut i = 0;
    while i < lines.len() {
        let mut run: Vec<(&str, Delimiter)> = Vec::new();
        let mut j = i;
        while j < lines.len() && !in_code[j] {
            let trimmed = lines[j].trim();
            let Some(delimiter) = row_delimiter(trimmed) else {
                break;
            };
            run.push((trimmed, delimiter));
            j += 1;
        }

        if run.len() < 2 {
            out.push(lines[i].to_string());
            i += 1;
            continue;
        }

        let rows: Vec<Vec<String>> = run
            .iter()
            .map(|(line, delimiter)| split_row(line, *delimiter))
            .filter(|cells| !is_separator_row(cells))
            .collect();
        if rows.is_empty() {
            out.extend(lines[i..j].iter().map(|l| l.to_string()));
        } else {
            out.extend(TableBlock::new(rows).render());
        }
        i = j;
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipe_rows_become_table() {
        assert_eq!(
            enhance_tables("Name|Age|City\nAnn|30|Oslo"),
            "| Name | Age | City |\n|---|---|---|\n| Ann | 30 | Oslo |"
        );
    }

    #[test]
    fn space_aligned_columns_become_table() {
        assert_eq!(
            enhance_tables("Item    Qty    Price\nApple   3      1.20"),
            "| Item | Qty | Price |\n|---|---|---|\n| Apple | 3 | 1.20 |"
        );
    }

    #[test]
    fn tab_rows_become_table() {
        assert_eq!(
            enhance_tables("a\tb\tc\n1\t2\t3"),
            "| a | b | c |\n|---|---|---|\n| 1 | 2 | 3 |"
        );
    }

    #[test]
    fn short_rows_padded() {
        assert_eq!(
            enhance_tables("| a | b | c |\n| 1 | 2 |"),
            "| a | b | c |\n|---|---|---|\n| 1 | 2 |  |"
        );
    }

    #[test]
    fn single_row_left_alone() {
        let text = "intro\nName|Age|City\noutro";
        assert_eq!(enhance_tables(text), text);
    }

    #[test]
    fn headings_break_runs() {
        let text = "# A | B | C\nx|y|z";
        assert_eq!(enhance_tables(text), text);
    }

    #[test]
    fn existing_markdown_table_is_stable() {
        let table = "| a | b |\n|---|---|\n| 1 | 2 |";
        assert_eq!(enhance_tables(table), table);
        assert_eq!(enhance_tables("|a|b|\n|:--|--:|\n|1|2|"), table);
    }

    #[test]
    fn fenced_code_not_tabulated() {
        let text = "```\na | b | c\n1 | 2 | 3\n```";
        assert_eq!(enhance_tables(text), text);
    }

    #[test]
    fn block_pads_and_counts() {
        let block = TableBlock::new(vec![vec!["a".into()], vec!["1".into(), "2".into()]]);
        assert_eq!(block.column_count(), 2);
        assert_eq!(block.rows()[0], vec!["a".to_string(), String::new()]);
    }
}
