//! Table reconstruction: pipe-delimited converter output → RST list-tables.
//!
//! The converter flattens the source's table environments into lines of the
//! form `| cell & cell & cell`, sometimes preceded by sizing directives
//! (`to 0.8`), column specs (`@{}...@`) or stray `| ` continuation markers,
//! with wrapped cell text on two-space-indented follow-up lines. None of
//! that renders as a table. This pass runs once over the *whole* document
//! before splitting, finds each block with a multi-line pattern, and
//! replaces it with a `.. list-table::` directive.
//!
//! A run of leading rows whose every cell is wrapped in `**bold**` is
//! declared as header rows and unwrapped. Rows whose cell count disagrees
//! with the last row's are silently dropped rather than failing the run —
//! a malformed row is converter noise, not operator error.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static RE_TABLE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)(?:^\n|\| \n|\|? ?to 0\.\d+\n|@\S+@\n)*(?P<table>(?:^\| [^&\n]*(?: ?&[^&\n]*)+\n(?:  (?:\S+\s)+)*\n*)+)",
    )
    .unwrap()
});

/// Rebuild every pipe-delimited table block in `text`.
///
/// Returns the rewritten text and the number of blocks replaced.
/// Replacements are applied highest start offset first so earlier match
/// offsets stay valid. Text without any matching block passes through
/// unchanged (the pass is idempotent on its own output).
pub fn rebuild_tables(text: &str) -> (String, usize) {
    let mut replacements: Vec<(usize, usize, String)> = Vec::new();

    for m in RE_TABLE_BLOCK.captures_iter(text) {
        let whole = m.get(0).unwrap();
        let table = &m["table"];
        if let Some(directive) = render_list_table(table) {
            replacements.push((whole.start(), whole.end(), directive));
        }
    }

    let count = replacements.len();
    debug!("Rebuilt {count} table blocks");

    let mut out = text.to_string();
    for (start, end, directive) in replacements.into_iter().rev() {
        out.replace_range(start..end, &directive);
    }
    (out, count)
}

/// Render one matched block as a list-table directive, or `None` when no
/// consistent row survives.
fn render_list_table(block: &str) -> Option<String> {
    // Rows are separated by the leading `|`; wrapped continuation text
    // belongs to the cell it follows, so newlines are dropped before the
    // cell split.
    let mut rows: Vec<Vec<String>> = block
        .split('|')
        .skip(1)
        .map(|row| {
            row.replace('\n', "")
                .split('&')
                .map(|cell| cell.trim().to_string())
                .collect()
        })
        .collect();

    let expected = rows.last()?.len();
    rows.retain(|row| row.len() == expected);
    if rows.is_empty() {
        return None;
    }

    // Header rows: the leading run where every cell is **bold**.
    let header_rows = rows
        .iter()
        .take_while(|row| row.iter().all(|c| c.starts_with("**") && c.ends_with("**") && c.len() >= 4))
        .count();
    for row in rows.iter_mut().take(header_rows) {
        for cell in row.iter_mut() {
            *cell = cell[2..cell.len() - 2].to_string();
        }
    }

    let mut directive = String::from("\n.. list-table::\n   :widths: auto\n");
    if header_rows > 0 {
        directive.push_str(&format!("   :header-rows: {header_rows}\n"));
    }
    for row in &rows {
        directive.push_str(&format!("\n   * - {}", row.join("\n     - ")));
    }
    directive.push_str("\n\n");
    Some(directive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_table_with_bold_header() {
        let text = "before\n\n| **name** & **value**\n| alpha & 1\n| beta & 2\n\nafter\n";
        let (out, count) = rebuild_tables(text);
        assert_eq!(count, 1);
        assert!(out.contains(".. list-table::"));
        assert!(out.contains(":widths: auto"));
        assert!(out.contains(":header-rows: 1"));
        assert!(out.contains("* - name\n     - value"));
        assert!(out.contains("* - alpha\n     - 1"));
        assert!(!out.contains("**name**"));
        assert!(out.starts_with("before\n"));
        assert!(out.ends_with("after\n"));
    }

    #[test]
    fn inconsistent_rows_are_dropped() {
        // The middle row has three cells against the final row's two.
        let text = "| a & b\n| x & y & z\n| c & d\n";
        let (out, _) = rebuild_tables(text);
        assert!(out.contains("* - a"));
        assert!(out.contains("* - c"));
        assert!(!out.contains("- z"));
    }

    #[test]
    fn wrapped_cell_text_merges_into_its_row() {
        let text = "| first & a long cell\n  that wraps\n| second & short\n";
        let (out, _) = rebuild_tables(text);
        assert!(out.contains("a long cell  that wraps"), "got: {out}");
        assert!(out.contains("* - second"));
    }

    #[test]
    fn sizing_noise_before_the_block_is_consumed() {
        let text = "para\n\nto 0.85\n| a & b\n| c & d\n\npara\n";
        let (out, count) = rebuild_tables(text);
        assert_eq!(count, 1);
        assert!(!out.contains("to 0.85"));
        assert!(out.contains("* - a"));
    }

    #[test]
    fn no_header_rows_when_first_row_is_plain() {
        let text = "| a & b\n| **x** & **y**\n";
        let (out, _) = rebuild_tables(text);
        assert!(!out.contains(":header-rows:"));
        // Non-leading bold rows keep their markers.
        assert!(out.contains("**x**"));
    }

    #[test]
    fn idempotent_on_text_without_pipe_rows() {
        let text = "A heading\n=========\n\n.. list-table::\n   :widths: auto\n\n   * - a\n     - b\n\nplain text\n";
        let (out, count) = rebuild_tables(text);
        assert_eq!(count, 0);
        assert_eq!(out, text);
    }

    #[test]
    fn two_separate_tables_both_rebuilt() {
        let text = "| a & b\n\nmiddle text\n\n| c & d\n";
        let (out, count) = rebuild_tables(text);
        assert_eq!(count, 2);
        assert!(out.contains("* - a"));
        assert!(out.contains("* - c"));
        assert!(out.contains("middle text"));
    }
}
