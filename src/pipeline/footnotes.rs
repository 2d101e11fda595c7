//! Footnote extraction and per-unit re-attachment.
//!
//! The converter leaves every footnote definition at the point of the
//! *source* file it came from, which after splitting would strand
//! definitions in the wrong output document. The fix is two-phased:
//!
//! 1. [`extract_footnotes`] runs once over the whole stream before
//!    splitting, lifting each definition (a `.. [N]` directive line plus
//!    its indented body line) into the footnote table and removing it from
//!    the stream.
//! 2. [`attach_footnotes`] runs per unit, after every other pass, scanning
//!    the unit's final text for `[N]_` reference markers and appending
//!    definitions for exactly the referenced numbers — in ascending order,
//!    and only for numbers the table actually defines. A reference to an
//!    undefined number renders nothing; the site build reports the broken
//!    reference, which is more visible than a fabricated empty note.

use super::lines::{apply_splices, Splice};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

static RE_FOOTNOTE_DEF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\.\. \[(\d+)\]\s*$").unwrap());
static RE_FOOTNOTE_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\d+)\]_").unwrap());

/// Footnote number → body text, ordered by number.
pub type FootnoteTable = BTreeMap<u32, String>;

/// Lift footnote definitions out of the stream.
pub fn extract_footnotes(lines: &mut Vec<String>) -> FootnoteTable {
    let mut table = FootnoteTable::new();
    let mut splices = Vec::new();

    let mut i = 0;
    while i + 1 < lines.len() {
        if let Some(m) = RE_FOOTNOTE_DEF.captures(&lines[i]) {
            let body = &lines[i + 1];
            let indented = body.starts_with(' ') && !body.trim().is_empty();
            if indented {
                if let Ok(number) = m[1].parse::<u32>() {
                    table.insert(number, body.trim().to_string());
                    splices.push(Splice {
                        start: i,
                        end: i + 2,
                        replacement: vec![],
                    });
                    i += 2;
                    continue;
                }
            }
        }
        i += 1;
    }

    debug!("Extracted {} footnote definitions", table.len());
    apply_splices(lines, splices);
    table
}

/// Append definitions for every footnote the unit references.
pub fn attach_footnotes(lines: &mut Vec<String>, table: &FootnoteTable) {
    let mut referenced: Vec<u32> = Vec::new();
    for line in lines.iter() {
        for m in RE_FOOTNOTE_REF.captures_iter(line) {
            if let Ok(number) = m[1].parse::<u32>() {
                referenced.push(number);
            }
        }
    }
    referenced.sort_unstable();
    referenced.dedup();

    for number in referenced {
        let Some(body) = table.get(&number) else {
            continue;
        };
        lines.push(String::new());
        lines.push(format!(".. [{number}]"));
        lines.push(format!("   {body}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.split('\n').map(str::to_string).collect()
    }

    #[test]
    fn definitions_are_lifted_out_of_the_stream() {
        let mut buf = lines("text [1]_ more\n\n.. [1]\n   the footnote body\n\nafter");
        let table = extract_footnotes(&mut buf);
        assert_eq!(table.get(&1).map(String::as_str), Some("the footnote body"));
        assert_eq!(buf, lines("text [1]_ more\n\n\nafter"));
    }

    #[test]
    fn directive_without_indented_body_is_not_a_definition() {
        let mut buf = lines(".. [1]\nno indent here");
        let table = extract_footnotes(&mut buf);
        assert!(table.is_empty());
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn referenced_numbers_are_appended_in_ascending_order() {
        let mut table = FootnoteTable::new();
        table.insert(1, "first".to_string());
        table.insert(3, "third".to_string());
        let mut buf = lines("uses [3]_ then [1]_ then [3]_ again");
        attach_footnotes(&mut buf, &table);
        assert_eq!(
            buf,
            lines("uses [3]_ then [1]_ then [3]_ again\n\n.. [1]\n   first\n\n.. [3]\n   third")
        );
    }

    #[test]
    fn undefined_reference_renders_nothing() {
        let table = FootnoteTable::new();
        let mut buf = lines("refers to [3]_ which was never defined");
        attach_footnotes(&mut buf, &table);
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn unreferenced_definitions_stay_out_of_the_unit() {
        let mut table = FootnoteTable::new();
        table.insert(1, "first".to_string());
        table.insert(2, "second".to_string());
        let mut buf = lines("only [2]_ here");
        attach_footnotes(&mut buf, &table);
        let text = buf.join("\n");
        assert!(text.contains(".. [2]"));
        assert!(!text.contains(".. [1]"));
    }
}
