//! Heading classification and document splitting.
//!
//! The converter renders headings as a title line followed by an underline
//! of repeated identical characters, but it assigns those characters
//! *inconsistently*: the same logical depth can get `=` in one chapter and
//! `~` in another. This pass walks the stream once, infers a hierarchy
//! level for every underline, rewrites wrong characters to the canonical
//! marker for their level, and carves the stream into one unit per
//! top-level heading.
//!
//! ## Level inference
//!
//! The marker table starts from the configured seeds (shallowest first) and
//! grows as new characters appear. Three facts drive the algorithm:
//!
//! * a never-seen character always opens a level exactly one deeper than
//!   the current one — the source document cannot skip levels downward;
//! * a character known as canonical for a *shallower* level returns there,
//!   and any corrected-alias mappings for deeper levels are forgotten (the
//!   converter may reuse those characters differently below this point);
//! * a character known as canonical for a *deeper* level advances the
//!   current level by exactly one, rewriting the underline when the
//!   one-deeper canonical marker disagrees.
//!
//! Malformed heading structure never raises an error: garbage input yields
//! a garbage hierarchy, and at least one unit is always emitted.
//!
//! ## Annotation side-channel
//!
//! Titles are matched (after normalising the typographic apostrophe)
//! against the heads of the supplied ordered code lists; a hit records an
//! `(offset, code)` annotation for the unit the title belongs to and
//! advances that list's cursor. Lists are merged monotonically — a missed
//! head is never revisited.

use crate::source::CodeRecord;
use std::collections::HashMap;

/// One badge annotation: the code record for the title at `offset` lines
/// from the start of its unit.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub offset: usize,
    pub record: CodeRecord,
}

/// A contiguous top-level slice of the document, from its title line up to
/// (not including) the next top-level title line.
#[derive(Debug, Clone)]
pub struct Unit {
    pub lines: Vec<String>,
    pub annotations: Vec<Annotation>,
}

impl Unit {
    /// Title of the unit: its first line.
    pub fn title(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or("")
    }
}

/// Split the normalised line stream into top-level units, unifying heading
/// markers in the process.
///
/// `code_lists` holds up to three independently ordered annotation lists
/// (feature-class codes, feature codes, other codes); each is consumed
/// front to back as titles match.
///
/// The emitted units concatenate back to exactly the input: lines before
/// the first top-level heading form a leading unit, and the final unit is
/// emitted unconditionally.
pub fn split_units(mut lines: Vec<String>, seeds: &[char], code_lists: &[&[CodeRecord]]) -> Vec<Unit> {
    let mut header_chars: Vec<char> = seeds.to_vec();
    let mut corrected: HashMap<char, usize> = HashMap::new();
    let mut current_level: isize = -1;
    let mut cursors: Vec<usize> = vec![0; code_lists.len()];

    // Unit start indices plus the annotations collected for each.
    let mut starts: Vec<usize> = vec![0];
    let mut annotations: Vec<Vec<Annotation>> = vec![Vec::new()];

    for i in 0..lines.len() {
        if !is_underline(&lines, i) {
            continue;
        }
        let marker = lines[i].chars().next().unwrap_or_default();
        let width = lines[i].chars().count();

        if let Some(&level) = corrected.get(&marker) {
            // Previously identified as a wrong character for this level.
            current_level = level as isize;
            lines[i] = underline(header_chars[level], width);
        } else if !header_chars.contains(&marker) {
            // Never seen: one level deeper than the current one.
            current_level += 1;
            let level = current_level as usize;
            if level >= header_chars.len() {
                header_chars.push(marker);
            } else {
                // This depth already has a canonical marker under another
                // character; rewrite and remember the alias.
                lines[i] = underline(header_chars[level], width);
                corrected.insert(marker, level);
            }
        } else {
            let known = header_chars.iter().position(|&h| h == marker).unwrap() as isize;
            if known < current_level {
                // Return to a shallower level; deeper aliases may mean
                // something different when that depth is revisited.
                current_level = known;
                corrected.retain(|_, level| (*level as isize) <= current_level);
            } else if known > current_level {
                // Only one level of nesting can be introduced per heading.
                current_level += 1;
                let level = current_level as usize;
                if header_chars[level] != marker {
                    lines[i] = underline(header_chars[level], width);
                    corrected.insert(marker, level);
                }
            }
        }

        let title_idx = i - 1;
        if current_level == 0 && title_idx > *starts.last().unwrap() {
            starts.push(title_idx);
            annotations.push(Vec::new());
        }

        // Annotation merge: first list whose head matches the title wins.
        let title = lines[title_idx].replace('\u{2019}', "'");
        for (list_idx, list) in code_lists.iter().enumerate() {
            let cursor = cursors[list_idx];
            if cursor < list.len() && list[cursor].title == title {
                annotations.last_mut().unwrap().push(Annotation {
                    offset: title_idx - starts.last().unwrap(),
                    record: list[cursor].clone(),
                });
                cursors[list_idx] += 1;
                break;
            }
        }
    }

    // Carve from the back so each split is O(tail).
    let mut units: Vec<Unit> = Vec::with_capacity(starts.len());
    for (&start, annotations) in starts.iter().zip(annotations).rev() {
        units.push(Unit {
            lines: lines.split_off(start),
            annotations,
        });
    }
    units.reverse();
    units
}

/// A line is a heading underline when it is at least two copies of one
/// character and exactly as wide as the line above it. Lines shorter than
/// two characters are never underlines, and neither is the first line of
/// the stream.
fn is_underline(lines: &[String], i: usize) -> bool {
    let line = &lines[i];
    let mut chars = line.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if line.chars().count() < 2 || !chars.all(|c| c == first) {
        return false;
    }
    i > 0 && line.chars().count() == lines[i - 1].chars().count()
}

fn underline(marker: char, width: usize) -> String {
    std::iter::repeat(marker).take(width).collect()
}
