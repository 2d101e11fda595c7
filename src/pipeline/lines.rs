//! Line buffer helpers shared by the reconstruction passes.
//!
//! Every pass operates on an owned `Vec<String>` of lines. Passes that
//! replace multi-line spans never splice while scanning: they collect
//! [`Splice`] sites during a forward pass and apply them afterwards through
//! [`apply_splices`], which works highest start first so earlier recorded
//! indices stay valid as later ones are substituted.

/// One pending replacement of the half-open line range `start..end`.
#[derive(Debug, Clone)]
pub struct Splice {
    pub start: usize,
    pub end: usize,
    pub replacement: Vec<String>,
}

/// Normalise converter output into the line buffer.
///
/// Carriage returns are removed outright rather than translated, matching
/// the converter's mixed `\r\n` / bare-`\r` output on Windows; the final
/// element is an empty string when the text ends with a newline, so joining
/// with `\n` round-trips.
pub fn to_lines(text: &str) -> Vec<String> {
    text.replace('\r', "")
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// Apply collected splices in descending start order.
///
/// Ranges must not overlap; each `start..end` is replaced by its
/// `replacement` lines.
pub fn apply_splices(lines: &mut Vec<String>, mut splices: Vec<Splice>) {
    splices.sort_by(|a, b| b.start.cmp(&a.start));
    for splice in splices {
        debug_assert!(splice.start <= splice.end && splice.end <= lines.len());
        lines.splice(splice.start..splice.end, splice.replacement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_lines_strips_carriage_returns() {
        assert_eq!(to_lines("a\r\nb\rc\n"), vec!["a", "b", "c", ""]);
    }

    #[test]
    fn splices_apply_in_descending_order() {
        let mut lines: Vec<String> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        // Recorded in forward discovery order; earlier range grows, which
        // would invalidate the later range if applied first.
        let splices = vec![
            Splice {
                start: 1,
                end: 2,
                replacement: vec!["b1".into(), "b2".into(), "b3".into()],
            },
            Splice {
                start: 3,
                end: 5,
                replacement: vec!["D".into()],
            },
        ];
        apply_splices(&mut lines, splices);
        assert_eq!(lines, vec!["a", "b1", "b2", "b3", "c", "D"]);
    }

    #[test]
    fn empty_splice_list_is_a_no_op() {
        let mut lines = vec!["x".to_string()];
        apply_splices(&mut lines, Vec::new());
        assert_eq!(lines, vec!["x"]);
    }

    #[test]
    fn replacement_may_delete_lines() {
        let mut lines: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        apply_splices(
            &mut lines,
            vec![Splice {
                start: 1,
                end: 3,
                replacement: vec![],
            }],
        );
        assert_eq!(lines, vec!["a"]);
    }
}
