//! Chapter cross-reference resolution.
//!
//! The source marks a chapter reference as `(**Chapter [chap\_name]**)`;
//! the converter passes it through as bold text with the raw label escaped.
//! This whole-document pass rewrites each occurrence to an RST
//! `` (:ref:`chap_name`) `` role, validating the label against the chapter
//! label table. A reference to a chapter the table does not know resolves
//! to the empty string — the sentence survives, the dead link does not —
//! and the anomaly is logged and counted, never raised.

use crate::source::ChapterLabels;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static RE_CHAPTER_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\*\*Chapter[ \n]\[(?P<chapter>chap(?:\\_\w+)+(?: \w+)?)\]\*\*\)").unwrap()
});

/// Resolve `(**Chapter [..]**)` references against the label table.
///
/// Returns the rewritten text and the number of references that could not
/// be resolved. A match that spanned a line break keeps a leading newline
/// so the surrounding paragraph does not collapse.
pub fn resolve_chapter_refs(text: &str, labels: &ChapterLabels) -> (String, usize) {
    let mut replacements: Vec<(usize, usize, String)> = Vec::new();
    let mut unresolved = 0usize;

    for m in RE_CHAPTER_REF.captures_iter(text) {
        let whole = m.get(0).unwrap();
        let label = m["chapter"].replace(r"\_", "_").replace(' ', "_");

        let mut replacement = if labels.values().any(|known| *known == label) {
            format!("(:ref:`{label}`)")
        } else {
            warn!("Skipping ref {label} (could not find corresponding chapter)");
            unresolved += 1;
            String::new()
        };
        if whole.as_str().contains('\n') {
            replacement.insert(0, '\n');
        }
        replacements.push((whole.start(), whole.end(), replacement));
    }

    let mut out = text.to_string();
    for (start, end, replacement) in replacements.into_iter().rev() {
        out.replace_range(start..end, &replacement);
    }
    (out, unresolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn labels() -> ChapterLabels {
        let mut labels = HashMap::new();
        labels.insert(
            "image processing".to_string(),
            "chap_image_processing".to_string(),
        );
        labels
    }

    #[test]
    fn known_reference_becomes_a_ref_role() {
        let text = r"see (**Chapter [chap\_image\_processing]**) for details";
        let (out, unresolved) = resolve_chapter_refs(text, &labels());
        assert_eq!(out, "see (:ref:`chap_image_processing`) for details");
        assert_eq!(unresolved, 0);
    }

    #[test]
    fn unknown_reference_resolves_to_nothing() {
        let text = r"see (**Chapter [chap\_missing]**) for details";
        let (out, unresolved) = resolve_chapter_refs(text, &labels());
        assert_eq!(out, "see  for details");
        assert_eq!(unresolved, 1);
    }

    #[test]
    fn wrapped_reference_keeps_a_leading_newline() {
        let text = "see (**Chapter\n[chap\\_image\\_processing]**) for details";
        let (out, _) = resolve_chapter_refs(text, &labels());
        assert_eq!(out, "see \n(:ref:`chap_image_processing`) for details");
    }

    #[test]
    fn text_without_references_is_untouched() {
        let text = "no chapters mentioned here\n";
        let (out, unresolved) = resolve_chapter_refs(text, &labels());
        assert_eq!(out, text);
        assert_eq!(unresolved, 0);
    }
}
