//! Citation reconstruction.
//!
//! The converter cannot interpret `\cite{..}` macros and wraps them in a
//! raw-passthrough role: `` :raw-latex:`\cite{Smith2020,Jones2019a}` ``.
//! This pass extracts the comma-separated keys and replaces the whole
//! macro, in one of two modes:
//!
//! * **Symbolic** — emit `` :cite:`Smith2020,Jones2019a` `` and leave
//!   resolution to the site's bibliography extension.
//! * **Resolved** — look each key up in the [`BibDatabase`], assign unseen
//!   keys the next sequence number (first sight wins the lower number, not
//!   alphabetical order), and emit `[n]_` reference markers. Keys the
//!   database does not know are dropped from the marker list with a
//!   warning; a citation whose keys all dropped leaves nothing behind.
//!
//! Numbering scope is the caller's business: pass one [`CitationTable`]
//! across all units for global numbering, or a fresh one per unit.

use crate::bibliography::{format_entry, BibDatabase, FormattedCitation};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

static RE_CITE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r":raw-latex:`\\cite[pt]?\{(?P<keys>[A-Za-z]+(?:-[A-Za-z]+)*\d{4}[A-Za-z]*(?:,\s?[A-Za-z]+(?:-[A-Za-z]+)*\d{4}[A-Za-z]*)*)\}`",
    )
    .unwrap()
});

/// Key → assigned sequence number and formatted text; grows, never shrinks.
#[derive(Debug, Default)]
pub struct CitationTable {
    order: Vec<(String, FormattedCitation)>,
    index: HashMap<String, usize>,
}

impl CitationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number (1-based) for `key`, assigning the next number on
    /// first sight. `None` when the bibliography has no entry for the key.
    pub fn number_for(&mut self, key: &str, bibliography: &BibDatabase) -> Option<usize> {
        if let Some(&idx) = self.index.get(key) {
            return Some(idx + 1);
        }
        let entry = bibliography.get(key)?;
        let idx = self.order.len();
        self.order.push((key.to_string(), format_entry(entry)));
        self.index.insert(key.to_string(), idx);
        Some(idx + 1)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in sequence-number order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, &FormattedCitation)> {
        self.order
            .iter()
            .enumerate()
            .map(|(idx, (key, formatted))| (idx + 1, key.as_str(), formatted))
    }
}

/// How rewritten citations are rendered; see the module docs.
#[derive(Debug, Clone, Copy)]
pub enum CitationRendering<'a> {
    Symbolic,
    Resolved(&'a BibDatabase),
}

/// Counters returned by one rewrite pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CitationOutcome {
    /// Citation macros replaced.
    pub rewritten: usize,
    /// Keys dropped because the bibliography has no entry (resolved mode).
    pub dropped: usize,
}

/// Rewrite every citation macro in the unit's lines.
pub fn rewrite_citations(
    lines: &mut [String],
    rendering: CitationRendering<'_>,
    table: &mut CitationTable,
) -> CitationOutcome {
    let mut outcome = CitationOutcome::default();

    for line in lines.iter_mut() {
        let mut replacements: Vec<(usize, usize, String)> = Vec::new();

        for m in RE_CITE.captures_iter(line) {
            let whole = m.get(0).unwrap();
            let keys: Vec<&str> = m["keys"].split(',').map(str::trim).collect();

            let mut replacement = match rendering {
                CitationRendering::Symbolic => format!(":cite:`{}`", keys.join(",")),
                CitationRendering::Resolved(bibliography) => {
                    let markers: Vec<String> = keys
                        .iter()
                        .filter_map(|key| match table.number_for(key, bibliography) {
                            Some(n) => Some(format!("[{n}]_")),
                            None => {
                                warn!("Citation key {key} not found in bibliography, dropping");
                                outcome.dropped += 1;
                                None
                            }
                        })
                        .collect();
                    markers.join(", ")
                }
            };

            // Keep word spacing: the macro often directly abuts the word
            // before it once the raw role is removed.
            if !replacement.is_empty() && whole.start() > 0 {
                let preceding = line[..whole.start()].chars().next_back();
                if preceding.is_some_and(|c| !c.is_whitespace()) {
                    replacement.insert(0, ' ');
                }
            }

            outcome.rewritten += 1;
            replacements.push((whole.start(), whole.end(), replacement));
        }

        for (start, end, replacement) in replacements.into_iter().rev() {
            line.replace_range(start..end, &replacement);
        }
    }

    outcome
}
