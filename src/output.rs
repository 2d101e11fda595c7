//! Output types: the document tree a conversion run produces.
//!
//! A run yields one [`UnitDocument`] per top-level unit (chapter or major
//! section), an `index.rst` navigation page, and a [`ConversionStats`]
//! record. The stats carry the soft-anomaly counters described in
//! [`crate::error`] so operators can tell a clean run from one that limped
//! through unresolved references without reading the log.

use serde::{Deserialize, Serialize};

/// One reconstructed top-level output document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDocument {
    /// Title line of the unit (first line of its heading).
    pub title: String,

    /// Output file stem, e.g. `"03_Image_processing"`. The `.rst` extension
    /// is appended at write time.
    pub file_stem: String,

    /// Cross-reference label from the chapter label table, when the title
    /// matched a labelled chapter in the source.
    pub label: Option<String>,

    /// Fully reconstructed document text, newline-joined.
    pub text: String,
}

/// The assembled site: all units plus the navigation index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteOutput {
    /// Units in emission order. The first is the landing page.
    pub units: Vec<UnitDocument>,

    /// Rendered `index.rst` content.
    pub index: String,

    /// Counters for the run.
    pub stats: ConversionStats,
}

/// Statistics and soft-anomaly counters for one conversion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Number of top-level units emitted.
    pub units: usize,

    /// Pipe-delimited table blocks rebuilt into list-tables.
    pub tables_rebuilt: usize,

    /// Figure placeholders replaced using a matching record.
    pub figures_rebuilt: usize,

    /// Figure placeholders with no record (handled per configured policy).
    pub figures_unmatched: usize,

    /// Citation macros rewritten.
    pub citations_rewritten: usize,

    /// Distinct citation keys assigned a sequence number (resolved mode;
    /// zero in symbolic mode, where numbering is the site build's job).
    pub citation_keys: usize,

    /// Citation keys dropped because the bibliography has no entry.
    pub citation_keys_dropped: usize,

    /// Footnote definitions extracted from the stream.
    pub footnotes_extracted: usize,

    /// Chapter references that could not be resolved against the label table.
    pub refs_unresolved: usize,

    /// Wall-clock duration of the whole run in milliseconds.
    pub duration_ms: u64,
}

impl ConversionStats {
    /// True when the run completed without any soft anomaly.
    pub fn is_clean(&self) -> bool {
        self.figures_unmatched == 0 && self.citation_keys_dropped == 0 && self.refs_unresolved == 0
    }
}
