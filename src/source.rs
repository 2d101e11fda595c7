//! LaTeX source scans: lookup tables built from the *original* document.
//!
//! The generic converter loses information the site build needs back:
//! figure labels and scaling are dropped, chapter labels disappear, and the
//! per-section identifier codes live in a macro the converter does not
//! understand. Each scan here runs once over the raw LaTeX text, before any
//! conversion output is touched, and produces a read-only table consumed by
//! the reconstruction passes.
//!
//! These scans assume one author's conventions (see the crate docs): the
//! patterns are fixed, and source text that does not match them simply
//! contributes nothing to the tables.

use crate::error::Tex2SiteError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

/// Everything a figure placeholder needs to be rebuilt, keyed in
/// [`FigureTable`] by the filename referenced in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FigureRecord {
    /// Horizontal alignment (`"center"` when the environment uses `\centering`).
    pub align: Option<String>,
    /// Caption text, verbatim from the source.
    pub caption: Option<String>,
    /// Cross-reference label, rendered as an anchor line before the directive.
    pub label: Option<String>,
    /// Scale as a percentage string, e.g. `"60"` for `scale=0.60`.
    pub scale: Option<String>,
}

/// Figure filename → record, populated once per run.
pub type FigureTable = HashMap<String, FigureRecord>;

/// Normalised chapter title (lowercased) → cross-reference label.
pub type ChapterLabels = HashMap<String, String>;

/// One identifier code attached to a section title.
///
/// The source marks feature classes and individual features with a
/// four-character `\id{CODE}` macro inside the section title; the site shows
/// the code as a badge next to the corresponding heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRecord {
    /// Four-character identifier, e.g. `"HCGA"`.
    pub code: String,
    /// Section title as it will appear in the converter output.
    pub title: String,
    /// Optional cross-reference label attached to the section.
    pub label: Option<String>,
}

/// Read a LaTeX source file, failing fast when it does not exist.
pub fn read_source(path: &Path) -> Result<String, Tex2SiteError> {
    if !path.is_file() {
        return Err(Tex2SiteError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| Tex2SiteError::AuxiliaryReadFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

// ── Figure records ───────────────────────────────────────────────────────

static RE_FIGURE_ENV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\begin\{figure\}.*\n(?P<body>(?:.+\n)+)\\end\{figure\}").unwrap());
static RE_CAPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\caption\{(.+)\}").unwrap());
static RE_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\label\{(.+)\}").unwrap());
static RE_GRAPHICS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\includegraphics(?:\[.*scale=(?P<scale>0\.\d+)\])?\{(?P<name>.+)\}").unwrap()
});

/// Scan `figure` environments and build the [`FigureTable`].
///
/// One environment can reference several graphics (subfigures); each
/// filename gets its own copy of the shared alignment/caption/label, plus
/// its own scale when the `\includegraphics` options carry one.
pub fn scan_figures(tex: &str) -> FigureTable {
    let mut figures = FigureTable::new();

    for env in RE_FIGURE_ENV.captures_iter(tex) {
        let body = &env["body"];
        let mut shared = FigureRecord::default();

        if body.contains(r"\centering") {
            shared.align = Some("center".to_string());
        }
        if let Some(m) = RE_CAPTION.captures(body) {
            shared.caption = Some(m[1].to_string());
        }
        if let Some(m) = RE_LABEL.captures(body) {
            shared.label = Some(m[1].to_string());
        }

        for graphics in RE_GRAPHICS.captures_iter(body) {
            let mut record = shared.clone();
            if let Some(scale) = graphics.name("scale") {
                if let Ok(fraction) = scale.as_str().parse::<f64>() {
                    record.scale = Some(((fraction * 100.0) as i64).to_string());
                }
            }
            figures.insert(graphics["name"].to_string(), record);
        }
    }

    figures
}

// ── Chapter labels ───────────────────────────────────────────────────────

static RE_CHAPTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\chapter.?\{(?P<title>\w+(?: \w+)*)\}\\label\{(?P<label>\w+(?:[ _]\w+)*)\}")
        .unwrap()
});

/// Scan `\chapter{Title}\label{label}` pairs into the [`ChapterLabels`] table.
///
/// Titles are lowercased so the splitter can match them case-insensitively
/// against converter output; spaces inside labels become underscores to form
/// valid reference targets.
pub fn scan_chapter_labels(tex: &str) -> ChapterLabels {
    RE_CHAPTER
        .captures_iter(tex)
        .map(|m| (m["title"].to_lowercase(), m["label"].replace(' ', "_")))
        .collect()
}

// ── Section identifier codes ─────────────────────────────────────────────

static RE_SECTION_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\\(?P<sub>sub)?section\[.+\]\{(?P<title>.+)\\id\{(?P<code>\w{4})\}\}(?: ?\\label\{(?P<label>.+)\})?",
    )
    .unwrap()
});

/// Scan `\section[..]{Title\id{CODE}}` definitions.
///
/// Returns `(class_codes, feature_codes)`: `\section` entries are feature
/// *classes*, `\subsection` entries individual features. Both lists stay in
/// source order — the splitter merges them against headings monotonically
/// and never rescans.
pub fn scan_section_codes(tex: &str) -> (Vec<CodeRecord>, Vec<CodeRecord>) {
    let mut class_codes = Vec::new();
    let mut feature_codes = Vec::new();

    for m in RE_SECTION_ID.captures_iter(tex) {
        let record = CodeRecord {
            code: m["code"].to_string(),
            // pandoc renders \textsuperscript{th} as an RST sup role
            title: m["title"].replace(r"\textsuperscript{th}", r"\ :sup:`th`"),
            label: m.name("label").map(|l| l.as_str().to_string()),
        };
        if m.name("sub").is_some() {
            feature_codes.push(record);
        } else {
            class_codes.push(record);
        }
    }

    (class_codes, feature_codes)
}
