//! End-to-end pipeline tests.
//!
//! These drive [`tex2site::convert`] with an in-memory converter stub, so
//! they exercise every reconstruction pass against a known line stream
//! without needing a pandoc installation.

use std::path::Path;
use tempfile::TempDir;
use tex2site::converter::ConverterOptions;
use tex2site::{
    convert, convert_to_dir, CitationMode, ConversionConfig, Converter, Tex2SiteError,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Converter stub returning a fixed string regardless of input.
struct FixedConverter(String);

impl Converter for FixedConverter {
    fn convert(&self, _source: &Path, _options: &ConverterOptions) -> Result<String, Tex2SiteError> {
        Ok(self.0.clone())
    }
}

const MASTER_TEX: &str = "\\documentclass{book}\n\
\\chapter{Introduction}\\label{chap_intro}\n\
\\begin{figure}[h]\n\
\\centering\n\
\\includegraphics[scale=0.60]{diagram.pdf}\n\
\\caption{A diagram.}\n\
\\label{fig_diagram}\n\
\\end{figure}\n";

const FEATURES_TEX: &str =
    "\\section[Stats]{Statistical features\\id{HCUG}}\\label{sect_stats}\n";

/// Converter output exercising every repair pass at least once.
const CONVERTED: &str = "Preamble text.\n\
\n\
Introduction\n\
============\n\
\n\
Opening paragraph [1]_ with a footnote.\n\
\n\
.. [1]\n   A historical note.\n\
\n\
Statistical features\n\
--------------------\n\
\n\
See :raw-latex:`\\cite{Smith2020, Jones2019a}` and (**Chapter [chap\\_intro]**).\n\
\n\
| **name** & **value**\n\
| alpha & 1\n\
\n\
.. figure:: diagram.pdf\n   :alt: A diagram.\n   A diagram.\n\
\n\
Methods\n\
=======\n\
\n\
.. math:: E = mc^2\n   continuation\nUses \\abs{x} in text.\n";

struct Fixture {
    _dir: TempDir,
    master: std::path::PathBuf,
    config: ConversionConfig,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let master = dir.path().join("book.tex");
    let features = dir.path().join("features.tex");
    std::fs::write(&master, MASTER_TEX).unwrap();
    std::fs::write(&features, FEATURES_TEX).unwrap();
    let config = ConversionConfig::builder()
        .features_path(&features)
        .build()
        .unwrap();
    Fixture {
        _dir: dir,
        master,
        config,
    }
}

// ── Full-run tests ───────────────────────────────────────────────────────────

#[test]
fn full_run_splits_and_repairs() {
    let fx = fixture();
    let converter = FixedConverter(CONVERTED.to_string());
    let output = convert(&fx.master, &converter, &fx.config).unwrap();

    assert_eq!(output.stats.units, 3);
    assert_eq!(output.stats.tables_rebuilt, 1);
    assert_eq!(output.stats.figures_rebuilt, 1);
    assert_eq!(output.stats.citations_rewritten, 1);
    assert_eq!(output.stats.footnotes_extracted, 1);
    assert!(output.stats.is_clean());

    let titles: Vec<&str> = output.units.iter().map(|u| u.title.as_str()).collect();
    assert_eq!(titles, vec!["Preamble text.", "Introduction", "Methods"]);
    assert_eq!(output.units[1].file_stem, "02_Introduction");
}

#[test]
fn chapter_unit_carries_its_anchor_and_label() {
    let fx = fixture();
    let converter = FixedConverter(CONVERTED.to_string());
    let output = convert(&fx.master, &converter, &fx.config).unwrap();

    let intro = &output.units[1];
    assert_eq!(intro.label.as_deref(), Some("chap_intro"));
    assert!(intro.text.starts_with(".. _chap_intro:\n\nIntroduction\n"));
    // The chapter cross-reference resolved against the same label.
    assert!(intro.text.contains("(:ref:`chap_intro`)"));
}

#[test]
fn table_citation_figure_and_footnote_repairs_land_in_the_unit() {
    let fx = fixture();
    let converter = FixedConverter(CONVERTED.to_string());
    let output = convert(&fx.master, &converter, &fx.config).unwrap();
    let intro = &output.units[1].text;

    assert!(intro.contains(".. list-table::"));
    assert!(intro.contains(":header-rows: 1"));
    assert!(!intro.contains("| alpha"));

    assert!(intro.contains(":cite:`Smith2020,Jones2019a`"));
    assert!(!intro.contains(":raw-latex:"));

    assert!(intro.contains(".. _fig_diagram:\n.. figure:: diagram.png"));
    assert!(intro.contains("   :align: center"));
    assert!(intro.contains("   :scale: 60"));

    // The footnote definition moved from its source position to the unit end.
    assert!(intro.trim_end().ends_with(".. [1]\n   A historical note."));
}

#[test]
fn section_code_badge_renders_under_its_heading() {
    let fx = fixture();
    let converter = FixedConverter(CONVERTED.to_string());
    let output = convert(&fx.master, &converter, &fx.config).unwrap();
    let intro = &output.units[1].text;

    let heading = intro.find("Statistical features\n--------------------").unwrap();
    let badge = intro.find(">HCUG</p>").unwrap();
    assert!(badge > heading);
    assert!(intro.contains(".. raw:: html"));
}

#[test]
fn math_unit_is_dedented_and_macro_expanded() {
    let fx = fixture();
    let converter = FixedConverter(CONVERTED.to_string());
    let output = convert(&fx.master, &converter, &fx.config).unwrap();
    let methods = &output.units[2].text;

    assert!(methods.contains(".. math:: E = mc^2\ncontinuation"));
    assert!(methods.contains("Uses |x| in text."));
}

#[test]
fn index_includes_landing_page_and_lists_the_rest() {
    let fx = fixture();
    let converter = FixedConverter(CONVERTED.to_string());
    let output = convert(&fx.master, &converter, &fx.config).unwrap();

    assert!(output.index.starts_with(".. include:: 01_Preamble_text..rst\n"));
    assert!(output.index.contains("   Home <self>"));
    assert!(output.index.contains("   Introduction <02_Introduction>"));
    assert!(output.index.contains("   Methods <03_Methods>"));
    // Citations were seen, so the navigation points at the references page.
    assert!(output.index.contains("   References <References>"));
}

#[test]
fn units_concatenate_back_to_the_repaired_stream() {
    // Splitting must not lose or duplicate a single line: every input line
    // ends up in exactly one unit, in order.
    let fx = fixture();
    let text = "before any heading\n\nAlpha\n=====\n\nbody\n\nBeta\n====\n\ntail";
    let converter = FixedConverter(text.to_string());
    let config = ConversionConfig::default();
    let output = convert(&fx.master, &converter, &config).unwrap();

    let joined: Vec<String> = output.units.iter().map(|u| u.text.clone()).collect();
    assert_eq!(joined.join("\n"), text);
}

// ── Resolved citations ───────────────────────────────────────────────────────

#[test]
fn resolved_mode_numbers_keys_and_emits_references_page() {
    let dir = TempDir::new().unwrap();
    let master = dir.path().join("book.tex");
    let bibliography = dir.path().join("refs.json");
    std::fs::write(&master, "\\documentclass{book}\n").unwrap();
    std::fs::write(
        &bibliography,
        r#"{
            "Smith2020": {"authors": ["Smith A"], "title": "First", "year": "2020"},
            "Jones2019a": {"authors": ["Jones B"], "title": "Second", "url": "https://example.org/second"}
        }"#,
    )
    .unwrap();

    let config = ConversionConfig::builder()
        .citation_mode(CitationMode::Resolved)
        .bibliography_path(&bibliography)
        .build()
        .unwrap();
    let converter = FixedConverter(
        "Title\n=====\n\nWork of :raw-latex:`\\cite{Jones2019a}` then :raw-latex:`\\cite{Smith2020,Jones2019a}`.\n"
            .to_string(),
    );
    let output = convert(&master, &converter, &config).unwrap();

    // First sight wins the lower number.
    assert!(output.units[0].text.contains("Work of [1]_ then [2]_, [1]_."));
    assert_eq!(output.stats.citation_keys, 2);

    let references = output.units.last().unwrap();
    assert_eq!(references.file_stem, "References");
    assert!(references.text.starts_with("References\n==========\n"));
    assert!(references.text.contains(".. [1]\n   Jones B. Second."));
    assert!(references.text.contains("   https://example.org/second"));
    assert!(references.text.contains(".. [2]\n   Smith A. First."));
}

// ── Failure modes and output writing ─────────────────────────────────────────

#[test]
fn blank_converter_output_is_fatal() {
    let fx = fixture();
    let converter = FixedConverter("  \n\n".to_string());
    let err = convert(&fx.master, &converter, &fx.config).unwrap_err();
    assert!(matches!(err, Tex2SiteError::EmptyConversion { .. }));
}

#[test]
fn missing_master_file_is_fatal() {
    let converter = FixedConverter("irrelevant".to_string());
    let err = convert(
        Path::new("/no/such/book.tex"),
        &converter,
        &ConversionConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Tex2SiteError::SourceNotFound { .. }));
}

#[test]
fn convert_to_dir_writes_every_document() {
    let fx = fixture();
    let out_dir = fx._dir.path().join("site");
    let converter = FixedConverter(CONVERTED.to_string());
    let output = convert_to_dir(&fx.master, &converter, &fx.config, &out_dir).unwrap();

    for unit in &output.units {
        let path = out_dir.join(format!("{}.rst", unit.file_stem));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.ends_with('\n'), "{} missing trailing newline", path.display());
    }
    let index = std::fs::read_to_string(out_dir.join("index.rst")).unwrap();
    assert_eq!(index, output.index);
}
