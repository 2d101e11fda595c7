//! Conversion entry points.
//!
//! [`convert`] runs the whole reconstruction in memory and returns the
//! assembled [`SiteOutput`]; [`convert_to_dir`] additionally writes one
//! `.rst` file per unit plus the `index.rst` navigation page.
//!
//! The run is strictly single-pass and single-threaded: the passes are
//! string and line transforms that each take well under a second on a
//! book-sized document, so there is nothing worth parallelising, and the
//! citation table and annotation cursors are inherently sequential.

use crate::bibliography::BibDatabase;
use crate::config::{CitationMode, CitationScope, ConversionConfig};
use crate::converter::{Converter, ConverterOptions};
use crate::error::Tex2SiteError;
use crate::output::{ConversionStats, SiteOutput, UnitDocument};
use crate::pipeline::citations::{CitationRendering, CitationTable};
use crate::pipeline::headings::Annotation;
use crate::pipeline::{citations, figures, footnotes, headings, lines, lists, math, refs, tables};
use crate::source;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a LaTeX master file into the reconstructed document tree.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `source_path` — The master `.tex` file; the converter runs with its
///   directory as working directory so `\input` includes resolve.
/// * `converter` — The external LaTeX → RST converter to invoke.
/// * `config` — Conversion configuration.
///
/// # Returns
/// `Ok(SiteOutput)` on success, even when some repairs could not be made
/// (check `output.stats.is_clean()`).
///
/// # Errors
/// Returns `Err(Tex2SiteError)` only for fatal conditions: missing input
/// files, a converter that fails to run or produces nothing, or an
/// unparseable bibliography.
pub fn convert(
    source_path: &Path,
    converter: &dyn Converter,
    config: &ConversionConfig,
) -> Result<SiteOutput, Tex2SiteError> {
    let total_start = Instant::now();
    info!("Starting conversion: {}", source_path.display());

    // ── Step 1: Read inputs ──────────────────────────────────────────────
    let tex = source::read_source(source_path)?;
    let converted = converter.convert(source_path, &ConverterOptions::default())?;
    if converted.trim().is_empty() {
        return Err(Tex2SiteError::EmptyConversion {
            path: source_path.to_path_buf(),
        });
    }

    // ── Step 2: Scan the source for lookup tables ────────────────────────
    let figure_table = source::scan_figures(&tex);
    let chapter_labels = source::scan_chapter_labels(&tex);
    let (class_codes, feature_codes) = match &config.features_path {
        Some(path) => {
            let features_tex = source::read_source(path)?;
            source::scan_section_codes(&features_tex)
        }
        None => (Vec::new(), Vec::new()),
    };
    debug!(
        "Scanned {} figures, {} chapter labels, {} + {} section codes",
        figure_table.len(),
        chapter_labels.len(),
        class_codes.len(),
        feature_codes.len()
    );

    let bibliography = match (&config.citation_mode, &config.bibliography_path) {
        (CitationMode::Resolved, Some(path)) => BibDatabase::from_json_file(path)?,
        _ => BibDatabase::default(),
    };

    // ── Step 3: Whole-document string passes ─────────────────────────────
    let (text, tables_rebuilt) = tables::rebuild_tables(&converted);
    let (text, refs_unresolved) = refs::resolve_chapter_refs(&text, &chapter_labels);

    // ── Step 4: Split into lines, lift footnotes, carve units ────────────
    let mut stream = lines::to_lines(&text);
    let footnote_table = footnotes::extract_footnotes(&mut stream);
    let units = headings::split_units(
        stream,
        &config.marker_seeds,
        &[&class_codes, &feature_codes],
    );
    info!("Split document into {} units", units.len());

    // ── Step 5: Per-unit passes ──────────────────────────────────────────
    let mut stats = ConversionStats {
        tables_rebuilt,
        refs_unresolved,
        footnotes_extracted: footnote_table.len(),
        units: units.len(),
        ..Default::default()
    };

    let mut global_citations = CitationTable::new();
    let mut documents: Vec<UnitDocument> = Vec::with_capacity(units.len());

    for (n, unit) in units.into_iter().enumerate() {
        let title = unit.title().to_string();
        let mut unit_lines = unit.lines;

        insert_badges(&mut unit_lines, &unit.annotations);

        let rendering = match config.citation_mode {
            CitationMode::Symbolic => CitationRendering::Symbolic,
            CitationMode::Resolved => CitationRendering::Resolved(&bibliography),
        };
        let mut local_citations = CitationTable::new();
        let citation_table = match config.citation_scope {
            CitationScope::Global => &mut global_citations,
            CitationScope::PerUnit => &mut local_citations,
        };
        let cite_outcome = citations::rewrite_citations(&mut unit_lines, rendering, citation_table);
        stats.citations_rewritten += cite_outcome.rewritten;
        stats.citation_keys_dropped += cite_outcome.dropped;

        math::reindent_math(&mut unit_lines);
        math::expand_formula_macros(&mut unit_lines);

        let figure_outcome = figures::rebuild_figures(
            &mut unit_lines,
            &figure_table,
            config.unmatched_figures,
            &config.raster_extension,
        );
        stats.figures_rebuilt += figure_outcome.rebuilt;
        stats.figures_unmatched += figure_outcome.unmatched;

        lists::reindent_numbered_lists(&mut unit_lines);
        footnotes::attach_footnotes(&mut unit_lines, &footnote_table);

        // Per-unit numbering gets its definitions in the unit itself;
        // global numbering gets one shared references page at the end.
        if config.citation_scope == CitationScope::PerUnit {
            stats.citation_keys += local_citations.len();
            append_citation_definitions(&mut unit_lines, &local_citations);
        }

        let label = chapter_labels.get(&title.to_lowercase()).cloned();
        if let Some(label) = &label {
            unit_lines.splice(0..0, [format!(".. _{label}:"), String::new()]);
        }

        documents.push(UnitDocument {
            file_stem: file_stem(n + 1, &title),
            title,
            label,
            text: unit_lines.join("\n"),
        });
    }

    if config.citation_scope == CitationScope::Global {
        stats.citation_keys = global_citations.len();
    }

    // ── Step 6: Assemble the navigation index ────────────────────────────
    let references_entry = config.references_page && stats.citations_rewritten > 0;
    let index = render_index(&documents, references_entry);

    if config.citation_mode == CitationMode::Resolved
        && config.citation_scope == CitationScope::Global
        && !global_citations.is_empty()
    {
        documents.push(render_references_page(&global_citations));
    }

    stats.duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Conversion complete: {} units, {} tables, {} figures, {}ms",
        stats.units, stats.tables_rebuilt, stats.figures_rebuilt, stats.duration_ms
    );

    Ok(SiteOutput {
        units: documents,
        index,
        stats,
    })
}

/// Convert and write the document tree into `out_dir`.
///
/// Writes `{file_stem}.rst` for every unit plus `index.rst`, creating the
/// directory first. Existing files are overwritten.
pub fn convert_to_dir(
    source_path: &Path,
    converter: &dyn Converter,
    config: &ConversionConfig,
    out_dir: &Path,
) -> Result<SiteOutput, Tex2SiteError> {
    let output = convert(source_path, converter, config)?;

    std::fs::create_dir_all(out_dir).map_err(|e| Tex2SiteError::OutputWriteFailed {
        path: out_dir.to_path_buf(),
        source: e,
    })?;

    for unit in &output.units {
        let path = out_dir.join(format!("{}.rst", unit.file_stem));
        write_document(&path, &unit.text)?;
    }
    write_document(&out_dir.join("index.rst"), &output.index)?;

    info!(
        "Wrote {} documents to {}",
        output.units.len() + 1,
        out_dir.display()
    );
    Ok(output)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Insert one right-aligned identifier badge under each annotated title.
///
/// The badge lands two lines below the title (after the underline), which
/// renders it flush with the heading. Insertion runs back to front so
/// earlier offsets stay valid.
fn insert_badges(lines: &mut Vec<String>, annotations: &[Annotation]) {
    for annotation in annotations.iter().rev() {
        let at = (annotation.offset + 2).min(lines.len());
        lines.splice(
            at..at,
            [
                ".. raw:: html".to_string(),
                String::new(),
                format!(
                    "  <p style=\"color:grey;font-style:italic;text-align:right\">{}</p>",
                    annotation.record.code
                ),
            ],
        );
    }
}

/// Output file stem: two-digit sequence number plus the underscored title.
fn file_stem(n: usize, title: &str) -> String {
    format!("{:02}_{}", n, title.replace(' ', "_"))
}

/// Append `.. [n]` definitions for every citation the table assigned.
fn append_citation_definitions(lines: &mut Vec<String>, table: &CitationTable) {
    for (n, _key, formatted) in table.iter() {
        lines.push(String::new());
        lines.push(format!(".. [{n}]"));
        lines.push(format!("   {}", formatted.text));
        if let Some(url) = &formatted.url {
            lines.push(format!("   {url}"));
        }
    }
}

/// Render the shared references page from the global citation table.
fn render_references_page(table: &CitationTable) -> UnitDocument {
    let mut page = vec!["References".to_string(), "==========".to_string()];
    append_citation_definitions(&mut page, table);
    UnitDocument {
        title: "References".to_string(),
        file_stem: "References".to_string(),
        label: None,
        text: page.join("\n"),
    }
}

/// Render `index.rst`: the first unit is included inline as the landing
/// page, every later unit becomes a toctree entry.
fn render_index(documents: &[UnitDocument], references_entry: bool) -> String {
    let mut index: Vec<String> = Vec::new();

    if let Some(first) = documents.first() {
        index.push(format!(".. include:: {}.rst", first.file_stem));
    }
    index.extend(
        [
            "",
            "Contents",
            "--------",
            "",
            ".. toctree::",
            "   :hidden:",
            "",
            "   Home <self>",
            "",
            ".. toctree::",
            "   :maxdepth: 2",
            "",
        ]
        .map(str::to_string),
    );
    for unit in documents.iter().skip(1) {
        index.push(format!("   {} <{}>", unit.title, unit.file_stem));
    }
    if references_entry {
        index.push("   References <References>".to_string());
    }
    index.push(String::new());
    index.join("\n")
}

fn write_document(path: &Path, text: &str) -> Result<(), Tex2SiteError> {
    let mut content = text.to_string();
    if !content.ends_with('\n') {
        content.push('\n');
    }
    std::fs::write(path, content).map_err(|e| Tex2SiteError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::CodeRecord;

    #[test]
    fn badge_lands_under_the_heading_underline() {
        let mut buf: Vec<String> = ["Intensity features", "==================", "", "body"]
            .map(str::to_string)
            .to_vec();
        insert_badges(
            &mut buf,
            &[Annotation {
                offset: 0,
                record: CodeRecord {
                    code: "HCUG".to_string(),
                    title: "Intensity features".to_string(),
                    label: None,
                },
            }],
        );
        assert_eq!(buf[2], ".. raw:: html");
        assert_eq!(buf[3], "");
        assert!(buf[4].contains(">HCUG</p>"));
        assert_eq!(buf[5], "");
    }

    #[test]
    fn badge_offset_past_end_appends() {
        let mut buf: Vec<String> = vec!["Title".to_string()];
        insert_badges(
            &mut buf,
            &[Annotation {
                offset: 3,
                record: CodeRecord {
                    code: "ZZZZ".to_string(),
                    title: "Title".to_string(),
                    label: None,
                },
            }],
        );
        assert_eq!(buf.len(), 4);
    }

    #[test]
    fn file_stems_are_numbered_and_underscored() {
        assert_eq!(file_stem(3, "Image processing"), "03_Image_processing");
        assert_eq!(file_stem(12, "Glossary"), "12_Glossary");
    }

    #[test]
    fn index_includes_first_unit_and_lists_the_rest() {
        let documents = vec![
            UnitDocument {
                title: "Preamble".to_string(),
                file_stem: "01_Preamble".to_string(),
                label: None,
                text: String::new(),
            },
            UnitDocument {
                title: "Introduction".to_string(),
                file_stem: "02_Introduction".to_string(),
                label: None,
                text: String::new(),
            },
        ];
        let index = render_index(&documents, true);
        assert!(index.starts_with(".. include:: 01_Preamble.rst\n"));
        assert!(index.contains("   Home <self>"));
        assert!(index.contains("   Introduction <02_Introduction>"));
        assert!(index.contains("   References <References>"));
        assert!(index.ends_with('\n'));
    }

    #[test]
    fn index_without_citations_has_no_references_entry() {
        let documents = vec![UnitDocument {
            title: "Only".to_string(),
            file_stem: "01_Only".to_string(),
            label: None,
            text: String::new(),
        }];
        let index = render_index(&documents, false);
        assert!(!index.contains("References"));
    }
}
