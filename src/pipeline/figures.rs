//! Figure block reconstruction.
//!
//! The converter renders a source figure as a `.. figure:: name.pdf`
//! placeholder followed by an indented block of alt text — and loses the
//! label, alignment and scale along the way (those live in the
//! [`FigureTable`] scanned from the source). This pass finds each
//! placeholder span and replaces it with an anchor line (when the record
//! has a label), a figure directive pointing at the rasterised filename,
//! and the surviving metadata fields.
//!
//! A placeholder whose filename has no record follows the configured
//! [`UnmatchedFigures`] policy: left verbatim, or rewritten to a bare
//! directive with the continuation block discarded. Either way it is
//! logged and counted, never fatal.

use super::lines::{apply_splices, Splice};
use crate::config::UnmatchedFigures;
use crate::source::FigureTable;
use tracing::warn;

const FIGURE_PREFIX: &str = ".. figure:: ";

/// Counters returned by one rebuild pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FigureOutcome {
    pub rebuilt: usize,
    pub unmatched: usize,
}

/// Rebuild every figure placeholder span in the unit's lines.
pub fn rebuild_figures(
    lines: &mut Vec<String>,
    figures: &FigureTable,
    policy: UnmatchedFigures,
    raster_extension: &str,
) -> FigureOutcome {
    let mut outcome = FigureOutcome::default();
    let mut splices: Vec<Splice> = Vec::new();

    let mut open: Option<(usize, String)> = None;
    let mut indent: Option<String> = None;

    for i in 0..lines.len() {
        let line = &lines[i];

        if let Some(name) = line.strip_prefix(FIGURE_PREFIX) {
            open = Some((i, name.to_string()));
            indent = None;
        } else if open.is_some() {
            let ends_block = match &indent {
                None => {
                    if line.trim().is_empty() {
                        true
                    } else {
                        let leading: String =
                            line.chars().take_while(|c| c.is_whitespace()).collect();
                        indent = Some(leading);
                        false
                    }
                }
                Some(expected) => {
                    line.trim().is_empty()
                        || !line.starts_with(expected.as_str())
                        || line[expected.len()..]
                            .chars()
                            .next()
                            .is_none_or(|c| c.is_whitespace())
                }
            };

            if ends_block {
                let (start, name) = open.take().expect("figure block is open");
                if let Some(replacement) =
                    render_figure(&name, figures, policy, raster_extension, &mut outcome)
                {
                    splices.push(Splice {
                        start,
                        end: i,
                        replacement,
                    });
                }
                indent = None;
            }
        }
    }

    apply_splices(lines, splices);
    outcome
}

/// Replacement lines for one placeholder, or `None` to keep the span.
fn render_figure(
    name: &str,
    figures: &FigureTable,
    policy: UnmatchedFigures,
    raster_extension: &str,
    outcome: &mut FigureOutcome,
) -> Option<Vec<String>> {
    let rasterised = rasterise_filename(name, raster_extension);

    let Some(record) = figures.get(name) else {
        warn!("No figure record for {name}, applying {policy:?} policy");
        outcome.unmatched += 1;
        return match policy {
            UnmatchedFigures::Keep => None,
            UnmatchedFigures::Rewrite => Some(vec![format!("{FIGURE_PREFIX}{rasterised}")]),
        };
    };

    outcome.rebuilt += 1;
    let mut replacement = Vec::new();
    if let Some(label) = &record.label {
        replacement.push(format!(".. _{label}:"));
    }
    replacement.push(format!("{FIGURE_PREFIX}{rasterised}"));
    if let Some(align) = &record.align {
        replacement.push(format!("   :align: {}", align.trim()));
    }
    if let Some(scale) = &record.scale {
        replacement.push(format!("   :scale: {}", scale.trim()));
    }
    Some(replacement)
}

/// Swap a vector `.pdf` extension for the raster format used on the site.
fn rasterise_filename(name: &str, raster_extension: &str) -> String {
    match name.strip_suffix(".pdf") {
        Some(stem) => format!("{stem}.{raster_extension}"),
        None => name.to_string(),
    }
}
