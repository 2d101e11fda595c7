//! # tex2site
//!
//! Rebuild a LaTeX book into a tree of cross-referenced RST documents.
//!
//! ## Why this crate?
//!
//! Off-the-shelf converters translate a LaTeX book into one flat RST file
//! and mangle everything a book actually relies on: heading markers come
//! out inconsistent between chapters, tables survive only as raw pipe
//! dumps, figure metadata is dropped, `\cite` macros are wrapped in dead
//! raw-latex roles, and footnotes stay glued to source-file positions that
//! mean nothing after splitting. This crate drives the converter and then
//! repairs its output pass by pass, carving the result into one document
//! per chapter with a navigation index — the shape a documentation site
//! expects.
//!
//! ## Pipeline Overview
//!
//! ```text
//! book.tex
//!  │
//!  ├─ 1. Scan     figure records, chapter labels, section codes
//!  ├─ 2. Convert  external converter (pandoc) → one RST string
//!  ├─ 3. Repair   tables, chapter refs           (whole document)
//!  ├─ 4. Split    heading levels inferred, one unit per chapter
//!  ├─ 5. Repair   citations, math, figures, lists, footnotes  (per unit)
//!  └─ 6. Emit     NN_Title.rst per unit + index.rst + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tex2site::{convert, ConversionConfig, PandocConverter};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let converter = PandocConverter::default();
//!     let output = convert(Path::new("book.tex"), &converter, &config)?;
//!     for unit in &output.units {
//!         println!("{}: {} bytes", unit.file_stem, unit.text.len());
//!     }
//!     eprintln!("clean run: {}", output.stats.is_clean());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `tex2site` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! tex2site = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod bibliography;
pub mod config;
pub mod convert;
pub mod converter;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod source;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use bibliography::{BibDatabase, BibEntry, FormattedCitation};
pub use config::{
    CitationMode, CitationScope, ConversionConfig, ConversionConfigBuilder, UnmatchedFigures,
};
pub use convert::{convert, convert_to_dir};
pub use converter::{Converter, ConverterOptions, PandocConverter};
pub use error::Tex2SiteError;
pub use output::{ConversionStats, SiteOutput, UnitDocument};
