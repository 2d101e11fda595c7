//! Error types for the tex2site library.
//!
//! Only *fatal* conditions become a [`Tex2SiteError`]: a missing source
//! file, a converter that produced nothing, an output directory we cannot
//! write. Everything else the pipeline meets — a chapter reference with no
//! matching label, a citation key absent from the bibliography, a figure
//! placeholder with no record — is a *soft anomaly*: the pass resolves it
//! locally (empty replacement, verbatim passthrough), emits a
//! `tracing::warn!` for operator visibility, and bumps a counter in
//! [`crate::output::ConversionStats`]. The run always continues past soft
//! anomalies; there is no retry logic anywhere. A failed run needs a
//! corrected input and a fresh invocation.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the tex2site library.
///
/// Soft anomalies never appear here; see [`crate::output::ConversionStats`]
/// for their counters.
#[derive(Debug, Error)]
pub enum Tex2SiteError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The LaTeX master file was not found at the given path.
    #[error("LaTeX source file not found: '{path}'\nCheck the path exists and is readable.")]
    SourceNotFound { path: PathBuf },

    /// The directory containing the source file does not exist, so the
    /// converter cannot be run with it as working directory.
    #[error("Source directory '{path}' does not exist, cannot convert")]
    SourceDirMissing { path: PathBuf },

    /// An auxiliary input (feature definitions, bibliography database)
    /// could not be read.
    #[error("Failed to read auxiliary input '{path}': {source}")]
    AuxiliaryReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Converter errors ──────────────────────────────────────────────────
    /// The external converter process could not be spawned or exited
    /// unsuccessfully.
    #[error("Converter '{program}' failed: {detail}\nIs pandoc installed and on PATH?")]
    ConverterFailed { program: String, detail: String },

    /// The converter ran but returned no content. An empty document is
    /// never a valid conversion result.
    #[error("Empty output was returned by the converter for '{path}'")]
    EmptyConversion { path: PathBuf },

    // ── Bibliography errors ───────────────────────────────────────────────
    /// The bibliography database file exists but is not valid JSON.
    #[error("Failed to parse bibliography database '{path}': {detail}")]
    BibliographyParseFailed { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output document or the index file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_conversion_display() {
        let e = Tex2SiteError::EmptyConversion {
            path: PathBuf::from("book.tex"),
        };
        let msg = e.to_string();
        assert!(msg.contains("book.tex"), "got: {msg}");
        assert!(msg.contains("Empty output"));
    }

    #[test]
    fn converter_failed_display() {
        let e = Tex2SiteError::ConverterFailed {
            program: "pandoc".into(),
            detail: "exit status 2".into(),
        };
        assert!(e.to_string().contains("pandoc"));
        assert!(e.to_string().contains("exit status 2"));
    }

    #[test]
    fn source_dir_missing_display() {
        let e = Tex2SiteError::SourceDirMissing {
            path: PathBuf::from("/nope"),
        };
        assert!(e.to_string().contains("/nope"));
    }
}
