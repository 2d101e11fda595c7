//! Configuration types for the book-to-site reconstruction.
//!
//! All behaviour is controlled through [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to serialise a run's settings for logging and to diff two runs to
//! understand why their outputs differ.
//!
//! Two of the knobs exist because the observed behaviour of the system this
//! crate reconstructs is genuinely ambiguous: citation numbers were assigned
//! globally in some revisions and per chapter in others, and unmatched
//! figure placeholders were sometimes kept and sometimes rewritten bare.
//! Rather than guess, both are explicit policies with documented defaults.

use crate::error::Tex2SiteError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one conversion run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use tex2site::{CitationScope, ConversionConfig};
///
/// let config = ConversionConfig::builder()
///     .marker_seeds(['=', '-'])
///     .citation_scope(CitationScope::Global)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Expected heading underline characters, shallowest first. Default: `['=', '-']`.
    ///
    /// The classifier discovers markers on its own, but seeding the two
    /// characters the converter uses for the top two levels pins level 0 and
    /// level 1 to stable characters across documents. An empty seed list is
    /// valid: every marker is then learned from the stream.
    pub marker_seeds: Vec<char>,

    /// Scope of citation sequence numbers. Default: [`CitationScope::Global`].
    pub citation_scope: CitationScope,

    /// How citation macros are rendered. Default: [`CitationMode::Symbolic`].
    pub citation_mode: CitationMode,

    /// What to do with a figure placeholder that has no record in the
    /// source scan. Default: [`UnmatchedFigures::Keep`].
    pub unmatched_figures: UnmatchedFigures,

    /// Extension substituted for vector figure filenames. Default: `"png"`.
    ///
    /// The LaTeX source references `.pdf` graphics, which no HTML renderer
    /// displays inline; the site build exports rasterised copies next to the
    /// documents, so figure directives must point at those.
    pub raster_extension: String,

    /// Append a `References` entry to the navigation index when any
    /// citations were seen. Default: `true`.
    pub references_page: bool,

    /// Auxiliary LaTeX file scanned for section identifier codes.
    /// Default: `None` (no badge annotations are produced).
    pub features_path: Option<PathBuf>,

    /// Bibliography database (JSON) used by [`CitationMode::Resolved`].
    /// Default: `None` — resolved mode with no database drops every key.
    pub bibliography_path: Option<PathBuf>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            marker_seeds: vec!['=', '-'],
            citation_scope: CitationScope::default(),
            citation_mode: CitationMode::default(),
            unmatched_figures: UnmatchedFigures::default(),
            raster_extension: "png".to_string(),
            references_page: true,
            features_path: None,
            bibliography_path: None,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn marker_seeds(mut self, seeds: impl IntoIterator<Item = char>) -> Self {
        self.config.marker_seeds = seeds.into_iter().collect();
        self
    }

    pub fn citation_scope(mut self, scope: CitationScope) -> Self {
        self.config.citation_scope = scope;
        self
    }

    pub fn citation_mode(mut self, mode: CitationMode) -> Self {
        self.config.citation_mode = mode;
        self
    }

    pub fn unmatched_figures(mut self, policy: UnmatchedFigures) -> Self {
        self.config.unmatched_figures = policy;
        self
    }

    pub fn raster_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.raster_extension = ext.into();
        self
    }

    pub fn references_page(mut self, v: bool) -> Self {
        self.config.references_page = v;
        self
    }

    pub fn features_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.features_path = Some(path.into());
        self
    }

    pub fn bibliography_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.bibliography_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Tex2SiteError> {
        let c = &self.config;
        if c.raster_extension.is_empty() || c.raster_extension.starts_with('.') {
            return Err(Tex2SiteError::InvalidConfig(format!(
                "raster extension must be a bare extension like \"png\", got {:?}",
                c.raster_extension
            )));
        }
        if c.marker_seeds.iter().any(|ch| ch.is_alphanumeric()) {
            return Err(Tex2SiteError::InvalidConfig(
                "heading marker seeds must be punctuation characters".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Scope of citation sequence numbering.
///
/// Numbers are assigned first-in-first-out on first sight of a key. Whether
/// the counter (and the key → number map) spans the whole document or resets
/// for every top-level unit changes which number a repeated key gets in
/// later chapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationScope {
    /// One numbering sequence across the whole document. (default)
    ///
    /// A key cited in chapter 1 keeps its number when re-cited in chapter 5,
    /// which is what a shared, site-wide references page requires.
    #[default]
    Global,
    /// Numbering restarts at 1 for every top-level unit.
    PerUnit,
}

/// How a citation macro is rendered in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationMode {
    /// Emit a symbolic `` :cite:`key1,key2` `` role and leave numbering to
    /// the downstream bibliography extension. (default)
    #[default]
    Symbolic,
    /// Resolve keys against the bibliography database inline and emit
    /// numeric `[n]_` reference markers. Keys absent from the database are
    /// dropped from the marker list.
    Resolved,
}

/// Policy for a figure placeholder whose filename has no record from the
/// source scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedFigures {
    /// Leave the placeholder and its continuation block exactly as the
    /// converter produced them. (default)
    #[default]
    Keep,
    /// Replace the span with a bare figure directive (filename rewritten to
    /// the raster extension, no anchor or metadata), discarding the
    /// continuation block.
    Rewrite,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds() {
        let config = ConversionConfig::builder().build().unwrap();
        assert_eq!(config.marker_seeds, vec!['=', '-']);
        assert_eq!(config.citation_scope, CitationScope::Global);
        assert_eq!(config.raster_extension, "png");
    }

    #[test]
    fn rejects_dotted_extension() {
        let err = ConversionConfig::builder()
            .raster_extension(".png")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("bare extension"));
    }

    #[test]
    fn rejects_alphanumeric_seed() {
        let err = ConversionConfig::builder()
            .marker_seeds(['a'])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("punctuation"));
    }

    #[test]
    fn empty_seeds_are_valid() {
        let config = ConversionConfig::builder()
            .marker_seeds([])
            .build()
            .unwrap();
        assert!(config.marker_seeds.is_empty());
    }
}
