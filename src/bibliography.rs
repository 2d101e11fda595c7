//! Bibliography collaborator: structured citation records and their
//! rendered form.
//!
//! Used only in resolved citation mode ([`crate::CitationMode::Resolved`]):
//! the citation rewriter looks keys up here, assigns them sequence numbers,
//! and the assembler renders a references page from the formatted entries.
//! In symbolic mode the database is never consulted.

use crate::error::Tex2SiteError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One citation record, as stored in the JSON database file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BibEntry {
    /// Author names in citation order.
    pub authors: Vec<String>,
    pub title: String,
    #[serde(default)]
    pub journal: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub pages: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
}

/// A rendered citation: display text plus an optional link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedCitation {
    pub text: String,
    pub url: Option<String>,
}

/// Citation key → [`BibEntry`] database.
#[derive(Debug, Clone, Default)]
pub struct BibDatabase {
    entries: HashMap<String, BibEntry>,
}

impl BibDatabase {
    /// Load the database from a JSON object of `key → entry`.
    pub fn from_json_file(path: &Path) -> Result<Self, Tex2SiteError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| Tex2SiteError::AuxiliaryReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        let entries: HashMap<String, BibEntry> =
            serde_json::from_str(&text).map_err(|e| Tex2SiteError::BibliographyParseFailed {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        Ok(Self { entries })
    }

    /// Build a database directly from entries (used by tests and embedders).
    pub fn from_entries(entries: impl IntoIterator<Item = (String, BibEntry)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&BibEntry> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Render one entry as a reference-list line.
///
/// Author lists longer than six are truncated to the first six followed by
/// "et al." — the convention of the journal the source document targets.
/// The link target prefers an explicit `url` field, falling back to a DOI
/// resolver link when only a DOI is present.
pub fn format_entry(entry: &BibEntry) -> FormattedCitation {
    let authors = if entry.authors.len() > 6 {
        format!("{}, et al.", entry.authors[..6].join(", "))
    } else {
        entry.authors.join(", ")
    };

    let mut text = String::new();
    if !authors.is_empty() {
        text.push_str(&authors);
        text.push_str(". ");
    }
    text.push_str(entry.title.trim_end_matches('.'));
    text.push('.');

    if let Some(journal) = &entry.journal {
        text.push(' ');
        text.push_str(journal);
        text.push('.');
    }
    // year;volume(number):pages — emit whichever parts exist
    let mut tail = String::new();
    if let Some(year) = &entry.year {
        tail.push_str(year);
    }
    if let Some(volume) = &entry.volume {
        tail.push(';');
        tail.push_str(volume);
        if let Some(number) = &entry.number {
            tail.push('(');
            tail.push_str(number);
            tail.push(')');
        }
    }
    if let Some(pages) = &entry.pages {
        tail.push(':');
        tail.push_str(pages);
    }
    if !tail.is_empty() {
        text.push(' ');
        text.push_str(&tail);
        text.push('.');
    }

    let url = entry
        .url
        .clone()
        .or_else(|| entry.doi.as_ref().map(|d| format!("https://doi.org/{d}")));

    FormattedCitation { text, url }
}
