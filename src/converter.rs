//! Converter collaborator: the external markup converter.
//!
//! The heavy lifting of LaTeX → RST is delegated to pandoc; this crate only
//! repairs what pandoc gets wrong. The [`Converter`] trait keeps that
//! boundary explicit and lets tests drive the whole pipeline from an
//! in-memory string instead of a pandoc installation.
//!
//! ## Why run pandoc in the source directory?
//!
//! The master file `\input`s chapter files by relative path, so pandoc must
//! resolve includes relative to the document, not to wherever the operator
//! happened to invoke us. We pass the file's *basename* and set the child
//! process working directory to its parent — no `chdir` in our own process.

use crate::error::Tex2SiteError;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Options handed to the converter for one invocation.
#[derive(Debug, Clone)]
pub struct ConverterOptions {
    /// Target format, e.g. `"rst"`.
    pub to: String,
    /// Extra command-line arguments passed through verbatim.
    pub extra_args: Vec<String>,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            to: "rst".to_string(),
            extra_args: vec!["--mathjax".to_string()],
        }
    }
}

/// External document converter.
///
/// Implementations return the converted document as one block of
/// line-oriented text. Empty output is treated as fatal by the caller, not
/// here, so implementations stay free of policy.
pub trait Converter {
    fn convert(&self, source: &Path, options: &ConverterOptions) -> Result<String, Tex2SiteError>;
}

/// Pandoc-backed [`Converter`] implementation.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    /// Program name or path. Default: `"pandoc"`.
    pub program: String,
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self {
            program: "pandoc".to_string(),
        }
    }
}

impl PandocConverter {
    /// Converter backed by the named executable.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Converter for PandocConverter {
    fn convert(&self, source: &Path, options: &ConverterOptions) -> Result<String, Tex2SiteError> {
        let source_dir = match source.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => Path::new(".").to_path_buf(),
        };
        if !source_dir.is_dir() {
            return Err(Tex2SiteError::SourceDirMissing { path: source_dir });
        }
        let basename = source
            .file_name()
            .ok_or_else(|| Tex2SiteError::SourceNotFound {
                path: source.to_path_buf(),
            })?;

        info!("Converting {} via {}", source.display(), self.program);
        let output = Command::new(&self.program)
            .arg(basename)
            .arg("-t")
            .arg(&options.to)
            .args(&options.extra_args)
            .current_dir(&source_dir)
            .output()
            .map_err(|e| Tex2SiteError::ConverterFailed {
                program: self.program.clone(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Tex2SiteError::ConverterFailed {
                program: self.program.clone(),
                detail: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("Converter produced {} bytes", text.len());
        Ok(text)
    }
}
