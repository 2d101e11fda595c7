//! CLI binary for tex2site.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tex2site::{
    convert, convert_to_dir, CitationMode, CitationScope, ConversionConfig, PandocConverter,
    SiteOutput, UnmatchedFigures,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Rebuild a book into ./docs (one .rst per chapter plus index.rst)
  tex2site book.tex -o docs/

  # Concatenated document on stdout
  tex2site book.tex

  # Resolve citations inline against a JSON bibliography
  tex2site book.tex -o docs/ --citations resolved --bibliography refs.json

  # Scan an auxiliary file for section identifier badges
  tex2site book.tex -o docs/ --features Chapters/FeatureDef.tex

  # Full structured output as JSON
  tex2site --json book.tex > site.json

ENVIRONMENT VARIABLES:
  TEX2SITE_PANDOC   Converter executable to invoke (default: pandoc)
  RUST_LOG          Tracing filter, e.g. tex2site=debug

SETUP:
  pandoc must be on PATH (or named via TEX2SITE_PANDOC). The converter
  runs with the master file's directory as working directory so that
  \input includes resolve.
"#;

/// Rebuild a LaTeX book into a tree of cross-referenced RST documents.
#[derive(Parser, Debug)]
#[command(
    name = "tex2site",
    version,
    about = "Rebuild a LaTeX book into a tree of cross-referenced RST documents",
    long_about = "Drive an external LaTeX-to-RST converter over a book's master file, repair \
its output (headings, tables, figures, citations, math, footnotes), and split the result \
into one document per chapter with a navigation index.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Master LaTeX file of the book.
    input: PathBuf,

    /// Write the document tree into this directory instead of stdout.
    #[arg(short = 'o', long, env = "TEX2SITE_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Auxiliary LaTeX file scanned for section identifier codes.
    #[arg(long, env = "TEX2SITE_FEATURES")]
    features: Option<PathBuf>,

    /// JSON bibliography database (required for --citations resolved).
    #[arg(long, env = "TEX2SITE_BIBLIOGRAPHY")]
    bibliography: Option<PathBuf>,

    /// Citation rendering: symbolic roles or inline numeric markers.
    #[arg(long, env = "TEX2SITE_CITATIONS", value_enum, default_value = "symbolic")]
    citations: CitationsArg,

    /// Citation numbering scope.
    #[arg(long, env = "TEX2SITE_CITATION_SCOPE", value_enum, default_value = "global")]
    citation_scope: ScopeArg,

    /// Policy for figure placeholders with no source record.
    #[arg(long, env = "TEX2SITE_UNMATCHED_FIGURES", value_enum, default_value = "keep")]
    unmatched_figures: FiguresArg,

    /// Extension substituted for vector figure filenames.
    #[arg(long, env = "TEX2SITE_RASTER_EXT", default_value = "png")]
    raster_ext: String,

    /// Heading underline characters to seed the classifier, shallowest first.
    #[arg(long, env = "TEX2SITE_SEEDS", default_value = "=-")]
    seeds: String,

    /// Do not add a References entry to the navigation index.
    #[arg(long, env = "TEX2SITE_NO_REFERENCES")]
    no_references: bool,

    /// Converter executable to invoke.
    #[arg(long, env = "TEX2SITE_PANDOC", default_value = "pandoc")]
    pandoc: String,

    /// Output structured JSON (SiteOutput) instead of documents.
    #[arg(long, env = "TEX2SITE_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "TEX2SITE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TEX2SITE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "TEX2SITE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum CitationsArg {
    Symbolic,
    Resolved,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ScopeArg {
    Global,
    PerUnit,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum FiguresArg {
    Keep,
    Rewrite,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active; the
    // summary line carries everything the user needs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli).context("Invalid configuration")?;
    let converter = PandocConverter::new(&cli.pandoc);

    let spinner = if show_progress {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Converting");
        bar.set_message(cli.input.display().to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    // ── Run conversion ───────────────────────────────────────────────────
    let result = match &cli.out_dir {
        Some(out_dir) => convert_to_dir(&cli.input, &converter, &config, out_dir),
        None => convert(&cli.input, &converter, &config),
    };
    if let Some(bar) = &spinner {
        bar.finish_and_clear();
    }
    let output = result.context("Conversion failed")?;

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if cli.out_dir.is_none() {
        print_concatenated(&output)?;
    }

    if !cli.quiet {
        print_summary(&cli, &output);
    }
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .marker_seeds(cli.seeds.chars())
        .citation_mode(match cli.citations {
            CitationsArg::Symbolic => CitationMode::Symbolic,
            CitationsArg::Resolved => CitationMode::Resolved,
        })
        .citation_scope(match cli.citation_scope {
            ScopeArg::Global => CitationScope::Global,
            ScopeArg::PerUnit => CitationScope::PerUnit,
        })
        .unmatched_figures(match cli.unmatched_figures {
            FiguresArg::Keep => UnmatchedFigures::Keep,
            FiguresArg::Rewrite => UnmatchedFigures::Rewrite,
        })
        .raster_extension(cli.raster_ext.clone())
        .references_page(!cli.no_references);

    if let Some(path) = &cli.features {
        builder = builder.features_path(path);
    }
    if let Some(path) = &cli.bibliography {
        builder = builder.bibliography_path(path);
    }

    if matches!(cli.citations, CitationsArg::Resolved) && cli.bibliography.is_none() {
        anyhow::bail!("--citations resolved requires --bibliography");
    }

    Ok(builder.build()?)
}

/// Print every unit in order to stdout (the no-out-dir mode).
fn print_concatenated(output: &SiteOutput) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for unit in &output.units {
        handle
            .write_all(unit.text.as_bytes())
            .context("Failed to write to stdout")?;
        handle.write_all(b"\n").context("Failed to write to stdout")?;
    }
    Ok(())
}

fn print_summary(cli: &Cli, output: &SiteOutput) {
    let stats = &output.stats;
    let tick = if stats.is_clean() { green("✔") } else { cyan("⚠") };
    let target = match &cli.out_dir {
        Some(dir) => format!("  →  {}", bold(&dir.display().to_string())),
        None => String::new(),
    };
    eprintln!(
        "{tick}  {} units  {} tables  {} figures  {}ms{target}",
        bold(&stats.units.to_string()),
        stats.tables_rebuilt,
        stats.figures_rebuilt,
        stats.duration_ms,
    );
    if !stats.is_clean() {
        eprintln!(
            "   {}",
            dim(&format!(
                "{} unmatched figures, {} dropped citation keys, {} unresolved refs",
                stats.figures_unmatched, stats.citation_keys_dropped, stats.refs_unresolved
            ))
        );
    }
}
