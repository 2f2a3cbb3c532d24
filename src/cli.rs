//! Command-line interface definitions.
//!
//! Two subcommands share one optional YAML configuration file:
//! `collect` runs the multi-source collection and `extract` fills in
//! abstracts and keywords for a previously written JSON collection.
//! Flags given on the command line override the configuration file; every
//! override is applied in [`CollectArgs::apply_overrides`].

use crate::config::ScraperConfig;
use crate::models::Source;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Collect finance and AI research articles from public sources.
///
/// # Examples
///
/// ```sh
/// # Default run: every source, 20 keywords, stop at 1000 articles
/// finance_ai_papers collect
///
/// # Quick run without arXiv and without PDFs
/// finance_ai_papers collect --target 50 --skip arxiv --no-download
///
/// # Enrich a collection with abstracts from its PDFs
/// finance_ai_papers extract --index articles_ia_finance_complet_20250506_143000.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML configuration file
    #[arg(short, long, global = true, env = "FINANCE_PAPERS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search the sources and save the collected articles
    Collect(CollectArgs),
    /// Extract abstracts and keywords from downloaded PDFs
    Extract(ExtractArgs),
}

#[derive(Args, Debug, Default)]
pub struct CollectArgs {
    /// Stop once this many unique articles are collected
    #[arg(long)]
    pub target: Option<usize>,

    /// Search keyword; repeat for several (replaces the configured list)
    #[arg(short, long = "keyword")]
    pub keywords: Vec<String>,

    /// Source to query, in priority order; repeat for several
    #[arg(short, long = "source", value_enum)]
    pub sources: Vec<Source>,

    /// Source to leave out of the run; repeat for several
    #[arg(long = "skip", value_enum)]
    pub skip: Vec<Source>,

    /// Do not download PDFs
    #[arg(long)]
    pub no_download: bool,

    /// Keep articles that do not match the finance vocabulary
    #[arg(long)]
    pub no_strict: bool,

    /// Root directory for downloaded PDFs
    #[arg(long, env = "FINANCE_PAPERS_PDF_DIR")]
    pub pdf_dir: Option<PathBuf>,

    /// Directory for the CSV, JSON and HTML outputs
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// File name prefix of the outputs
    #[arg(long)]
    pub output_stem: Option<String>,
}

impl CollectArgs {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut ScraperConfig) {
        if let Some(target) = self.target {
            config.target_count = target;
        }
        if !self.keywords.is_empty() {
            config.keywords = self.keywords.clone();
        }
        if !self.sources.is_empty() {
            config.sources = self.sources.clone();
        }
        config.sources.retain(|source| !self.skip.contains(source));
        if self.no_download {
            config.download_pdfs = false;
        }
        if self.no_strict {
            config.strict_filter = false;
        }
        if let Some(dir) = &self.pdf_dir {
            config.pdf_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(stem) = &self.output_stem {
            config.output_stem = stem.clone();
        }
    }
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// JSON collection written by `collect`
    #[arg(long)]
    pub index: PathBuf,

    /// Number of leading pages to read from each PDF
    #[arg(long)]
    pub pages: Option<usize>,
}
