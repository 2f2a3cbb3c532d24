//! # finance_ai_papers
//!
//! Collects research articles at the intersection of finance and AI from
//! public academic sources, keeps the ones that are on topic, downloads
//! their PDFs, and saves the collection as CSV, JSON and a browsable HTML
//! index. A second pass extracts abstracts and keywords from the PDFs.
//!
//! ## Features
//!
//! - Eight sources: arXiv, SSRN, Google Scholar, the Journal of Financial
//!   Data Science, the Journal of Banking and Finance, IEEE Xplore, JMLR and
//!   ResearchGate
//! - Finance vocabulary relevance filter, switchable per run and per source
//! - Title-based deduplication across sources and keywords
//! - Early stop once a target number of articles is reached
//! - Abstract and keyword extraction from downloaded PDFs
//!
//! ## Usage
//!
//! ```sh
//! finance_ai_papers collect --target 200
//! finance_ai_papers extract --index articles_ia_finance_complet_20250506_143000.json
//! ```
//!
//! ## Architecture
//!
//! 1. **Collection**: for each keyword, query each source in priority order
//! 2. **Filtering**: drop off-topic candidates and duplicates
//! 3. **Download**: fetch PDFs where the source allows it
//! 4. **Output**: write CSV, JSON and the HTML index
//! 5. **Extraction** (separate command): enrich the JSON with abstracts and keywords

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod dedup;
mod error;
mod extract;
mod filter;
mod models;
mod outputs;
mod pdf;
mod pipeline;
mod scrapers;
mod utils;

use cli::{Cli, CollectArgs, Command, ExtractArgs};
use config::ScraperConfig;
use error::ConfigError;
use extract::{LopdfReader, enrich_collection};
use outputs::json;
use pdf::PdfFetcher;
use pipeline::Pipeline;
use scrapers::{AdapterRegistry, build_client};
use utils::{ensure_writable_dir, run_timestamp};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("finance_ai_papers starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = match &args.config {
        Some(path) => ScraperConfig::load(path).inspect_err(|e| {
            error!(error = %e, "Could not load configuration");
        })?,
        None => ScraperConfig::default(),
    };

    match args.command {
        Command::Collect(collect_args) => collect(&mut config, &collect_args).await?,
        Command::Extract(extract_args) => extract(&config, &extract_args).await?,
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

async fn collect(config: &mut ScraperConfig, args: &CollectArgs) -> Result<(), Box<dyn Error>> {
    args.apply_overrides(config);
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid run configuration");
        return Err(e.into());
    }

    if let Err(e) = ensure_writable_dir(&config.output_dir).await {
        error!(
            path = %config.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let fetcher = if config.download_pdfs {
        ensure_writable_dir(&config.pdf_dir).await?;
        Some(PdfFetcher::new(PdfFetcher::client_for(config)?, &config.pdf_dir))
    } else {
        None
    };

    let client = build_client(config)?;
    let registry = AdapterRegistry::with_defaults(client, config);
    info!(
        sources = registry.len(),
        keywords = config.keywords.len(),
        target = config.target_count,
        strict = config.strict_filter,
        download = config.download_pdfs,
        "Starting collection"
    );

    let keywords = config.keywords.clone();
    let sources = config.sources.clone();
    let target = config.target_count;
    let pipeline = Pipeline::new(config.clone(), registry, fetcher);
    let mut report = pipeline.run(&keywords, &sources, target).await;

    let settings = pipeline.config();
    let saved = outputs::write_all(
        &report.records,
        &settings.output_dir,
        &settings.output_stem,
        &run_timestamp(),
        settings.download_pdfs,
    )
    .await;
    match saved {
        Ok(Some(paths)) => {
            report.mark_persisted();
            info!(
                csv = %paths.csv.display(),
                json = %paths.json.display(),
                index = ?paths.html_index,
                "Saved collection"
            );
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "Failed to save collection");
            return Err(e);
        }
    }

    info!(
        records = report.records.len(),
        pdfs = report.stats.pdfs_downloaded,
        duplicates = report.stats.duplicates + report.stats.final_duplicates_removed,
        rejected = report.stats.rejected,
        phase = ?report.phase,
        "Run summary"
    );
    Ok(())
}

async fn extract(config: &ScraperConfig, args: &ExtractArgs) -> Result<(), Box<dyn Error>> {
    let pages = args.pages.unwrap_or(config.text_pages);
    if pages == 0 {
        let e = ConfigError::Invalid("--pages must be at least 1".to_string());
        error!(error = %e, "Invalid extraction settings");
        return Err(e.into());
    }

    let mut records = match json::read_collection(&args.index).await {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, "Could not load collection");
            return Err(e.into());
        }
    };

    let (records, stats) = tokio::task::spawn_blocking(move || {
        let stats = enrich_collection(&mut records, &LopdfReader, pages);
        (records, stats)
    })
    .await?;

    let enriched = json::enriched_path(&args.index);
    json::write_records(&records, &enriched).await?;
    json::write_records(&records, &args.index).await?;
    info!(
        processed = stats.processed,
        abstracts = stats.abstracts_found,
        keywords = stats.keywords_found,
        output = %enriched.display(),
        "Collection enriched"
    );
    Ok(())
}
