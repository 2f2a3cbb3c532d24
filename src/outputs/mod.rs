//! Persisted outputs of a collection run.
//!
//! # Submodules
//!
//! - [`csv`]: spreadsheet export with a UTF-8 byte order mark
//! - [`json`]: the machine readable collection, also the input of `extract`
//! - [`html_index`]: a browsable, filterable page linking every PDF
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── {stem}_{timestamp}.csv
//! ├── {stem}_{timestamp}.json
//! └── {stem}_index_{timestamp}.html   # only when PDFs were downloaded
//! ```

pub mod csv;
pub mod html_index;
pub mod json;

use crate::models::{EnrichedRecord, Source};
use chrono::Local;
use itertools::Itertools;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Files written by [`write_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
    pub html_index: Option<PathBuf>,
}

/// Records and downloaded PDFs of one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStats {
    pub source: Source,
    pub records: usize,
    pub pdfs: usize,
}

/// Per-source counts, ordered by source.
pub fn source_stats(records: &[EnrichedRecord]) -> Vec<SourceStats> {
    records
        .iter()
        .into_group_map_by(|record| record.source())
        .into_iter()
        .sorted_by_key(|(source, _)| *source)
        .map(|(source, group)| SourceStats {
            source,
            records: group.len(),
            pdfs: group.iter().filter(|record| record.pdf_path.is_some()).count(),
        })
        .collect()
}

/// Log one line per source plus a total.
pub fn log_source_stats(records: &[EnrichedRecord]) {
    for stats in source_stats(records) {
        info!(
            source = %stats.source,
            records = stats.records,
            pdfs = stats.pdfs,
            "Source statistics"
        );
    }
    info!(records = records.len(), "Total");
}

/// Write CSV, JSON and (optionally) the HTML index for a run.
///
/// # Arguments
///
/// * `records` - The collection to save
/// * `dir` - Output directory, which must already exist
/// * `stem` - File name prefix
/// * `timestamp` - Run timestamp inserted into every file name
/// * `with_index` - Whether to write the HTML index
///
/// # Returns
///
/// The written paths, or `Ok(None)` for an empty collection, in which case
/// nothing is written.
#[instrument(level = "info", skip(records, dir), fields(count = records.len(), dir = %dir.display()))]
pub async fn write_all(
    records: &[EnrichedRecord],
    dir: &Path,
    stem: &str,
    timestamp: &str,
    with_index: bool,
) -> Result<Option<OutputPaths>, Box<dyn Error>> {
    if records.is_empty() {
        warn!("No records to save");
        return Ok(None);
    }

    let paths = OutputPaths {
        csv: dir.join(format!("{stem}_{timestamp}.csv")),
        json: dir.join(format!("{stem}_{timestamp}.json")),
        html_index: with_index.then(|| dir.join(format!("{stem}_index_{timestamp}.html"))),
    };

    csv::write_csv(records, &paths.csv).await?;
    json::write_records(records, &paths.json).await?;
    if let Some(index) = &paths.html_index {
        let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        html_index::write_index(records, index, &generated_at).await?;
    }

    log_source_stats(records);
    Ok(Some(paths))
}
