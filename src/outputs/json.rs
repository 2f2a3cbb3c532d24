//! JSON collection files.
//!
//! A collection is a pretty-printed array of [`EnrichedRecord`]s. The
//! extraction pass reads one back, fills in abstracts and keywords, then
//! writes `{stem}_with_abstracts.json` next to it and rewrites the input.

use crate::error::ConfigError;
use crate::models::EnrichedRecord;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write records as pretty-printed JSON.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub async fn write_records(records: &[EnrichedRecord], path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(records)?;
    if let Err(e) = fs::write(path, json).await {
        error!(error = %e, "Failed to write JSON");
        return Err(e.into());
    }
    info!("Wrote JSON collection");
    Ok(())
}

/// Load a collection written by [`write_records`].
///
/// A missing file is [`ConfigError::MissingInput`].
pub async fn read_collection(path: &Path) -> Result<Vec<EnrichedRecord>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingInput(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path).await.map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<EnrichedRecord> =
        serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), count = records.len(), "Loaded collection");
    Ok(records)
}

/// `dir/articles.json` becomes `dir/articles_with_abstracts.json`.
pub fn enriched_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "collection".to_string());
    input.with_file_name(format!("{stem}_with_abstracts.json"))
}
