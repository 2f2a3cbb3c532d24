//! CSV export.
//!
//! One row per record. The file starts with a UTF-8 byte order mark so
//! spreadsheet tools detect the encoding; list fields are joined with `"; "`.

use crate::models::EnrichedRecord;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const LIST_SEPARATOR: &str = "; ";

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    source: &'static str,
    external_id: &'a str,
    title: &'a str,
    authors: String,
    summary: &'a str,
    published: String,
    source_url: &'a str,
    pdf_url: &'a str,
    pdf_path: &'a str,
    open_access: &'static str,
    #[serde(rename = "abstract")]
    abstract_text: &'a str,
    keywords: String,
}

impl<'a> From<&'a EnrichedRecord> for CsvRow<'a> {
    fn from(record: &'a EnrichedRecord) -> Self {
        let candidate = &record.candidate;
        Self {
            source: candidate.source.display_name(),
            external_id: candidate.external_id.as_deref().unwrap_or_default(),
            title: &candidate.title,
            authors: candidate.authors.join(LIST_SEPARATOR),
            summary: &candidate.summary,
            published: candidate.published.map(|d| d.to_string()).unwrap_or_default(),
            source_url: &candidate.source_url,
            pdf_url: candidate.pdf_url.as_deref().unwrap_or_default(),
            pdf_path: record.pdf_path.as_deref().unwrap_or_default(),
            open_access: match candidate.open_access {
                Some(true) => "true",
                Some(false) => "false",
                None => "",
            },
            abstract_text: record.abstract_text.as_deref().unwrap_or_default(),
            keywords: record.keywords.join(LIST_SEPARATOR),
        }
    }
}

/// Render records as CSV bytes, BOM included.
pub fn render_csv(records: &[EnrichedRecord]) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub async fn write_csv(records: &[EnrichedRecord], path: &Path) -> Result<(), Box<dyn Error>> {
    let bytes = render_csv(records)?;
    fs::write(path, bytes).await?;
    info!("Wrote CSV export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateRecord, Source};
    use chrono::NaiveDate;

    fn sample() -> EnrichedRecord {
        let mut candidate = CandidateRecord::new(Source::Arxiv, "Deep Hedging, revisited").unwrap();
        candidate.authors = vec!["Hans Buehler".into(), "Lukas Gonon".into()];
        candidate.published = NaiveDate::from_ymd_opt(2018, 2, 8);
        let mut record = EnrichedRecord::from(candidate);
        record.keywords = vec!["hedging".into(), "deep learning".into()];
        record
    }

    #[test]
    fn test_render_csv_has_bom_header_and_joined_lists() {
        let bytes = render_csv(&[sample()]).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "source,external_id,title,authors,summary,published,source_url,pdf_url,pdf_path,open_access,abstract,keywords"
        );
        assert_eq!(
            lines.next().unwrap(),
            "arXiv,,\"Deep Hedging, revisited\",Hans Buehler; Lukas Gonon,,2018-02-08,,,,,,hedging; deep learning"
        );
        assert!(lines.next().is_none());
    }

    #[tokio::test]
    async fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&[sample(), sample()], &path).await.unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
