//! Data models for collected articles.
//!
//! - [`Source`]: the known adapter tags
//! - [`CandidateRecord`]: one raw listing entry produced by a source adapter
//! - [`EnrichedRecord`]: a kept record plus its PDF path and extracted text
//!
//! Records serialize flat (the candidate fields are flattened into the
//! enriched record) so the JSON output reads as one object per article.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The sources articles can be collected from.
///
/// The declaration order is the default priority order of a run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Source {
    Arxiv,
    Ssrn,
    GoogleScholar,
    Jfds,
    BankingFinance,
    Ieee,
    Jmlr,
    Researchgate,
}

impl Source {
    pub const ALL: [Source; 8] = [
        Source::Arxiv,
        Source::Ssrn,
        Source::GoogleScholar,
        Source::Jfds,
        Source::BankingFinance,
        Source::Ieee,
        Source::Jmlr,
        Source::Researchgate,
    ];

    /// Stable lowercase tag, also used as the PDF subdirectory name.
    pub fn tag(&self) -> &'static str {
        match self {
            Source::Arxiv => "arxiv",
            Source::Ssrn => "ssrn",
            Source::GoogleScholar => "google_scholar",
            Source::Jfds => "jfds",
            Source::BankingFinance => "banking_finance",
            Source::Ieee => "ieee",
            Source::Jmlr => "jmlr",
            Source::Researchgate => "researchgate",
        }
    }

    /// Human readable name used in logs and the HTML index.
    pub fn display_name(&self) -> &'static str {
        match self {
            Source::Arxiv => "arXiv",
            Source::Ssrn => "SSRN",
            Source::GoogleScholar => "Google Scholar",
            Source::Jfds => "JFDS",
            Source::BankingFinance => "J Banking Finance",
            Source::Ieee => "IEEE",
            Source::Jmlr => "JMLR",
            Source::Researchgate => "ResearchGate",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One unprocessed listing entry discovered from a source.
///
/// Fields a source cannot provide are left empty rather than guessed.
/// Construct through [`CandidateRecord::new`], which refuses blank titles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub source: Source,
    /// Identifier assigned by the source (arXiv id, SSRN abstract id).
    pub external_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub summary: String,
    pub published: Option<NaiveDate>,
    #[serde(default)]
    pub source_url: String,
    pub pdf_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_access: Option<bool>,
}

impl CandidateRecord {
    /// Create a record with only a source and a title.
    ///
    /// Returns `None` when the title is empty after trimming.
    pub fn new(source: Source, title: &str) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            source,
            external_id: None,
            title: title.to_string(),
            authors: Vec::new(),
            summary: String::new(),
            published: None,
            source_url: String::new(),
            pdf_url: None,
            open_access: None,
        })
    }
}

/// A kept record with everything attached to it after collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub candidate: CandidateRecord,
    /// Where the PDF was stored, if it was downloaded.
    pub pdf_path: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl EnrichedRecord {
    pub fn title(&self) -> &str {
        &self.candidate.title
    }

    pub fn source(&self) -> Source {
        self.candidate.source
    }
}

impl From<CandidateRecord> for EnrichedRecord {
    fn from(candidate: CandidateRecord) -> Self {
        Self {
            candidate,
            pdf_path: None,
            abstract_text: None,
            keywords: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_rejects_blank_title() {
        assert!(CandidateRecord::new(Source::Ssrn, "   ").is_none());
        assert!(CandidateRecord::new(Source::Ssrn, "").is_none());
    }

    #[test]
    fn test_candidate_trims_title() {
        let record = CandidateRecord::new(Source::Jmlr, "  Deep Hedging \n").unwrap();
        assert_eq!(record.title, "Deep Hedging");
        assert!(record.authors.is_empty());
        assert!(record.pdf_url.is_none());
    }

    #[test]
    fn test_source_tags_are_snake_case() {
        assert_eq!(Source::GoogleScholar.tag(), "google_scholar");
        assert_eq!(Source::BankingFinance.tag(), "banking_finance");
        let json = serde_json::to_string(&Source::GoogleScholar).unwrap();
        assert_eq!(json, "\"google_scholar\"");
    }

    #[test]
    fn test_source_display_name() {
        assert_eq!(Source::Arxiv.to_string(), "arXiv");
        assert_eq!(Source::BankingFinance.to_string(), "J Banking Finance");
    }

    #[test]
    fn test_enriched_record_serializes_flat() {
        let mut candidate = CandidateRecord::new(Source::Arxiv, "Deep Hedging").unwrap();
        candidate.external_id = Some("1802.03042v1".to_string());
        candidate.published = NaiveDate::from_ymd_opt(2018, 2, 8);
        let mut record = EnrichedRecord::from(candidate);
        record.abstract_text = Some("We present a framework".to_string());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["title"], "Deep Hedging");
        assert_eq!(json["source"], "arxiv");
        assert_eq!(json["published"], "2018-02-08");
        assert_eq!(json["abstract"], "We present a framework");
        assert!(json.get("open_access").is_none());
    }

    #[test]
    fn test_enriched_record_deserializes_without_extraction_fields() {
        let json = r#"{
            "source": "ssrn",
            "external_id": "123",
            "title": "Credit Risk with Trees",
            "authors": [],
            "summary": "",
            "published": null,
            "source_url": "https://papers.ssrn.com/x",
            "pdf_url": null,
            "pdf_path": null
        }"#;
        let record: EnrichedRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.source(), Source::Ssrn);
        assert_eq!(record.title(), "Credit Risk with Trees");
        assert!(record.abstract_text.is_none());
        assert!(record.keywords.is_empty());
    }
}
