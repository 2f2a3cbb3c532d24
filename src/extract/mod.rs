//! Abstract and keyword extraction from document text.
//!
//! Extraction is a list of declarative rules tried in order, most specific
//! first. The functions here do no I/O; [`enrich_collection`] pairs them with
//! a [`DocumentReader`] to fill in records that have a downloaded PDF.
//!
//! The `regex` crate has no lookaround, so every stop marker is consumed by
//! the match and only capture group 1 is used.

pub mod reader;

pub use reader::{DocumentReader, LopdfReader};

use crate::models::EnrichedRecord;
use crate::utils::{collapse_whitespace, truncate_chars, truncate_for_log};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, instrument};

const MAX_ABSTRACT_CHARS: usize = 3000;
const MAX_KEYWORDS: usize = 15;
const MIN_KEYWORD_CHARS: usize = 3;
const MAX_KEYWORD_CHARS: usize = 99;

/// One way of locating an abstract in document text.
pub struct AbstractRule {
    pub name: &'static str,
    pub pattern: Regex,
    /// Shortest accepted abstract, after whitespace collapse.
    pub min_len: usize,
}

/// One way of locating a keyword line in document text.
pub struct KeywordRule {
    pub name: &'static str,
    pub pattern: Regex,
}

fn rule(name: &'static str, pattern: &str) -> AbstractRule {
    AbstractRule {
        name,
        pattern: Regex::new(pattern).expect("valid abstract rule regex"),
        min_len: 51,
    }
}

pub static ABSTRACT_RULES: Lazy<Vec<AbstractRule>> = Lazy::new(|| {
    vec![
        rule(
            "header-anchored",
            r"(?s)(?:^|\n)\s*Abstract[:\s]*\n?(.*?)\n\s*(?:1\.?\s*Introduction|Keywords|Index Terms|I\.\s+Introduction|1\s+Introduction|\n\s*\d+\.\s+)",
        ),
        rule(
            "header-anchored-ci",
            r"(?si)(?:^|\n)\s*Abstract[:\s]*\n?(.*?)\n\s*(?:1\.?\s*Introduction|Keywords|Index Terms|I\.\s+Introduction|INTRODUCTION|\n\s*\d+\.\s+)",
        ),
        rule(
            "bounded-fallback",
            r"(?si)(?:^|\n)\s*Abstract[:\s]*\n?(.{100,2000}?)\n\s*\n",
        ),
    ]
});

pub static KEYWORD_RULES: Lazy<Vec<KeywordRule>> = Lazy::new(|| {
    vec![
        KeywordRule {
            name: "inline",
            pattern: Regex::new(r"(?i)(?:Keywords|Key words|Key-words|Index Terms)[:\s—–-]*([^\n]+)")
                .expect("valid inline keyword regex"),
        },
        KeywordRule {
            name: "next-line",
            pattern: Regex::new(r"(?i)(?:Keywords|Key words)[:\s]*\n([^\n]+)")
                .expect("valid next-line keyword regex"),
        },
    ]
});

static KEYWORD_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;•·]").expect("valid keyword separator regex"));

/// Find the abstract in `text`.
///
/// The first rule whose capture is long enough wins; the result is at most
/// 3000 characters. Returns `None` when no rule qualifies.
pub fn extract_abstract(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    ABSTRACT_RULES.iter().find_map(|rule| {
        let captured = rule.pattern.captures(text)?.get(1)?.as_str();
        let cleaned = collapse_whitespace(captured);
        if cleaned.chars().count() < rule.min_len {
            return None;
        }
        debug!(rule = rule.name, len = cleaned.len(), "Abstract located");
        Some(truncate_chars(&cleaned, MAX_ABSTRACT_CHARS))
    })
}

/// Find the keyword list in `text`.
///
/// Only the first matching rule is used. Pieces are trimmed, stripped of
/// periods and kept when 3 to 99 characters long; at most 15 are returned.
pub fn extract_keywords(text: &str) -> Vec<String> {
    for rule in KEYWORD_RULES.iter() {
        let Some(line) = rule.pattern.captures(text).and_then(|caps| caps.get(1)) else {
            continue;
        };
        let keywords: Vec<String> = KEYWORD_SEPARATOR_RE
            .split(line.as_str())
            .map(|piece| piece.trim().trim_matches('.').trim().to_string())
            .filter(|piece| (MIN_KEYWORD_CHARS..=MAX_KEYWORD_CHARS).contains(&piece.chars().count()))
            .take(MAX_KEYWORDS)
            .collect();
        if !keywords.is_empty() {
            debug!(rule = rule.name, count = keywords.len(), "Keywords located");
            return keywords;
        }
    }
    Vec::new()
}

/// Counters for one enrichment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    /// Records whose PDF exists on disk.
    pub processed: usize,
    pub abstracts_found: usize,
    pub keywords_found: usize,
}

impl ExtractionStats {
    fn rate(found: usize, processed: usize) -> f64 {
        100.0 * found as f64 / processed.max(1) as f64
    }

    pub fn abstract_rate(&self) -> f64 {
        Self::rate(self.abstracts_found, self.processed)
    }

    pub fn keyword_rate(&self) -> f64 {
        Self::rate(self.keywords_found, self.processed)
    }
}

/// Fill in abstract and keywords for every record with a PDF on disk.
///
/// Records without a PDF are left untouched. A record whose PDF cannot be
/// read is still counted as processed and ends up with no abstract and no
/// keywords.
#[instrument(level = "info", skip_all, fields(records = records.len(), max_pages = max_pages))]
pub fn enrich_collection(
    records: &mut [EnrichedRecord],
    reader: &dyn DocumentReader,
    max_pages: usize,
) -> ExtractionStats {
    let mut stats = ExtractionStats::default();

    for record in records.iter_mut() {
        let Some(path) = record.pdf_path.as_deref().map(Path::new) else {
            continue;
        };
        if !path.exists() {
            debug!(path = %path.display(), "PDF missing on disk; skipping");
            continue;
        }
        debug!(title = %truncate_for_log(record.title(), 60), "Extracting");

        let text = reader.read_text(path, max_pages);
        record.abstract_text = text.as_deref().and_then(extract_abstract);
        record.keywords = text.as_deref().map(extract_keywords).unwrap_or_default();

        stats.processed += 1;
        if record.abstract_text.is_some() {
            stats.abstracts_found += 1;
        }
        if !record.keywords.is_empty() {
            stats.keywords_found += 1;
        }
    }

    info!(
        processed = stats.processed,
        abstracts = stats.abstracts_found,
        keywords = stats.keywords_found,
        abstract_pct = stats.abstract_rate(),
        keyword_pct = stats.keyword_rate(),
        "Extraction finished"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateRecord, Source};
    use std::collections::HashMap;
    use std::path::PathBuf;

    const BODY: &str = "We study the prediction of equity returns with recurrent neural networks \
                        trained on limit order book data and show robust out-of-sample gains.";

    #[test]
    fn test_abstract_before_introduction() {
        let text = format!("Some Title\nAuthors\nAbstract\n{BODY}\n1. Introduction\nMarkets are...");
        assert_eq!(extract_abstract(&text).as_deref(), Some(BODY));
    }

    #[test]
    fn test_abstract_uppercase_heading() {
        let text = format!("TITLE\nABSTRACT\n{BODY}\nINTRODUCTION\nMarkets are...");
        assert_eq!(extract_abstract(&text).as_deref(), Some(BODY));
    }

    #[test]
    fn test_abstract_before_blank_line_and_introduction_without_keywords() {
        let sentence = "This paper studies market risk in equity portfolios using gradient boosted trees.";
        let text = format!("Abstract\n{sentence}\n\n1 Introduction\nVolatility clusters...");
        assert_eq!(extract_abstract(&text).as_deref(), Some(sentence));
        assert!(extract_keywords(&text).is_empty());
    }

    #[test]
    fn test_abstract_stops_at_keywords() {
        let text = format!("Abstract: {BODY}\nKeywords: deep learning, finance\n");
        assert_eq!(extract_abstract(&text).as_deref(), Some(BODY));
    }

    #[test]
    fn test_abstract_collapses_line_breaks() {
        let text = "Abstract\nWe study the prediction of equity returns\n   with recurrent neural networks on\norder book data.\n1 Introduction\n";
        assert_eq!(
            extract_abstract(text).as_deref(),
            Some("We study the prediction of equity returns with recurrent neural networks on order book data.")
        );
    }

    #[test]
    fn test_short_abstract_is_rejected() {
        let text = "Abstract\nToo short to count.\n1. Introduction\n";
        assert_eq!(extract_abstract(text), None);
    }

    #[test]
    fn test_fallback_stops_at_blank_line() {
        let paragraph = "x".repeat(150);
        let text = format!("abstract\n{paragraph}\n\nRest of the paper without numbered headings");
        assert_eq!(extract_abstract(&text), Some(paragraph));
    }

    #[test]
    fn test_no_heading_yields_none() {
        assert_eq!(extract_abstract(""), None);
        assert_eq!(extract_abstract(&format!("{BODY}\n\n{BODY}")), None);
    }

    #[test]
    fn test_abstract_is_capped() {
        let long = "word ".repeat(1000);
        let text = format!("Abstract\n{long}\n1. Introduction\n");
        let found = extract_abstract(&text).unwrap();
        assert_eq!(found.chars().count(), 3000);
    }

    #[test]
    fn test_keywords_inline() {
        let text = "Keywords: machine learning; finance; NLP.\nIntroduction";
        assert_eq!(extract_keywords(text), vec!["machine learning", "finance", "NLP"]);
    }

    #[test]
    fn test_keywords_index_terms_with_dash_and_bullets() {
        let text = "Index Terms—Portfolio optimization • reinforcement learning · AI\n";
        assert_eq!(
            extract_keywords(text),
            vec!["Portfolio optimization", "reinforcement learning"]
        );
    }

    #[test]
    fn test_keywords_filters_and_caps() {
        let many: Vec<String> = (0..20).map(|i| format!("term{i:02}")).collect();
        let text = format!("KEY WORDS: {}, x, {}\n", many.join(", "), "y".repeat(120));
        let keywords = extract_keywords(&text);
        assert_eq!(keywords.len(), 15);
        assert_eq!(keywords[0], "term00");
        assert!(keywords.iter().all(|k| (3..=99).contains(&k.chars().count())));
    }

    #[test]
    fn test_keywords_absent() {
        assert!(extract_keywords("No keyword line in this text").is_empty());
        assert!(extract_keywords("Keywords: a, b\n").is_empty());
    }

    struct FakeReader(HashMap<PathBuf, Option<String>>);

    impl DocumentReader for FakeReader {
        fn read_text(&self, path: &Path, _max_pages: usize) -> Option<String> {
            self.0.get(path).cloned().flatten()
        }
    }

    fn record_with_pdf(title: &str, pdf: Option<&Path>) -> EnrichedRecord {
        let mut record: EnrichedRecord = CandidateRecord::new(Source::Arxiv, title).unwrap().into();
        record.pdf_path = pdf.map(|p| p.display().to_string());
        record
    }

    #[test]
    fn test_enrich_collection_counts() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.pdf");
        let broken = dir.path().join("broken.pdf");
        std::fs::write(&good, b"pdf").unwrap();
        std::fs::write(&broken, b"pdf").unwrap();

        let reader = FakeReader(HashMap::from([
            (
                good.clone(),
                Some(format!("Abstract\n{BODY}\nKeywords: trading, deep learning\n")),
            ),
            (broken.clone(), None),
        ]));

        let mut records = vec![
            record_with_pdf("With text", Some(&good)),
            record_with_pdf("Unreadable", Some(&broken)),
            record_with_pdf("Vanished", Some(&dir.path().join("gone.pdf"))),
            record_with_pdf("No PDF", None),
        ];
        records[1].keywords = vec!["stale".to_string()];

        let stats = enrich_collection(&mut records, &reader, 3);
        assert_eq!(
            stats,
            ExtractionStats {
                processed: 2,
                abstracts_found: 1,
                keywords_found: 1,
            }
        );
        assert_eq!(records[0].abstract_text.as_deref(), Some(BODY));
        assert_eq!(records[0].keywords, vec!["trading", "deep learning"]);
        assert!(records[1].abstract_text.is_none());
        assert!(records[1].keywords.is_empty());
        assert!(records[3].abstract_text.is_none());
    }

    #[test]
    fn test_rates_guard_against_zero() {
        let stats = ExtractionStats::default();
        assert_eq!(stats.abstract_rate(), 0.0);
    }
}
