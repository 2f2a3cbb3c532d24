//! arXiv Atom API adapter.
//!
//! Queries `export.arxiv.org` with every keyword term required and the
//! results restricted to finance, statistics/ML, CS learning/AI and
//! economics categories. The feed is decoded with `quick-xml`'s serde
//! support.

use super::SourceAdapter;
use crate::error::FetchError;
use crate::models::{CandidateRecord, Source};
use crate::utils::{collapse_whitespace, truncate_chars};
use async_trait::async_trait;
use chrono::NaiveDate;
use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "http://export.arxiv.org/api/query";

const CATEGORY_FILTER: &str =
    "(cat:q-fin.* OR cat:stat.ML OR cat:cs.LG OR cat:cs.AI OR cat:econ.*)";
const SUMMARY_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    published: String,
    #[serde(rename = "author", default)]
    authors: Vec<AtomAuthor>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@title")]
    title: Option<String>,
}

/// Build the `search_query` expression for a keyword.
///
/// The connective ` and ` is dropped and every remaining term is required:
/// `"machine learning and finance"` becomes
/// `(all:machine AND all:learning AND all:finance) AND (cat:q-fin.* OR ...)`.
pub fn build_search_query(keyword: &str) -> String {
    let normalized = keyword.replace(" and ", " ");
    let terms: Vec<&str> = normalized.split_whitespace().collect();
    let expression = if terms.len() > 1 {
        terms
            .iter()
            .map(|term| format!("all:{term}"))
            .collect::<Vec<_>>()
            .join(" AND ")
    } else {
        format!("all:{keyword}")
    };
    format!("({expression}) AND {CATEGORY_FILTER}")
}

/// Decode an Atom feed into candidate records.
pub fn parse_feed(xml: &str) -> Result<Vec<CandidateRecord>, FetchError> {
    let feed: AtomFeed = from_str(xml).map_err(|e| FetchError::Malformed {
        origin: Source::Arxiv.display_name().to_string(),
        reason: format!("invalid atom xml: {e}"),
    })?;
    Ok(feed.entries.into_iter().filter_map(parse_entry).collect())
}

fn parse_entry(entry: AtomEntry) -> Option<CandidateRecord> {
    let mut record = CandidateRecord::new(Source::Arxiv, &collapse_whitespace(&entry.title))?;
    let id = entry.id.trim();
    record.external_id = id
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string);
    record.authors = entry
        .authors
        .into_iter()
        .map(|author| collapse_whitespace(&author.name))
        .filter(|name| !name.is_empty())
        .collect();
    record.summary = truncate_chars(entry.summary.trim(), SUMMARY_LIMIT);
    record.published = entry
        .published
        .trim()
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok());
    record.source_url = id.to_string();
    record.pdf_url = entry
        .links
        .into_iter()
        .find(|link| link.title.as_deref() == Some("pdf"))
        .and_then(|link| link.href);
    Some(record)
}

/// Adapter for the arXiv query API.
pub struct ArxivAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl ArxivAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn query(&self, keyword: &str, ceiling: usize) -> Result<Vec<CandidateRecord>, FetchError> {
        let search_query = build_search_query(keyword);
        debug!(%search_query, "Querying arXiv");
        let max_results = ceiling.saturating_mul(2).to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("search_query", search_query.as_str()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
            ])
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        parse_feed(&body)
    }
}

#[async_trait]
impl SourceAdapter for ArxivAdapter {
    fn source(&self) -> Source {
        Source::Arxiv
    }

    #[instrument(level = "info", skip(self), fields(source = "arXiv"))]
    async fn fetch(&self, keyword: &str, ceiling: usize) -> Vec<CandidateRecord> {
        match self.query(keyword, ceiling).await {
            Ok(records) => {
                info!(count = records.len(), "Collected candidates");
                records
            }
            Err(e) => {
                warn!(error = %e, "arXiv query failed");
                Vec::new()
            }
        }
    }
}
