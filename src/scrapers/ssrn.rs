//! SSRN search results.
//!
//! Result items are the anchors pointing at an abstract page. The PDF
//! delivery URL is derived from the abstract id, but SSRN requires a login to
//! serve it, so the link is recorded and never downloaded.

use super::html::{ListingSite, element_text, resolve, selector, with_query};
use crate::models::{CandidateRecord, Source};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://papers.ssrn.com/sol3/results.cfm";

static ABSTRACT_LINK: Lazy<Selector> = Lazy::new(|| selector(r#"a[href*="abstract_id="]"#));
static ABSTRACT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"abstract_id=(\d+)").expect("valid abstract id regex"));

const MIN_TITLE_CHARS: usize = 10;

pub struct Ssrn {
    base: Url,
}

impl Ssrn {
    pub fn with_base_url(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(base_url)?,
        })
    }
}

impl Default for Ssrn {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL).expect("valid SSRN base URL")
    }
}

/// Delivery URL SSRN uses for the PDF of an abstract.
pub fn delivery_url(abstract_id: &str) -> String {
    format!("https://papers.ssrn.com/sol3/Delivery.cfm/SSRN_ID{abstract_id}_code.pdf")
}

impl ListingSite for Ssrn {
    fn source(&self) -> Source {
        Source::Ssrn
    }

    fn downloads_pdfs(&self) -> bool {
        false
    }

    fn page_urls(&self, keyword: &str, _ceiling: usize, max_pages: u32) -> Vec<Url> {
        (1..=max_pages)
            .map(|page| {
                with_query(&self.base, &[("npage", page.to_string()), ("query", keyword.to_string())])
            })
            .collect()
    }

    fn parse_listing(&self, html: &str) -> Vec<CandidateRecord> {
        let document = Html::parse_document(html);
        document
            .select(&ABSTRACT_LINK)
            .filter_map(|anchor| {
                let title = element_text(anchor);
                if title.chars().count() < MIN_TITLE_CHARS {
                    return None;
                }
                let mut record = CandidateRecord::new(Source::Ssrn, &title)?;
                let url = anchor
                    .value()
                    .attr("href")
                    .and_then(|href| resolve(&self.base, href))
                    .unwrap_or_default();
                record.external_id = ABSTRACT_ID_RE
                    .captures(&url)
                    .map(|caps| caps[1].to_string());
                record.pdf_url = record.external_id.as_deref().map(delivery_url);
                record.source_url = url;
                Some(record)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <div class="result-item">
            <a href="https://papers.ssrn.com/sol3/papers.cfm?abstract_id=3355410">Machine Learning in Asset Pricing</a>
          </div>
          <div class="result-item">
            <a href="papers.cfm?abstract_id=4123456">Credit Risk Modeling with Gradient Boosting</a>
          </div>
          <a href="papers.cfm?abstract_id=999">Short</a>
          <a href="/en/index.cfm">SSRN home page navigation link</a>
        </body></html>"#;

    #[test]
    fn test_parse_listing_extracts_abstracts() {
        let records = Ssrn::default().parse_listing(LISTING);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].title, "Machine Learning in Asset Pricing");
        assert_eq!(records[0].external_id.as_deref(), Some("3355410"));
        assert_eq!(
            records[0].pdf_url.as_deref(),
            Some("https://papers.ssrn.com/sol3/Delivery.cfm/SSRN_ID3355410_code.pdf")
        );

        assert_eq!(
            records[1].source_url,
            "https://papers.ssrn.com/sol3/papers.cfm?abstract_id=4123456"
        );
        assert_eq!(records[1].external_id.as_deref(), Some("4123456"));
    }

    #[test]
    fn test_page_urls_paginate() {
        let urls = Ssrn::default().page_urls("fintech", 50, 3);
        assert_eq!(urls.len(), 3);
        assert_eq!(
            urls[2].as_str(),
            "https://papers.ssrn.com/sol3/results.cfm?npage=3&query=fintech"
        );
    }

    #[test]
    fn test_pdfs_are_not_downloaded() {
        assert!(!Ssrn::default().downloads_pdfs());
    }
}
