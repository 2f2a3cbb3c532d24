//! Journal of Banking and Finance search on ScienceDirect.
//!
//! By default the search is restricted to open access articles. Each record
//! carries whether the listing marked it as open access.

use super::html::{ListingSite, innermost, site_root, item_link, item_title, mentions_open_access, selector, with_query};
use crate::models::{CandidateRecord, Source};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.sciencedirect.com/search";
const JOURNAL: &str = "Journal of Banking and Finance";

static RESULT: Lazy<Selector> = Lazy::new(|| {
    selector(
        r#"div[class*="result"], li[class*="result"], div[class*="ResultItem"], li[class*="ResultItem"]"#,
    )
});
static TITLE: Lazy<Selector> =
    Lazy::new(|| selector(r#"h2[class*="title"], h3[class*="title"], a[class*="title"]"#));

const MIN_TITLE_CHARS: usize = 15;

pub struct BankingFinance {
    base: Url,
    open_access_only: bool,
}

impl BankingFinance {
    pub fn new(open_access_only: bool) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, open_access_only).expect("valid ScienceDirect base URL")
    }

    pub fn with_base_url(base_url: &str, open_access_only: bool) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(base_url)?,
            open_access_only,
        })
    }
}

impl ListingSite for BankingFinance {
    fn source(&self) -> Source {
        Source::BankingFinance
    }

    fn page_urls(&self, keyword: &str, _ceiling: usize, _max_pages: u32) -> Vec<Url> {
        let mut pairs = vec![
            ("qs", keyword.to_string()),
            ("show", "100".to_string()),
            ("sortBy", "date".to_string()),
            ("pub", JOURNAL.to_string()),
        ];
        if self.open_access_only {
            pairs.push(("accessTypes", "openaccess".to_string()));
        }
        vec![with_query(&self.base, &pairs)]
    }

    fn parse_listing(&self, html: &str) -> Vec<CandidateRecord> {
        let document = Html::parse_document(html);
        let root = site_root(&self.base);
        innermost(&document, &RESULT)
            .into_iter()
            .filter_map(|result| {
                let title = item_title(result, &TITLE, MIN_TITLE_CHARS)?;
                let mut record = CandidateRecord::new(Source::BankingFinance, &title)?;
                record.source_url = item_link(result, &root);
                record.open_access = Some(mentions_open_access(result));
                Some(record)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <ol class="search-result-wrapper">
          <li class="ResultItem col-xs-24 push-m">
            <h2><a class="result-list-title-link" href="/science/article/pii/S0378426621000011">Machine learning and the cross-section of bank returns</a></h2>
            <span class="access-label">Open access</span>
          </li>
          <li class="ResultItem col-xs-24 push-m">
            <h2><a class="result-list-title-link" href="/science/article/pii/S0378426621000022">Credit default swaps and sovereign risk</a></h2>
          </li>
          <li class="ResultItem"><a href="/x">Too short</a></li>
        </ol>"#;

    #[test]
    fn test_parse_listing_detects_open_access() {
        let records = BankingFinance::new(true).parse_listing(LISTING);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Machine learning and the cross-section of bank returns");
        assert_eq!(
            records[0].source_url,
            "https://www.sciencedirect.com/science/article/pii/S0378426621000011"
        );
        assert_eq!(records[0].open_access, Some(true));
        assert_eq!(records[1].open_access, Some(false));
    }

    #[test]
    fn test_open_access_toggle_changes_query() {
        let open = BankingFinance::new(true).page_urls("machine learning", 100, 5);
        let all = BankingFinance::new(false).page_urls("machine learning", 100, 5);
        assert!(open[0].as_str().contains("accessTypes=openaccess"));
        assert!(!all[0].as_str().contains("accessTypes"));
        assert!(all[0].as_str().contains("pub=Journal+of+Banking+and+Finance"));
    }
}
