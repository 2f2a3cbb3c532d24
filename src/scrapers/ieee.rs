//! IEEE Xplore search results.

use super::html::{ListingSite, innermost, site_root, element_text, item_link, item_title, selector, with_query};
use crate::models::{CandidateRecord, Source};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://ieeexplore.ieee.org/search/searchresult.jsp";

static RESULT: Lazy<Selector> = Lazy::new(|| {
    selector(
        r#"div[class*="result"], div[class*="List-results"],
           xpl-results-item[class*="result"], xpl-results-item[class*="List-results"]"#,
    )
});
static TITLE: Lazy<Selector> = Lazy::new(|| {
    selector(
        r#"h2[class*="title"], h2[class*="result"], h3[class*="title"], h3[class*="result"],
           a[class*="title"], a[class*="result"]"#,
    )
});

const MIN_TITLE_CHARS: usize = 10;

pub struct Ieee {
    base: Url,
}

impl Ieee {
    pub fn with_base_url(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(base_url)?,
        })
    }
}

impl Default for Ieee {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL).expect("valid IEEE base URL")
    }
}

impl ListingSite for Ieee {
    fn source(&self) -> Source {
        Source::Ieee
    }

    fn page_urls(&self, keyword: &str, _ceiling: usize, _max_pages: u32) -> Vec<Url> {
        vec![with_query(
            &self.base,
            &[
                ("queryText", keyword.to_string()),
                ("highlight", "true".to_string()),
                ("returnType", "SEARCH".to_string()),
                ("matchPubs", "true".to_string()),
                ("rowsPerPage", "50".to_string()),
            ],
        )]
    }

    fn parse_listing(&self, html: &str) -> Vec<CandidateRecord> {
        let document = Html::parse_document(html);
        let root = site_root(&self.base);
        innermost(&document, &RESULT)
            .into_iter()
            .filter_map(|result| {
                let title = item_title(result, &TITLE, MIN_TITLE_CHARS)?;
                let mut record = CandidateRecord::new(Source::Ieee, &title)?;
                record.source_url = item_link(result, &root);
                record.open_access =
                    Some(element_text(result).to_lowercase().contains("open access"));
                Some(record)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_reads_result_items() {
        let html = r#"
            <xpl-results-item class="List-results-items">
              <h3 class="text-md-md-lh"><a href="/document/9412345">Reinforcement Learning for Algorithmic Trading</a></h3>
              <span class="icon-access-open-access">Open Access</span>
            </xpl-results-item>
            <xpl-results-item class="List-results-items">
              <h3><a class="fw-bold" href="/document/9400001">Fraud detection in card payments</a></h3>
            </xpl-results-item>"#;
        let records = Ieee::default().parse_listing(html);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Reinforcement Learning for Algorithmic Trading");
        assert_eq!(records[0].source_url, "https://ieeexplore.ieee.org/document/9412345");
        assert_eq!(records[0].open_access, Some(true));
        assert_eq!(records[1].open_access, Some(false));
    }

    #[test]
    fn test_page_url_carries_query_text() {
        let urls = Ieee::default().page_urls("fraud detection", 50, 5);
        assert_eq!(urls.len(), 1);
        assert!(urls[0].as_str().contains("queryText=fraud+detection"));
        assert!(urls[0].as_str().contains("rowsPerPage=50"));
    }
}
