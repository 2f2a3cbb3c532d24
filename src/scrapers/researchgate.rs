//! ResearchGate publication search.

use super::html::{ListingSite, innermost, site_root, item_link, item_title, selector, with_query};
use crate::models::{CandidateRecord, Source};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.researchgate.net/search/publication";

static ITEM: Lazy<Selector> = Lazy::new(|| {
    selector(
        r#"div[class*="publication"], div[class*="research-item"], div[class*="nova"],
           article[class*="publication"], article[class*="research-item"], article[class*="nova"],
           li[class*="publication"], li[class*="research-item"], li[class*="nova"]"#,
    )
});
static TITLE: Lazy<Selector> = Lazy::new(|| {
    selector(
        r#"h3[class*="title"], h3[class*="publication"], h4[class*="title"], h4[class*="publication"],
           a[class*="title"], a[class*="publication"]"#,
    )
});

const MIN_TITLE_CHARS: usize = 10;

pub struct ResearchGate {
    base: Url,
}

impl ResearchGate {
    pub fn with_base_url(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(base_url)?,
        })
    }
}

impl Default for ResearchGate {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL).expect("valid ResearchGate base URL")
    }
}

impl ListingSite for ResearchGate {
    fn source(&self) -> Source {
        Source::Researchgate
    }

    fn page_urls(&self, keyword: &str, _ceiling: usize, _max_pages: u32) -> Vec<Url> {
        vec![with_query(&self.base, &[("q", keyword.to_string())])]
    }

    fn parse_listing(&self, html: &str) -> Vec<CandidateRecord> {
        let document = Html::parse_document(html);
        let root = site_root(&self.base);
        innermost(&document, &ITEM)
            .into_iter()
            .filter_map(|item| {
                let title = item_title(item, &TITLE, MIN_TITLE_CHARS)?;
                let mut record = CandidateRecord::new(Source::Researchgate, &title)?;
                record.source_url = item_link(item, &root);
                Some(record)
            })
            .collect()
    }
}
