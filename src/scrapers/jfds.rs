//! Journal of Financial Data Science table of contents.
//!
//! The journal only publishes finance work, so its records skip the
//! relevance filter. The listing is the same whatever the keyword.

use super::html::{ListingSite, first, element_text, item_link, selector};
use crate::models::{CandidateRecord, Source};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.pm-research.com/content/iijjfds";

static ARTICLE: Lazy<Selector> =
    Lazy::new(|| selector("div.article, div.toc-item, div.highwire-cite"));
static TITLE: Lazy<Selector> = Lazy::new(|| {
    selector(
        r#"h3[class*="title"], h3[class*="cite"], h4[class*="title"], h4[class*="cite"],
           a[class*="title"], a[class*="cite"], span[class*="title"], span[class*="cite"]"#,
    )
});

const MIN_TITLE_CHARS: usize = 10;

pub struct Jfds {
    base: Url,
}

impl Jfds {
    pub fn with_base_url(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(base_url)?,
        })
    }
}

impl Default for Jfds {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL).expect("valid JFDS base URL")
    }
}

impl ListingSite for Jfds {
    fn source(&self) -> Source {
        Source::Jfds
    }

    fn requires_relevance_filter(&self) -> bool {
        false
    }

    fn keyword_independent(&self) -> bool {
        true
    }

    fn page_urls(&self, _keyword: &str, _ceiling: usize, _max_pages: u32) -> Vec<Url> {
        vec![self.base.clone()]
    }

    fn parse_listing(&self, html: &str) -> Vec<CandidateRecord> {
        let document = Html::parse_document(html);
        document
            .select(&ARTICLE)
            .filter_map(|article| {
                let title = element_text(first(article, &TITLE)?);
                if title.chars().count() < MIN_TITLE_CHARS {
                    return None;
                }
                let mut record = CandidateRecord::new(Source::Jfds, &title)?;
                record.source_url = item_link(article, &self.base);
                Some(record)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_reads_toc_items() {
        let html = r#"
            <div class="toc-item">
              <h4 class="toc-item-title"><a href="/content/iijjfds/5/1/10">Factor Investing with Neural Networks</a></h4>
            </div>
            <div class="article">
              <span class="highwire-cite-title">Short</span>
            </div>
            <div class="article">
              <p>No title markup here</p>
            </div>"#;
        let records = Jfds::default().parse_listing(html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Factor Investing with Neural Networks");
        assert_eq!(
            records[0].source_url,
            "https://www.pm-research.com/content/iijjfds/5/1/10"
        );
        assert!(records[0].pdf_url.is_none());
    }

    #[test]
    fn test_single_fixed_page() {
        let site = Jfds::default();
        assert_eq!(site.page_urls("anything", 50, 5).len(), 1);
        assert!(site.keyword_independent());
        assert!(!site.requires_relevance_filter());
    }
}
