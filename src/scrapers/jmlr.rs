//! Journal of Machine Learning Research paper index.
//!
//! The index is a `<dl>`: each `<dt>` holds the title link and the `<dd>`
//! that follows holds the authors and the `[pdf]` link. The page does not
//! depend on the keyword.

use super::html::{ListingSite, element_text, first, resolve, selector};
use crate::models::{CandidateRecord, Source};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.jmlr.org/papers/";

static ENTRY: Lazy<Selector> = Lazy::new(|| selector("dt"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static PDF_HREF: Lazy<Selector> = Lazy::new(|| selector(r#"a[href*=".pdf"]"#));

pub struct Jmlr {
    base: Url,
}

impl Jmlr {
    pub fn with_base_url(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(base_url)?,
        })
    }

    fn pdf_link(&self, details: ElementRef<'_>) -> Option<String> {
        let anchor = details
            .select(&ANCHOR)
            .find(|anchor| element_text(*anchor).to_lowercase().contains("pdf"))
            .or_else(|| first(details, &PDF_HREF))?;
        resolve(&self.base, anchor.value().attr("href")?)
    }
}

impl Default for Jmlr {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL).expect("valid JMLR base URL")
    }
}

/// The `<dd>` following a `<dt>`.
fn details_of(entry: ElementRef<'_>) -> Option<ElementRef<'_>> {
    entry
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "dd")
}

impl ListingSite for Jmlr {
    fn source(&self) -> Source {
        Source::Jmlr
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
            .select(&ENTRY)
            .filter_map(|entry| {
                let anchor = first(entry, &ANCHOR)?;
                let mut record = CandidateRecord::new(Source::Jmlr, &element_text(anchor))?;
                record.source_url = anchor
                    .value()
                    .attr("href")
                    .and_then(|href| resolve(&self.base, href))
                    .unwrap_or_default();
                record.pdf_url = details_of(entry).and_then(|details| self.pdf_link(details));
                Some(record)
            })
            .collect()
    }
}
