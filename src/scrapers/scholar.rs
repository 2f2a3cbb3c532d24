//! Google Scholar search results, ten per page.

use super::html::{ListingSite, element_text, first, resolve, selector, with_query};
use crate::models::{CandidateRecord, Source};
use crate::utils::truncate_chars;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://scholar.google.com/scholar";

static RESULT: Lazy<Selector> = Lazy::new(|| selector("div.gs_ri"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("h3.gs_rt"));
static TITLE_LINK: Lazy<Selector> = Lazy::new(|| selector("h3.gs_rt a[href]"));
static SNIPPET: Lazy<Selector> = Lazy::new(|| selector("div.gs_rs"));
static AUTHORS: Lazy<Selector> = Lazy::new(|| selector("div.gs_a"));
static PDF_LINK: Lazy<Selector> = Lazy::new(|| selector(r#"a[href$=".pdf"]"#));

const PAGE_SIZE: usize = 10;
const SNIPPET_LIMIT: usize = 300;

pub struct GoogleScholar {
    base: Url,
}

impl GoogleScholar {
    pub fn with_base_url(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(base_url)?,
        })
    }
}

impl Default for GoogleScholar {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL).expect("valid Google Scholar base URL")
    }
}

impl ListingSite for GoogleScholar {
    fn source(&self) -> Source {
        Source::GoogleScholar
    }

    fn page_urls(&self, keyword: &str, ceiling: usize, _max_pages: u32) -> Vec<Url> {
        (0..ceiling)
            .step_by(PAGE_SIZE)
            .map(|start| {
                with_query(
                    &self.base,
                    &[
                        ("q", keyword.to_string()),
                        ("hl", "en".to_string()),
                        ("start", start.to_string()),
                        ("as_sdt", "0,5".to_string()),
                    ],
                )
            })
            .collect()
    }

    fn parse_listing(&self, html: &str) -> Vec<CandidateRecord> {
        let document = Html::parse_document(html);
        document
            .select(&RESULT)
            .filter_map(|result| {
                let mut record =
                    CandidateRecord::new(Source::GoogleScholar, &element_text(first(result, &TITLE)?))?;
                record.summary = first(result, &SNIPPET)
                    .map(|snippet| truncate_chars(&element_text(snippet), SNIPPET_LIMIT))
                    .unwrap_or_default();
                record.source_url = first(result, &TITLE_LINK)
                    .and_then(|link| link.value().attr("href"))
                    .and_then(|href| resolve(&self.base, href))
                    .unwrap_or_default();
                // The byline mixes authors, venue and year; it is kept as one entry.
                record.authors = first(result, &AUTHORS)
                    .map(element_text)
                    .filter(|line| !line.is_empty())
                    .into_iter()
                    .collect();
                record.pdf_url = first(result, &PDF_LINK)
                    .and_then(|link| link.value().attr("href"))
                    .map(str::trim)
                    .filter(|href| href.starts_with("http://") || href.starts_with("https://"))
                    .map(str::to_string);
                Some(record)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <div id="gs_res_ccl_mid">
          <div class="gs_r gs_or gs_scl">
            <div class="gs_ri">
              <h3 class="gs_rt"><a href="https://www.example.org/paper1">Deep learning for <b>stock</b> prediction</a></h3>
              <div class="gs_a">J Smith, A Doe - Journal of Finance, 2021 - example.org</div>
              <div class="gs_rs">We forecast daily returns using recurrent networks.</div>
              <a href="https://www.example.org/paper1.pdf">[PDF] example.org</a>
            </div>
          </div>
          <div class="gs_r gs_or gs_scl">
            <div class="gs_ri">
              <h3 class="gs_rt">[CITATION] Portfolio selection with transformers</h3>
              <a href="/files/local.pdf">[PDF]</a>
            </div>
          </div>
          <div class="gs_ri"><div class="gs_rs">No heading at all</div></div>
        </div>"#;

    #[test]
    fn test_parse_listing_reads_result_blocks() {
        let records = GoogleScholar::default().parse_listing(LISTING);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.title, "Deep learning for stock prediction");
        assert_eq!(first.source_url, "https://www.example.org/paper1");
        assert_eq!(first.summary, "We forecast daily returns using recurrent networks.");
        assert_eq!(first.authors, vec!["J Smith, A Doe - Journal of Finance, 2021 - example.org"]);
        assert_eq!(first.pdf_url.as_deref(), Some("https://www.example.org/paper1.pdf"));

        let second = &records[1];
        assert!(second.authors.is_empty());
        assert!(second.pdf_url.is_none(), "relative PDF links are not kept");
    }

    #[test]
    fn test_page_urls_step_by_ten_below_ceiling() {
        let urls = GoogleScholar::default().page_urls("agentic ai", 30, 5);
        let starts: Vec<String> = urls
            .iter()
            .filter_map(|u| u.query_pairs().find(|(k, _)| k == "start").map(|(_, v)| v.into_owned()))
            .collect();
        assert_eq!(starts, vec!["0", "10", "20"]);
        assert!(urls[0].as_str().contains("as_sdt=0%2C5"));
    }
}
