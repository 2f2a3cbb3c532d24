//! Generic HTML search adapter.
//!
//! HTML sources differ only in how their result pages are addressed and how
//! a listing page is cut into items. Those two parts are a [`ListingSite`];
//! [`HtmlSearchAdapter`] does the fetching, pagination, pauses and error
//! absorption for all of them.
//!
//! Listing markup is brittle by nature. A page without the expected
//! structure parses to zero items; it never fails.

use super::SourceAdapter;
use crate::error::FetchError;
use crate::models::{CandidateRecord, Source};
use crate::utils::collapse_whitespace;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// How one HTML source is addressed and parsed.
pub trait ListingSite: Send + Sync {
    fn source(&self) -> Source;

    /// Result page URLs for `keyword`, in fetch order.
    fn page_urls(&self, keyword: &str, ceiling: usize, max_pages: u32) -> Vec<Url>;

    /// Cut one listing page into candidate records.
    fn parse_listing(&self, html: &str) -> Vec<CandidateRecord>;

    fn requires_relevance_filter(&self) -> bool {
        true
    }

    fn keyword_independent(&self) -> bool {
        false
    }

    fn downloads_pdfs(&self) -> bool {
        true
    }
}

/// [`SourceAdapter`] over any [`ListingSite`].
pub struct HtmlSearchAdapter<S> {
    site: S,
    client: reqwest::Client,
    max_pages: u32,
    page_delay: Duration,
}

impl<S: ListingSite> HtmlSearchAdapter<S> {
    pub fn new(site: S, client: reqwest::Client, max_pages: u32, page_delay: Duration) -> Self {
        Self {
            site,
            client,
            max_pages,
            page_delay,
        }
    }

    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl<S: ListingSite + 'static> SourceAdapter for HtmlSearchAdapter<S> {
    fn source(&self) -> Source {
        self.site.source()
    }

    fn requires_relevance_filter(&self) -> bool {
        self.site.requires_relevance_filter()
    }

    fn keyword_independent(&self) -> bool {
        self.site.keyword_independent()
    }

    fn downloads_pdfs(&self) -> bool {
        self.site.downloads_pdfs()
    }

    /// Fetch every result page of `keyword` in order.
    ///
    /// `ceiling` only sizes the page list. Every parsed item is returned;
    /// the caller caps how many are accepted.
    #[instrument(level = "info", skip(self), fields(source = %self.site.source()))]
    async fn fetch(&self, keyword: &str, ceiling: usize) -> Vec<CandidateRecord> {
        let pages = self.site.page_urls(keyword, ceiling, self.max_pages);
        let mut records = Vec::new();

        for (index, url) in pages.iter().enumerate() {
            if index > 0 && !self.page_delay.is_zero() {
                sleep(self.page_delay).await;
            }
            match self.fetch_page(url).await {
                Ok(html) => {
                    let items = self.site.parse_listing(&html);
                    debug!(page = index + 1, %url, count = items.len(), "Parsed listing page");
                    records.extend(items);
                }
                Err(e) => {
                    warn!(page = index + 1, %url, error = %e, "Listing page fetch failed");
                    break;
                }
            }
        }

        info!(count = records.len(), "Collected candidates");
        records
    }
}

static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));

/// Parse a selector that is known at compile time.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e}"))
}

/// Visible text of an element with whitespace collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// First descendant of `scope` matching `selector`.
pub(crate) fn first<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

/// Title of a listing item: the first `title` match, else the first anchor.
///
/// Titles shorter than `min_chars` are treated as navigation noise.
pub(crate) fn item_title(item: ElementRef<'_>, title: &Selector, min_chars: usize) -> Option<String> {
    let element = first(item, title).or_else(|| first(item, &ANCHOR))?;
    let text = element_text(element);
    (text.chars().count() >= min_chars).then_some(text)
}

/// Matches of `selector` that contain no other match.
///
/// Class substring selectors often hit both a card and its body; only the
/// innermost element is kept so each card yields one record.
pub(crate) fn innermost<'a>(document: &'a Html, selector: &Selector) -> Vec<ElementRef<'a>> {
    document
        .select(selector)
        .filter(|item| !item.select(selector).any(|inner| inner.id() != item.id()))
        .collect()
}

/// Scheme and host of `url` with an empty path.
pub(crate) fn site_root(url: &Url) -> Url {
    let mut root = url.clone();
    root.set_path("/");
    root.set_query(None);
    root.set_fragment(None);
    root
}

/// The first link of an item resolved against `base`, or empty.
pub(crate) fn item_link(item: ElementRef<'_>, base: &Url) -> String {
    first(item, &LINK)
        .and_then(|anchor| anchor.value().attr("href"))
        .and_then(|href| resolve(base, href))
        .unwrap_or_default()
}

/// Resolve `href` against `base`, keeping only http(s) results.
pub(crate) fn resolve(base: &Url, href: &str) -> Option<String> {
    let resolved = base.join(href.trim()).ok()?;
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

/// Whether the element mentions open access in its text or class names.
pub(crate) fn mentions_open_access(element: ElementRef<'_>) -> bool {
    let text = element_text(element).to_lowercase();
    if text.contains("open access") {
        return true;
    }
    element.descendants().filter_map(ElementRef::wrap).any(|child| {
        child
            .value()
            .attr("class")
            .is_some_and(|class| class.contains("open-access") || class.contains("openAccess"))
    })
}

/// Append query pairs to a base URL.
pub(crate) fn with_query(base: &Url, pairs: &[(&str, String)]) -> Url {
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            query.append_pair(key, value);
        }
    }
    url
}
