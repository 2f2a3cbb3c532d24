//! Article sources.
//!
//! Every source is a [`SourceAdapter`]: given a keyword and a result ceiling
//! it returns a list of [`CandidateRecord`]s and never fails. Network,
//! status and parse failures are logged and turn into an empty result for
//! that call.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | arXiv | [`arxiv`] | Atom API | Category-filtered query, overfetches 2x |
//! | SSRN | [`ssrn`] | HTML search | Paginated; PDF link needs auth, not downloaded |
//! | Google Scholar | [`scholar`] | HTML search | Paginated by `start` offset |
//! | JFDS | [`jfds`] | HTML listing | Finance-only journal, no relevance filter |
//! | J Banking Finance | [`banking`] | HTML search | ScienceDirect, open access detection |
//! | IEEE Xplore | [`ieee`] | HTML search | Open access detection |
//! | JMLR | [`jmlr`] | HTML listing | Keyword independent |
//! | ResearchGate | [`researchgate`] | HTML search | |
//!
//! Adapters are looked up through an [`AdapterRegistry`] keyed by
//! [`Source`], so the pipeline never special-cases a source. Per-source
//! behavior is expressed through the flags on [`SourceAdapter`].

pub mod arxiv;
pub mod banking;
pub mod html;
pub mod ieee;
pub mod jfds;
pub mod jmlr;
pub mod researchgate;
pub mod scholar;
pub mod ssrn;

use crate::config::ScraperConfig;
use crate::models::{CandidateRecord, Source};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::debug;

use arxiv::ArxivAdapter;
use banking::BankingFinance;
use html::HtmlSearchAdapter;
use ieee::Ieee;
use jfds::Jfds;
use jmlr::Jmlr;
use researchgate::ResearchGate;
use scholar::GoogleScholar;
use ssrn::Ssrn;

/// A source of candidate articles.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> Source;

    /// Whether records from this source must pass the relevance filter.
    fn requires_relevance_filter(&self) -> bool {
        true
    }

    /// Whether the listing ignores the keyword. Such adapters only need to
    /// run once per collection run.
    fn keyword_independent(&self) -> bool {
        false
    }

    /// Whether `pdf_url`s from this source may be downloaded.
    fn downloads_pdfs(&self) -> bool {
        true
    }

    /// Fetch candidates for `keyword`. Never fails; see the module docs.
    async fn fetch(&self, keyword: &str, ceiling: usize) -> Vec<CandidateRecord>;
}

/// Build the HTTP client shared by every adapter.
pub fn build_client(config: &ScraperConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .build()
}

/// Adapters keyed by source tag.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<Source, Box<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with one adapter per known source, pointed at the real sites.
    pub fn with_defaults(client: reqwest::Client, config: &ScraperConfig) -> Self {
        let page_delay = config.delays.between_pages();
        let max_pages = config.max_pages;
        let mut registry = Self::new();
        registry.register(ArxivAdapter::new(client.clone()));
        registry.register(HtmlSearchAdapter::new(Ssrn::default(), client.clone(), max_pages, page_delay));
        registry.register(HtmlSearchAdapter::new(GoogleScholar::default(), client.clone(), max_pages, page_delay));
        registry.register(HtmlSearchAdapter::new(Jfds::default(), client.clone(), max_pages, page_delay));
        registry.register(HtmlSearchAdapter::new(
            BankingFinance::new(config.open_access_only),
            client.clone(),
            max_pages,
            page_delay,
        ));
        registry.register(HtmlSearchAdapter::new(Ieee::default(), client.clone(), max_pages, page_delay));
        registry.register(HtmlSearchAdapter::new(Jmlr::default(), client.clone(), max_pages, page_delay));
        registry.register(HtmlSearchAdapter::new(ResearchGate::default(), client, max_pages, page_delay));
        registry
    }

    /// Register an adapter, replacing any previous one for the same source.
    pub fn register<A: SourceAdapter + 'static>(&mut self, adapter: A) {
        let source = adapter.source();
        debug!(%source, "Registering source adapter");
        self.adapters.insert(source, Box::new(adapter));
    }

    pub fn get(&self, source: Source) -> Option<&dyn SourceAdapter> {
        self.adapters.get(&source).map(|adapter| adapter.as_ref())
    }

    #[cfg(test)]
    pub fn sources(&self) -> impl Iterator<Item = Source> + '_ {
        self.adapters.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
