//! Collection run orchestration.
//!
//! A run walks keywords in order and, for each keyword, the sources in
//! priority order. Every candidate an adapter returns goes through the
//! relevance filter, the incremental duplicate check, an optional PDF
//! download, and is appended to the collection. The run stops the moment
//! the collection reaches the target count.
//!
//! Everything is sequential: one adapter call or download at a time, with
//! fixed pauses in between.

use crate::config::ScraperConfig;
use crate::dedup::{Deduplicator, find_unique};
use crate::filter::RelevanceFilter;
use crate::models::{CandidateRecord, EnrichedRecord, Source};
use crate::pdf::PdfFetcher;
use crate::scrapers::{AdapterRegistry, SourceAdapter};
use crate::utils::truncate_for_log;
use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Fetching,
    Filtering,
    Deduplicating,
    Downloading,
    Accumulating,
    /// The end-of-run deduplication pass has completed.
    Deduplicated,
    /// Outputs were written. Set by the caller.
    Persisted,
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub accepted: usize,
    /// Candidates dropped by the relevance filter.
    pub rejected: usize,
    /// Candidates dropped by the incremental duplicate check.
    pub duplicates: usize,
    /// Records dropped by the end-of-run pass.
    pub final_duplicates_removed: usize,
    pub pdfs_downloaded: usize,
    pub download_failed: usize,
    pub adapter_calls: usize,
}

/// Result of [`Pipeline::run`].
#[derive(Debug)]
pub struct RunReport {
    pub records: Vec<EnrichedRecord>,
    pub stats: RunStats,
    pub phase: RunPhase,
}

impl RunReport {
    pub fn mark_persisted(&mut self) {
        self.phase = RunPhase::Persisted;
    }
}

/// Mutable state owned by a single run.
#[derive(Default)]
struct RunContext {
    records: Vec<EnrichedRecord>,
    dedup: Deduplicator,
    stats: RunStats,
    phase: RunPhase,
}

pub struct Pipeline {
    config: ScraperConfig,
    registry: AdapterRegistry,
    fetcher: Option<PdfFetcher>,
    filter: RelevanceFilter,
}

impl Pipeline {
    pub fn new(config: ScraperConfig, registry: AdapterRegistry, fetcher: Option<PdfFetcher>) -> Self {
        let filter = RelevanceFilter::new(&config.vocabulary);
        Self {
            config,
            registry,
            fetcher,
            filter,
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Collect up to `target_count` records.
    ///
    /// Sources without a registered adapter are skipped with a warning.
    /// Keyword-independent adapters only run for the first keyword.
    ///
    /// # Arguments
    ///
    /// * `keywords` - Search queries, in the order they are tried
    /// * `sources` - Sources to query for each keyword, in priority order
    /// * `target_count` - Collection size at which the run stops
    ///
    /// # Returns
    ///
    /// A [`RunReport`] with the deduplicated records, the run statistics and
    /// the final phase. Source and download failures are counted, never returned.
    #[instrument(level = "info", skip_all, fields(target = target_count, keywords = keywords.len()))]
    pub async fn run(&self, keywords: &[String], sources: &[Source], target_count: usize) -> RunReport {
        let mut ctx = RunContext::default();
        if self.registry.is_empty() {
            warn!("No source adapters registered; nothing to collect");
        }

        'keywords: for (index, keyword) in keywords.iter().enumerate() {
            info!(keyword = %keyword, "Searching all sources");
            for &source in sources {
                let Some(adapter) = self.registry.get(source) else {
                    warn!(%source, "No adapter registered; skipping source");
                    continue;
                };
                if index > 0 && adapter.keyword_independent() {
                    debug!(%source, "Listing does not depend on the keyword; already collected");
                    continue;
                }

                let ceiling = self.config.ceiling(source);
                ctx.phase = RunPhase::Fetching;
                let candidates = adapter.fetch(keyword, ceiling).await;
                ctx.stats.adapter_calls += 1;

                if self.absorb(&mut ctx, adapter, candidates, ceiling, target_count).await {
                    info!(count = ctx.records.len(), "Target reached; stopping collection");
                    break 'keywords;
                }
                pause(self.config.delays.after_source()).await;
            }
        }

        let (records, removed) = find_unique(&ctx.records);
        ctx.stats.final_duplicates_removed = removed;
        ctx.phase = RunPhase::Deduplicated;

        info!(
            accepted = ctx.stats.accepted,
            rejected = ctx.stats.rejected,
            duplicates = ctx.stats.duplicates,
            download_failed = ctx.stats.download_failed,
            pdfs = ctx.stats.pdfs_downloaded,
            titles_seen = ctx.dedup.len(),
            final_count = records.len(),
            "Collection finished"
        );

        RunReport {
            records,
            stats: ctx.stats,
            phase: ctx.phase,
        }
    }

    /// Process the candidates of one adapter call.
    ///
    /// Returns `true` once the collection has reached `target_count`.
    async fn absorb(
        &self,
        ctx: &mut RunContext,
        adapter: &dyn SourceAdapter,
        candidates: Vec<CandidateRecord>,
        ceiling: usize,
        target_count: usize,
    ) -> bool {
        let source = adapter.source();
        let mut accepted_here = 0;

        for candidate in candidates {
            if accepted_here >= ceiling {
                break;
            }

            ctx.phase = RunPhase::Filtering;
            if self.config.strict_filter
                && adapter.requires_relevance_filter()
                && !self.filter.is_relevant(&candidate.title, &candidate.summary)
            {
                ctx.stats.rejected += 1;
                debug!(%source, title = %truncate_for_log(&candidate.title, 50), "Rejected (off topic)");
                continue;
            }

            ctx.phase = RunPhase::Deduplicating;
            if ctx.dedup.is_duplicate(&candidate.title) {
                ctx.stats.duplicates += 1;
                debug!(%source, title = %truncate_for_log(&candidate.title, 50), "Duplicate skipped");
                continue;
            }

            let mut record = EnrichedRecord::from(candidate);
            if self.config.download_pdfs && adapter.downloads_pdfs() {
                self.download(ctx, &mut record).await;
            }

            ctx.phase = RunPhase::Accumulating;
            ctx.records.push(record);
            ctx.stats.accepted += 1;
            accepted_here += 1;

            if ctx.records.len() >= target_count {
                return true;
            }
        }

        debug!(%source, accepted = accepted_here, "Adapter call absorbed");
        false
    }

    async fn download(&self, ctx: &mut RunContext, record: &mut EnrichedRecord) {
        let (Some(fetcher), Some(url)) = (&self.fetcher, record.candidate.pdf_url.as_deref()) else {
            return;
        };
        ctx.phase = RunPhase::Downloading;
        let candidate = &record.candidate;
        let outcome = fetcher
            .fetch(url, &candidate.title, candidate.source.tag(), candidate.external_id.as_deref())
            .await;
        match outcome {
            Ok(path) => {
                record.pdf_path = Some(path.display().to_string());
                ctx.stats.pdfs_downloaded += 1;
            }
            Err(e) => {
                warn!(title = %truncate_for_log(record.title(), 50), error = %e, "PDF download failed");
                ctx.stats.download_failed += 1;
            }
        }
        pause(self.config.delays.after_download()).await;
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        sleep(duration).await;
    }
}
