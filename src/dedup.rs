//! Title-based deduplication.
//!
//! Two records are the same article when their normalized titles are equal.
//! The incremental check ([`Deduplicator::is_duplicate`]) registers every
//! title it sees; [`find_unique`] is an independent end-of-run pass with its
//! own fresh set. Both use [`normalize_title`].

use crate::models::EnrichedRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid title punctuation regex"));
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Lowercase, drop punctuation, collapse whitespace, trim.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = NON_WORD_RE.replace_all(&lowered, "");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

/// Seen-set of normalized titles for one run.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    /// Check `title` against the seen-set and register it if absent.
    ///
    /// Returns `true` when an equivalent title was registered before.
    pub fn is_duplicate(&mut self, title: &str) -> bool {
        !self.seen.insert(normalize_title(title))
    }

    /// Number of distinct titles registered so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }
}

/// Keep the first record of every normalized title, in order.
///
/// Returns the unique records and how many were dropped.
pub fn find_unique(records: &[EnrichedRecord]) -> (Vec<EnrichedRecord>, usize) {
    let mut seen = HashSet::new();
    let unique: Vec<EnrichedRecord> = records
        .iter()
        .filter(|record| seen.insert(normalize_title(record.title())))
        .cloned()
        .collect();
    let removed = records.len() - unique.len();
    (unique, removed)
}
