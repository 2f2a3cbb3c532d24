//! Utility functions for string handling, file names and output directories.
//!
//! This module provides helper functions used throughout the application:
//! - Character-safe truncation for logging and bounded record fields
//! - Whitespace collapsing for scraped text
//! - File-system-safe names for downloaded documents
//! - Run timestamps and output directory validation

use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static UNSAFE_FILENAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid filename regex"));
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` characters and `…` is appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("Deep hedging of derivatives", 4), "Deep…");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}…", truncate_chars(s, max))
    }
}

/// Keep at most `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Replace every whitespace run with one space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build a file-system-safe stem from an article title.
///
/// Characters outside word characters, whitespace and `-` are removed, the
/// result is cut to 100 characters, then whitespace runs become `_`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(safe_file_stem("Deep Hedging: A Survey!"), "Deep_Hedging_A_Survey");
/// ```
pub fn safe_file_stem(title: &str) -> String {
    let cleaned = UNSAFE_FILENAME_RE.replace_all(title, "");
    let cut = truncate_chars(&cleaned, 100);
    WHITESPACE_RE.replace_all(&cut, "_").into_owned()
}

/// Timestamp used in output file names, e.g. `20250506_143000`.
pub fn run_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and deletes a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or written to.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.ends_with('…'));
        assert_eq!(result.chars().count(), 101);
    }

    #[test]
    fn test_truncate_chars_is_utf8_safe() {
        assert_eq!(truncate_chars("marchés financiers", 7), "marchés");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Deep\n  Hedging\t"), "Deep Hedging");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_safe_file_stem() {
        assert_eq!(safe_file_stem("Deep Hedging: A Survey!"), "Deep_Hedging_A_Survey");
        assert_eq!(safe_file_stem("LSTM-based   stock/price model"), "LSTM-based_stockprice_model");
        assert_eq!(safe_file_stem("x".repeat(150).as_str()).len(), 100);
    }

    #[test]
    fn test_run_timestamp_shape() {
        let ts = run_timestamp();
        assert_eq!(ts.len(), 15);
        assert_eq!(ts.as_bytes()[8], b'_');
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_directory() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("out/json");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join("..__probe_write__").exists());
    }
}
