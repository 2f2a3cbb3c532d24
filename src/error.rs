//! Error types.
//!
//! Two families exist. [`FetchError`] covers everything that can go wrong
//! while talking to a remote source or downloading a document; those errors
//! are always absorbed at the adapter/fetcher boundary and turned into
//! "zero results" or "skip this record". [`ConfigError`] covers missing or
//! invalid inputs to a run and is fatal.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response from {origin}: {reason}")]
    Malformed { origin: String, reason: String },

    #[error("not a document (content-type {0:?})")]
    ContentMismatch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
