//! Run configuration.
//!
//! Every knob of a collection or extraction run lives in [`ScraperConfig`].
//! It can be loaded from a YAML file (`--config`), and the CLI applies its
//! overrides on top of it in a single place (see [`crate::cli`]). Every field
//! has a default, so an empty YAML document is a valid configuration.

use crate::error::ConfigError;
use crate::models::Source;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

/// Finance, markets, trading and risk terms used by the relevance filter.
pub const DEFAULT_VOCABULARY: &[&str] = &[
    "finance", "financial", "trading", "trader", "trade",
    "market", "stock", "equity", "portfolio", "investment",
    "asset", "pricing", "risk", "hedge", "hedging",
    "forex", "currency", "bond", "derivative", "option",
    "futures", "commodities", "banking", "credit", "loan",
    "volatility", "returns", "profit", "loss", "arbitrage",
    "quantitative", "algorithmic", "high-frequency", "hft",
    "wealth", "fund", "etf", "index", "dow", "nasdaq", "s&p",
    "cryptocurrency", "bitcoin", "blockchain", "defi",
    "fintech", "robo-advisor", "sentiment", "earnings",
    "macroeconomic", "monetary", "fiscal", "recession",
];

pub const DEFAULT_KEYWORDS: &[&str] = &[
    "machine learning finance",
    "deep learning trading",
    "neural network stock prediction",
    "reinforcement learning portfolio",
    "LSTM stock market",
    "artificial intelligence trading",
    "algorithmic trading machine learning",
    "high frequency trading AI",
    "automated trading neural network",
    "quant trading deep learning",
    "credit risk machine learning",
    "fraud detection deep learning",
    "financial risk prediction",
    "market risk neural network",
    "NLP financial news",
    "sentiment analysis stock",
    "financial text mining",
    "LLM finance",
    "cryptocurrency prediction machine learning",
    "bitcoin price forecasting neural network",
];

/// Fixed politeness pauses, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delays {
    /// Pause after every adapter invocation.
    pub after_source_ms: u64,
    /// Pause after every PDF download attempt.
    pub after_download_ms: u64,
    /// Pause between result pages of a paginated HTML source.
    pub between_pages_ms: u64,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            after_source_ms: 2000,
            after_download_ms: 2000,
            between_pages_ms: 3000,
        }
    }
}

impl Delays {
    #[cfg(test)]
    pub fn none() -> Self {
        Self {
            after_source_ms: 0,
            after_download_ms: 0,
            between_pages_ms: 0,
        }
    }

    pub fn after_source(&self) -> Duration {
        Duration::from_millis(self.after_source_ms)
    }

    pub fn after_download(&self) -> Duration {
        Duration::from_millis(self.after_download_ms)
    }

    pub fn between_pages(&self) -> Duration {
        Duration::from_millis(self.between_pages_ms)
    }
}

/// Complete configuration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Root of the PDF tree; one subdirectory per source tag.
    pub pdf_dir: PathBuf,
    pub download_pdfs: bool,
    /// Require relevance-filter approval before keeping a record.
    pub strict_filter: bool,
    /// Stop collecting once this many records are accumulated.
    pub target_count: usize,
    pub keywords: Vec<String>,
    /// Sources in priority order.
    pub sources: Vec<Source>,
    /// Maximum number of records accepted from one adapter call.
    pub ceilings: BTreeMap<Source, usize>,
    /// Upper bound on result pages fetched by a paginated HTML source.
    pub max_pages: u32,
    /// Number of leading PDF pages read by the extraction pass.
    pub text_pages: usize,
    pub vocabulary: Vec<String>,
    /// Restrict the Journal of Banking and Finance search to open access.
    pub open_access_only: bool,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub download_timeout_secs: u64,
    pub delays: Delays,
    pub output_dir: PathBuf,
    pub output_stem: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            pdf_dir: PathBuf::from("pdfs_articles"),
            download_pdfs: true,
            strict_filter: true,
            target_count: 1000,
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            sources: Source::ALL.to_vec(),
            ceilings: default_ceilings(),
            max_pages: 5,
            text_pages: 3,
            vocabulary: DEFAULT_VOCABULARY.iter().map(|k| k.to_string()).collect(),
            open_access_only: true,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            request_timeout_secs: 30,
            download_timeout_secs: 60,
            delays: Delays::default(),
            output_dir: PathBuf::from("."),
            output_stem: "articles_ia_finance_complet".to_string(),
        }
    }
}

fn default_ceilings() -> BTreeMap<Source, usize> {
    BTreeMap::from([
        (Source::Arxiv, 100),
        (Source::Ssrn, 50),
        (Source::GoogleScholar, 30),
        (Source::Jfds, 50),
        (Source::BankingFinance, 100),
        (Source::Ieee, 50),
        (Source::Jmlr, 50),
        (Source::Researchgate, 50),
    ])
}

/// Ceiling used for a source missing from the `ceilings` map.
const FALLBACK_CEILING: usize = 50;

impl ScraperConfig {
    /// Load a configuration from a YAML file.
    ///
    /// Missing fields take their defaults. The result is validated.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingInput(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!("Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_count == 0 {
            return Err(ConfigError::Invalid("target_count must be at least 1".into()));
        }
        if self.text_pages == 0 {
            return Err(ConfigError::Invalid("text_pages must be at least 1".into()));
        }
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::Invalid("keyword list is empty".into()));
        }
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid("source list is empty".into()));
        }
        Ok(())
    }

    pub fn ceiling(&self, source: Source) -> usize {
        self.ceilings.get(&source).copied().unwrap_or(FALLBACK_CEILING)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}
