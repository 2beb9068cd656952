//! Triage configuration value plus TOML/JSON loaders.
//!
//! The pipeline only ever sees a `TriageConfig` value; resolving where that
//! value comes from (env var, default path) is the binary's job.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::TriageError;
use crate::normalize::fold_text;

pub const DEFAULT_CONFIG_PATH: &str = "config/triage.toml";
pub const ENV_CONFIG_PATH: &str = "TRIAGE_CONFIG_PATH";

pub const DEFAULT_WINDOW_HOURS: i64 = 48;
pub const DEFAULT_BODY_PREFIX_CHARS: usize = 120;
pub const DEFAULT_SENTIMENT_THRESHOLD: f32 = 0.2;

/// Query parameters that never identify content. Anything starting with `utm_`
/// is dropped as well.
pub const DEFAULT_TRACKING_PARAMS: &[&str] = &[
    "spm",
    "from",
    "scene",
    "chksm",
    "srcid",
    "sharer_sharetime",
    "sharer_shareid",
    "share_token",
    "xsec_token",
    "xsec_source",
    "isappinstalled",
    "clicktime",
    "enterid",
    "ref",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Primary keywords an item must mention.
    pub keywords: Vec<String>,
    /// keyword -> co-occurrence terms; at least one must appear for the keyword to count.
    #[serde(default)]
    pub associations: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,
    /// Also search the author field for association terms.
    #[serde(default)]
    pub search_author: bool,
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Body characters folded into the text signature when a post has no URL.
    /// 0 means title only.
    #[serde(default = "default_body_prefix_chars")]
    pub body_prefix_chars: usize,
    #[serde(default = "default_tracking_params")]
    pub tracking_params: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentConfig {
    #[serde(default = "default_threshold")]
    pub positive_threshold: f32,
    /// Magnitude; a polarity at or below `-negative_threshold` is negative.
    #[serde(default = "default_threshold")]
    pub negative_threshold: f32,
}

fn default_window_hours() -> i64 {
    DEFAULT_WINDOW_HOURS
}
fn default_body_prefix_chars() -> usize {
    DEFAULT_BODY_PREFIX_CHARS
}
fn default_tracking_params() -> Vec<String> {
    DEFAULT_TRACKING_PARAMS.iter().map(|s| s.to_string()).collect()
}
fn default_threshold() -> f32 {
    DEFAULT_SENTIMENT_THRESHOLD
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            body_prefix_chars: DEFAULT_BODY_PREFIX_CHARS,
            tracking_params: default_tracking_params(),
        }
    }
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            positive_threshold: DEFAULT_SENTIMENT_THRESHOLD,
            negative_threshold: DEFAULT_SENTIMENT_THRESHOLD,
        }
    }
}

impl TriageConfig {
    /// Config with the given keywords and defaults everywhere else.
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            associations: BTreeMap::new(),
            window_hours: DEFAULT_WINDOW_HOURS,
            search_author: false,
            dedup: DedupConfig::default(),
            sentiment: SentimentConfig::default(),
        }
    }

    /// Builder-style helper for association terms.
    pub fn associate<I, S>(mut self, keyword: &str, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.associations.insert(
            keyword.to_string(),
            terms.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Checks everything the pipeline relies on. Called by `TriagePipeline::new`.
    pub fn validate(&self) -> std::result::Result<(), TriageError> {
        if self.keywords.is_empty() {
            return Err(TriageError::NoActiveKeywords);
        }
        if let Some(i) = self.keywords.iter().position(|k| k.trim().is_empty()) {
            return Err(TriageError::BlankTerm {
                location: format!("keywords[{i}]"),
            });
        }
        for (kw, terms) in &self.associations {
            if !self.keywords.iter().any(|k| fold_text(k) == fold_text(kw)) {
                return Err(TriageError::UnknownAssociationKeyword {
                    keyword: kw.clone(),
                });
            }
            if let Some(i) = terms.iter().position(|t| t.trim().is_empty()) {
                return Err(TriageError::BlankTerm {
                    location: format!("associations.{kw}[{i}]"),
                });
            }
        }
        if self.window_hours <= 0 || chrono::Duration::try_hours(self.window_hours).is_none() {
            return Err(TriageError::InvalidWindow {
                hours: self.window_hours,
            });
        }
        for t in [
            self.sentiment.positive_threshold,
            self.sentiment.negative_threshold,
        ] {
            if !(t > 0.0 && t <= 1.0) {
                return Err(TriageError::InvalidThreshold { value: t });
            }
        }
        Ok(())
    }
}

/// Load config from an explicit path. Supports TOML or JSON.
pub fn load_config_from(path: &Path) -> Result<TriageConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading triage config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing triage config {}", path.display()))
}

/// `$TRIAGE_CONFIG_PATH` or `config/triage.toml`.
pub fn config_path_from_env() -> PathBuf {
    std::env::var(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn parse_config(s: &str, hint_ext: &str) -> Result<TriageConfig> {
    if hint_ext == "json" {
        return Ok(serde_json::from_str(s)?);
    }
    match toml::from_str::<TriageConfig>(s) {
        Ok(cfg) => Ok(cfg),
        Err(toml_err) => serde_json::from_str(s)
            .map_err(|_| anyhow!("unsupported config format: {toml_err}")),
    }
}
