//! Post records flowing through the triage pipeline.
//!
//! `RawPost` is what a collector hands over (raw strings, best-effort fields);
//! `OpinionItem` is the canonical record the Normalizer produces and the later
//! stages annotate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Sentinel author for posts whose author could not be extracted.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Content platform a post was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    /// Public article search (no login).
    WechatSearch,
    /// Article search through an authenticated publisher backend.
    WechatAuthenticated,
    /// Short-note social app.
    SocialApp,
    #[serde(other)]
    Other,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::WechatSearch => "wechat-search",
            Platform::WechatAuthenticated => "wechat-authenticated",
            Platform::SocialApp => "social-app",
            Platform::Other => "other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = std::convert::Infallible;

    /// Unknown names map to `Other`, like the serde form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "wechat-search" => Platform::WechatSearch,
            "wechat-authenticated" => Platform::WechatAuthenticated,
            "social-app" => Platform::SocialApp,
            _ => Platform::Other,
        })
    }
}

/// Collector output. Every text field is whatever the collector scraped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    pub platform: Platform,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: String,
    /// Timestamp text as shown by the platform ("3小时前", "2026-01-10", unix secs, ...).
    #[serde(default)]
    pub published_at: Option<String>,
    pub collected_at: DateTime<Utc>,
    /// Raw engagement counters ("1.2万", "356", ...).
    #[serde(default)]
    pub likes: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub shares: Option<String>,
}

impl RawPost {
    /// Minimal post with empty optional fields; handy for collectors and tests.
    pub fn new(platform: Platform, collected_at: DateTime<Utc>) -> Self {
        Self {
            platform,
            url: String::new(),
            title: String::new(),
            body: String::new(),
            author: String::new(),
            published_at: None,
            collected_at,
            likes: None,
            comments: None,
            shares: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label and polarity always travel together.
/// `score` is a polarity in [-1, 1]: negative below zero, positive above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f32,
}

impl Sentiment {
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
        }
    }
}

/// Canonical, annotated post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionItem {
    pub platform: Platform,
    pub url: String,
    pub title: String,
    pub body: String,
    pub author: String,
    pub published_at: Option<DateTime<Utc>>,
    pub collected_at: DateTime<Utc>,
    pub engagement: Engagement,
    pub dedup_key: String,
    pub matched_keywords: BTreeSet<String>,
    pub is_relevant: bool,
    pub is_in_time_window: bool,
    pub sentiment: Option<Sentiment>,
}

impl OpinionItem {
    /// `published_at` when known, otherwise `collected_at`.
    pub fn effective_timestamp(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.collected_at)
    }

    /// Text the sentiment scorer reads.
    pub fn scoring_text(&self) -> String {
        match (self.title.is_empty(), self.body.is_empty()) {
            (false, false) => format!("{} {}", self.title, self.body),
            (false, true) => self.title.clone(),
            (true, false) => self.body.clone(),
            (true, true) => String::new(),
        }
    }

    pub fn sentiment_label(&self) -> Option<SentimentLabel> {
        self.sentiment.map(|s| s.label)
    }

    pub fn sentiment_score(&self) -> Option<f32> {
        self.sentiment.map(|s| s.score)
    }
}
