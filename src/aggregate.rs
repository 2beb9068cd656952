//! Summary reduction over the final item set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{Engagement, OpinionItem, Platform, SentimentLabel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    /// Always holds all three labels.
    pub by_sentiment: BTreeMap<SentimentLabel, usize>,
    pub by_keyword: BTreeMap<String, usize>,
    pub by_platform: BTreeMap<Platform, usize>,
    /// Mean polarity over scored items; 0 for an empty set.
    pub mean_score: f32,
    pub engagement: Engagement,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            total: 0,
            by_sentiment: SentimentLabel::ALL.iter().map(|l| (*l, 0)).collect(),
            by_keyword: BTreeMap::new(),
            by_platform: BTreeMap::new(),
            mean_score: 0.0,
            engagement: Engagement::default(),
        }
    }
}

impl Summary {
    pub fn sentiment_count(&self, label: SentimentLabel) -> usize {
        self.by_sentiment.get(&label).copied().unwrap_or(0)
    }
}

/// Pure reduction. An item matching several keywords counts once per keyword.
pub fn summarize(items: &[OpinionItem]) -> Summary {
    let mut s = Summary {
        total: items.len(),
        ..Summary::default()
    };

    let mut score_sum = 0.0f64;
    let mut scored = 0usize;
    for it in items {
        if let Some(sent) = it.sentiment {
            *s.by_sentiment.entry(sent.label).or_insert(0) += 1;
            score_sum += sent.score as f64;
            scored += 1;
        }
        for kw in &it.matched_keywords {
            *s.by_keyword.entry(kw.clone()).or_insert(0) += 1;
        }
        *s.by_platform.entry(it.platform).or_insert(0) += 1;

        // Counts are scraped text; a bogus huge one must not overflow the total.
        s.engagement.likes = s.engagement.likes.saturating_add(it.engagement.likes);
        s.engagement.comments = s.engagement.comments.saturating_add(it.engagement.comments);
        s.engagement.shares = s.engagement.shares.saturating_add(it.engagement.shares);
    }
    if scored > 0 {
        s.mean_score = (score_sum / scored as f64) as f32;
    }
    s
}
