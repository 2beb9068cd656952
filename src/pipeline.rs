// src/pipeline.rs
//! Triage pipeline: Normalizer -> Deduplicator -> Relevance -> Time window ->
//! Sentiment -> Aggregator, one linear pass per batch.
//!
//! The only fatal condition is invalid configuration, caught in
//! [`TriagePipeline::new`]. `run` never fails: bad post data is normalized,
//! and dropped items are returned in `rejected` with the reason.

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

use crate::aggregate::{summarize, Summary};
use crate::config::TriageConfig;
use crate::dedup::{anon_id, Deduplicator, KeyDeriver, SeenKeys};
use crate::error::TriageError;
use crate::model::{OpinionItem, RawPost};
use crate::normalize::Normalizer;
use crate::relevance::RelevanceMatcher;
use crate::sentiment::SentimentScorer;
use crate::window::TimeWindow;

/// One-time metrics registration (so series show up in the exposition).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("triage_posts_total", "Raw posts entering the pipeline.");
        describe_counter!(
            "triage_duplicates_total",
            "Posts dropped as duplicates (in batch or previously seen)."
        );
        describe_counter!(
            "triage_irrelevant_total",
            "Posts dropped for matching no keyword."
        );
        describe_counter!(
            "triage_stale_total",
            "Posts dropped for falling outside the time window."
        );
        describe_counter!("triage_kept_total", "Posts surviving all filters.");
        describe_counter!(
            "triage_collector_errors_total",
            "Collector fetch/parse errors."
        );
        describe_histogram!("triage_run_ms", "Pipeline run time in milliseconds.");
        describe_gauge!(
            "triage_last_run_ts",
            "Unix ts when the triage pipeline last ran."
        );
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectReason {
    Duplicate,
    Irrelevant,
    Stale,
}

/// A dropped item with the annotations it had when it was dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejected {
    pub item: OpinionItem,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub input: usize,
    pub duplicates: usize,
    pub irrelevant: usize,
    pub stale: usize,
    pub kept: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    /// Surviving items in input order.
    pub items: Vec<OpinionItem>,
    pub rejected: Vec<Rejected>,
    /// Input seen set plus the keys of `items`; persist this for the next run.
    pub seen: SeenKeys,
    pub summary: Summary,
    pub counts: StageCounts,
}

#[derive(Debug, Clone)]
pub struct TriagePipeline {
    normalizer: Normalizer,
    relevance: RelevanceMatcher,
    window: TimeWindow,
    sentiment: SentimentScorer,
}

impl TriagePipeline {
    pub fn new(config: TriageConfig) -> Result<Self, TriageError> {
        let relevance = RelevanceMatcher::from_config(&config)?;
        Ok(Self {
            normalizer: Normalizer::new(KeyDeriver::new(&config.dedup)),
            relevance,
            window: TimeWindow::hours(config.window_hours)?,
            sentiment: SentimentScorer::new(config.sentiment),
        })
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Runs one batch. `posts` must already be in the caller's merge order;
    /// `seen` is read once and never mutated.
    pub fn run(&self, posts: Vec<RawPost>, seen: &SeenKeys, now: DateTime<Utc>) -> PipelineOutput {
        ensure_metrics_described();
        let t0 = Instant::now();

        let mut counts = StageCounts {
            input: posts.len(),
            ..StageCounts::default()
        };
        let mut rejected = Vec::new();

        // 1) Normalize
        let items: Vec<OpinionItem> = posts
            .into_iter()
            .map(|p| self.normalizer.normalize(p))
            .collect();

        // 2) Dedup (first occurrence wins)
        let (items, dups) = Deduplicator::new(Some(seen)).partition(items);
        counts.duplicates = dups.len();
        rejected.extend(dups.into_iter().map(|item| Rejected {
            item,
            reason: RejectReason::Duplicate,
        }));

        // 3) Relevance, 4) time window, 5) sentiment
        let mut kept = Vec::with_capacity(items.len());
        for mut item in items {
            self.relevance.annotate(&mut item);
            if !item.is_relevant {
                counts.irrelevant += 1;
                rejected.push(Rejected {
                    item,
                    reason: RejectReason::Irrelevant,
                });
                continue;
            }

            self.window.annotate(&mut item, now);
            if !item.is_in_time_window {
                debug!(target: "triage", id = %anon_id(&item.dedup_key), "stale");
                counts.stale += 1;
                rejected.push(Rejected {
                    item,
                    reason: RejectReason::Stale,
                });
                continue;
            }

            self.sentiment.annotate(&mut item);
            kept.push(item);
        }
        counts.kept = kept.len();

        // 6) Aggregate
        let summary = summarize(&kept);

        let mut next_seen = seen.clone();
        next_seen.extend(kept.iter().map(|it| it.dedup_key.clone()));

        // Telemetry
        counter!("triage_posts_total").increment(counts.input as u64);
        counter!("triage_duplicates_total").increment(counts.duplicates as u64);
        counter!("triage_irrelevant_total").increment(counts.irrelevant as u64);
        counter!("triage_stale_total").increment(counts.stale as u64);
        counter!("triage_kept_total").increment(counts.kept as u64);
        histogram!("triage_run_ms").record(t0.elapsed().as_secs_f64() * 1000.0);
        gauge!("triage_last_run_ts").set(now.timestamp().max(0) as f64);

        info!(
            target: "triage",
            input = counts.input,
            duplicates = counts.duplicates,
            irrelevant = counts.irrelevant,
            stale = counts.stale,
            kept = counts.kept,
            "pipeline run"
        );

        PipelineOutput {
            items: kept,
            rejected,
            seen: next_seen,
            summary,
            counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Platform;
    use chrono::TimeZone;

    #[test]
    fn counts_add_up_and_seen_grows() {
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap();
        let p = TriagePipeline::new(TriageConfig::with_keywords(["Beta"])).unwrap();

        let mut a = RawPost::new(Platform::WechatSearch, now);
        a.title = "Beta is here".into();
        let b = a.clone();
        let mut c = RawPost::new(Platform::SocialApp, now);
        c.title = "nothing to see".into();

        let prev: SeenKeys = ["url:old"].into_iter().collect();
        let out = p.run(vec![a, b, c], &prev, now);
        assert_eq!(
            out.counts,
            StageCounts {
                input: 3,
                duplicates: 1,
                irrelevant: 1,
                stale: 0,
                kept: 1
            }
        );
        assert_eq!(out.rejected.len(), 2);
        assert_eq!(out.seen.len(), 2);
        assert!(out.seen.contains("url:old"));
        assert!(out.seen.contains(&out.items[0].dedup_key));
        assert_eq!(prev.len(), 1);
    }
}
