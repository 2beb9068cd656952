// src/collect.rs
//! Caller side of the pipeline: run platform collectors concurrently and merge
//! their batches into the single ordering the Deduplicator relies on.

use anyhow::{Context, Result};
use metrics::counter;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::model::{Platform, RawPost};
use crate::pipeline::ensure_metrics_described;

/// Merge order when several platforms report the same content. Authenticated
/// search goes first because it carries exact publish times.
pub const DEFAULT_PLATFORM_PRIORITY: [Platform; 4] = [
    Platform::WechatAuthenticated,
    Platform::WechatSearch,
    Platform::SocialApp,
    Platform::Other,
];

#[async_trait::async_trait]
pub trait PostCollector: Send + Sync {
    fn platform(&self) -> Platform;
    async fn collect(&self) -> Result<Vec<RawPost>>;
}

/// Concatenates batches by platform rank. Platforms missing from `priority`
/// go last; ties keep their input order, and posts inside a batch are never
/// reordered.
pub fn merge_by_priority(
    mut batches: Vec<(Platform, Vec<RawPost>)>,
    priority: &[Platform],
) -> Vec<RawPost> {
    let rank = |p: &Platform| priority.iter().position(|x| x == p).unwrap_or(priority.len());
    batches.sort_by_key(|(p, _)| rank(p));
    batches.into_iter().flat_map(|(_, posts)| posts).collect()
}

/// Runs every collector on its own tokio task. A failed or panicked collector
/// is logged and skipped.
pub async fn collect_all(
    collectors: Vec<Arc<dyn PostCollector>>,
    priority: &[Platform],
) -> Vec<RawPost> {
    ensure_metrics_described();

    let handles: Vec<_> = collectors
        .into_iter()
        .map(|c| {
            let platform = c.platform();
            (platform, tokio::spawn(async move { c.collect().await }))
        })
        .collect();

    let mut batches = Vec::with_capacity(handles.len());
    for (platform, handle) in handles {
        match handle.await {
            Ok(Ok(posts)) => {
                info!(target: "triage", %platform, posts = posts.len(), "collector done");
                batches.push((platform, posts));
            }
            Ok(Err(e)) => {
                warn!(target: "triage", error = ?e, %platform, "collector error");
                counter!("triage_collector_errors_total").increment(1);
            }
            Err(e) => {
                warn!(target: "triage", error = %e, %platform, "collector task failed");
                counter!("triage_collector_errors_total").increment(1);
            }
        }
    }

    merge_by_priority(batches, priority)
}

/// Reads a JSON array of `RawPost` from disk. Stands in for a live collector
/// in tests and offline runs.
#[derive(Debug, Clone)]
pub struct FixtureCollector {
    platform: Platform,
    path: PathBuf,
}

impl FixtureCollector {
    pub fn new(platform: Platform, path: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            path: path.into(),
        }
    }

    /// `platform=path`, or a bare path for `Platform::Other`.
    pub fn from_arg(arg: &str) -> Self {
        match arg.split_once('=') {
            Some((platform, path)) if !platform.is_empty() && !path.is_empty() => {
                Self::new(platform.parse().unwrap_or(Platform::Other), path)
            }
            _ => Self::new(Platform::Other, arg),
        }
    }
}

#[async_trait::async_trait]
impl PostCollector for FixtureCollector {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn collect(&self) -> Result<Vec<RawPost>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading fixture {}", self.path.display()))?;
        let posts: Vec<RawPost> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing fixture {}", self.path.display()))?;
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn post(platform: Platform, title: &str) -> RawPost {
        let mut p = RawPost::new(platform, Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap());
        p.title = title.into();
        p
    }

    #[test]
    fn merge_respects_priority_and_batch_order() {
        let merged = merge_by_priority(
            vec![
                (Platform::SocialApp, vec![post(Platform::SocialApp, "s1")]),
                (
                    Platform::WechatSearch,
                    vec![post(Platform::WechatSearch, "w1"), post(Platform::WechatSearch, "w2")],
                ),
                (Platform::Other, vec![post(Platform::Other, "o1")]),
            ],
            &[Platform::WechatSearch, Platform::SocialApp],
        );
        let titles: Vec<_> = merged.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["w1", "w2", "s1", "o1"]);
    }

    #[test]
    fn fixture_arg_forms() {
        assert_eq!(
            FixtureCollector::from_arg("social-app=a.json").platform(),
            Platform::SocialApp
        );
        assert_eq!(FixtureCollector::from_arg("a.json").platform(), Platform::Other);
    }
}
