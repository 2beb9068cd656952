// tests/collect_merge.rs
use anyhow::{bail, Result};
use chrono::{TimeZone, Utc};
use opinion_triage::collect::{
    collect_all, FixtureCollector, PostCollector, DEFAULT_PLATFORM_PRIORITY,
};
use opinion_triage::{Platform, RawPost, SeenKeys, TriageConfig, TriagePipeline};
use std::sync::Arc;
use std::time::Duration;

struct Scripted {
    platform: Platform,
    delay_ms: u64,
    titles: Vec<&'static str>,
}

#[async_trait::async_trait]
impl PostCollector for Scripted {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn collect(&self) -> Result<Vec<RawPost>> {
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        let at = Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap();
        Ok(self
            .titles
            .iter()
            .map(|t| {
                let mut p = RawPost::new(self.platform, at);
                p.title = t.to_string();
                p
            })
            .collect())
    }
}

struct Failing;

#[async_trait::async_trait]
impl PostCollector for Failing {
    fn platform(&self) -> Platform {
        Platform::WechatAuthenticated
    }

    async fn collect(&self) -> Result<Vec<RawPost>> {
        bail!("login expired")
    }
}

#[tokio::test]
async fn merge_order_is_by_priority_not_completion() {
    let collectors: Vec<Arc<dyn PostCollector>> = vec![
        Arc::new(Scripted {
            platform: Platform::SocialApp,
            delay_ms: 0,
            titles: vec!["Beta s1", "Beta s2"],
        }),
        Arc::new(Failing),
        Arc::new(Scripted {
            platform: Platform::WechatSearch,
            delay_ms: 30,
            titles: vec!["Beta w1"],
        }),
    ];

    let posts = collect_all(collectors, &DEFAULT_PLATFORM_PRIORITY).await;
    let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Beta w1", "Beta s1", "Beta s2"]);
}

#[tokio::test]
async fn same_text_across_platforms_keeps_the_higher_priority_copy() {
    let collectors: Vec<Arc<dyn PostCollector>> = vec![
        Arc::new(Scripted {
            platform: Platform::SocialApp,
            delay_ms: 0,
            titles: vec!["Beta launch"],
        }),
        Arc::new(Scripted {
            platform: Platform::WechatSearch,
            delay_ms: 10,
            titles: vec!["Beta launch"],
        }),
    ];
    let posts = collect_all(collectors, &DEFAULT_PLATFORM_PRIORITY).await;
    let now = Utc.with_ymd_and_hms(2026, 1, 10, 1, 0, 0).unwrap();
    let out = TriagePipeline::new(TriageConfig::with_keywords(["Beta"]))
        .unwrap()
        .run(posts, &SeenKeys::new(), now);
    assert_eq!(out.items.len(), 1);
    assert_eq!(out.items[0].platform, Platform::WechatSearch);
}

#[tokio::test]
async fn fixture_collector_reads_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("social.json");
    std::fs::write(
        &path,
        r#"[{"platform":"social-app","title":"Beta 不错","likes":"1.1万",
             "collected_at":"2026-01-10T00:00:00Z","published_at":"3小时前"}]"#,
    )
    .unwrap();

    let arg = format!("social-app={}", path.display());
    let c = FixtureCollector::from_arg(&arg);
    assert_eq!(c.platform(), Platform::SocialApp);
    let posts = c.collect().await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].likes.as_deref(), Some("1.1万"));

    let missing = FixtureCollector::new(Platform::Other, dir.path().join("none.json"));
    assert!(missing.collect().await.is_err());
}
