// tests/time_window.rs
use chrono::{DateTime, Duration, TimeZone, Utc};
use opinion_triage::model::{OpinionItem, Platform, RawPost};
use opinion_triage::window::TimeWindow;
use opinion_triage::{SeenKeys, TriageConfig, TriagePipeline};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap()
}

fn normalized(collected: DateTime<Utc>, published: Option<&str>) -> OpinionItem {
    let p = TriagePipeline::new(TriageConfig::with_keywords(["Beta"])).unwrap();
    let mut raw = RawPost::new(Platform::Other, collected);
    raw.title = "Beta".into();
    raw.published_at = published.map(String::from);
    p.normalizer().normalize(raw)
}

#[test]
fn forty_seven_passes_forty_nine_fails() {
    let w = TimeWindow::hours(48).unwrap();
    let h47 = (now() - Duration::hours(47)).to_rfc3339();
    let h49 = (now() - Duration::hours(49)).to_rfc3339();
    assert!(w.contains(&normalized(now(), Some(&h47)), now()));
    assert!(!w.contains(&normalized(now(), Some(&h49)), now()));
}

#[test]
fn missing_publish_time_falls_back_to_collection() {
    let w = TimeWindow::hours(48).unwrap();
    let recent = normalized(now() - Duration::hours(1), None);
    let old = normalized(now() - Duration::hours(72), None);
    let garbled = normalized(now() - Duration::hours(72), Some("some day"));
    assert!(recent.published_at.is_none());
    assert!(w.contains(&recent, now()));
    assert!(!w.contains(&old, now()));
    assert!(!w.contains(&garbled, now()));
}

#[test]
fn future_timestamps_pass() {
    let w = TimeWindow::hours(48).unwrap();
    let ahead = (now() + Duration::hours(5)).to_rfc3339();
    assert!(w.contains(&normalized(now(), Some(&ahead)), now()));
}

#[test]
fn relative_times_anchor_on_collection() {
    // "3天前" seen two days ago is five days old now.
    let w = TimeWindow::hours(48).unwrap();
    let mut raw = RawPost::new(Platform::SocialApp, now() - Duration::days(2));
    raw.title = "Beta".into();
    raw.published_at = Some("3天前".into());

    let out = TriagePipeline::new(TriageConfig::with_keywords(["Beta"]))
        .unwrap()
        .run(vec![raw], &SeenKeys::new(), now());
    assert!(out.items.is_empty());
    assert_eq!(out.counts.stale, 1);
    let dropped = &out.rejected[0].item;
    assert_eq!(dropped.published_at, Some(now() - Duration::days(5)));
    assert!(!w.contains(dropped, now()));
}
