// tests/normalize_platforms.rs
use chrono::{DateTime, Duration, TimeZone, Utc};
use opinion_triage::config::DedupConfig;
use opinion_triage::dedup::KeyDeriver;
use opinion_triage::model::{Platform, RawPost, UNKNOWN_AUTHOR};
use opinion_triage::normalize::Normalizer;

fn collected() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).unwrap()
}

fn normalizer() -> Normalizer {
    Normalizer::new(KeyDeriver::new(&DedupConfig::default()))
}

#[test]
fn search_result_markup_is_cleaned() {
    let mut raw = RawPost::new(Platform::WechatSearch, collected());
    raw.title = "  <em>小米</em>&nbsp;SU7 &amp; 手机 ".into();
    raw.body = "第一行\n\n第二行\u{3000}结束".into();
    raw.author = "  科技日报 ".into();
    raw.published_at = Some("2小时前".into());

    let it = normalizer().normalize(raw);
    assert_eq!(it.title, "小米 SU7 & 手机");
    assert_eq!(it.body, "第一行 第二行 结束");
    assert_eq!(it.author, "科技日报");
    assert_eq!(it.published_at, Some(collected() - Duration::hours(2)));
}

#[test]
fn authenticated_backend_unix_seconds() {
    let mut raw = RawPost::new(Platform::WechatAuthenticated, collected());
    raw.published_at = Some("1768003200".into());
    let it = normalizer().normalize(raw);
    assert_eq!(
        it.published_at,
        Some(Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap())
    );
}

#[test]
fn social_app_placeholders_and_counts() {
    let mut raw = RawPost::new(Platform::SocialApp, collected());
    raw.author = "小红书用户".into();
    raw.published_at = Some("编辑于 昨天 21:15".into());
    raw.likes = Some("2.5万".into());
    raw.comments = Some("356".into());
    raw.shares = Some("分享".into());

    let it = normalizer().normalize(raw);
    assert_eq!(it.author, UNKNOWN_AUTHOR);
    // 2026-01-09 21:15 at +08:00
    assert_eq!(
        it.published_at,
        Some(Utc.with_ymd_and_hms(2026, 1, 9, 13, 15, 0).unwrap())
    );
    assert_eq!(it.engagement.likes, 25_000);
    assert_eq!(it.engagement.comments, 356);
    assert_eq!(it.engagement.shares, 0);
}

#[test]
fn empty_post_becomes_sentinels_not_an_error() {
    let it = normalizer().normalize(RawPost::new(Platform::Other, collected()));
    assert!(it.url.is_empty() && it.title.is_empty() && it.body.is_empty());
    assert_eq!(it.author, UNKNOWN_AUTHOR);
    assert_eq!(it.published_at, None);
    assert_eq!(it.effective_timestamp(), collected());
    assert!(it.matched_keywords.is_empty());
    assert!(!it.is_relevant && !it.is_in_time_window);
}

#[test]
fn unknown_platform_name_deserializes_to_other() {
    let raw: RawPost = serde_json::from_str(
        r#"{"platform":"video-site","title":"x","collected_at":"2026-01-10T08:00:00Z",
            "published_at":"2026-01-09T10:00:00+08:00"}"#,
    )
    .unwrap();
    assert_eq!(raw.platform, Platform::Other);
    let it = normalizer().normalize(raw);
    assert_eq!(
        it.published_at,
        Some(Utc.with_ymd_and_hms(2026, 1, 9, 2, 0, 0).unwrap())
    );
}
