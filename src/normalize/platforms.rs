// src/normalize/platforms.rs
//! Per-platform field quirks: timestamp formats and placeholder authors.
//!
//! Relative times ("3小时前", "昨天") are anchored on the post's `collected_at`,
//! so parsing is deterministic. Dates without a zone are read at UTC+08:00.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc,
};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Platform;

/// Offset used for dates the platforms print without a zone.
pub const SOURCE_UTC_OFFSET_SECS: i32 = 8 * 3600;

pub fn source_offset() -> FixedOffset {
    FixedOffset::east_opt(SOURCE_UTC_OFFSET_SECS).expect("valid +08:00 offset")
}

/// Produces the canonical fields a platform is quirky about.
pub trait PlatformAdapter: Sync {
    fn parse_published(&self, raw: &str, collected_at: DateTime<Utc>) -> Option<DateTime<Utc>>;

    /// Author strings that mean "we don't know".
    fn author_placeholders(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Public search results: relative labels, absolute dates, or an embedded
/// `timeConvert('<unix>')` script call.
struct WechatSearchAdapter;

/// Publisher backend: unix seconds from the API, relative labels in the UI.
struct WechatAuthenticatedAdapter;

/// Social app cards: "编辑于 3天前", "03-15 上海", and a generic user name
/// when the author is hidden.
struct SocialAppAdapter;

struct GenericAdapter;

impl PlatformAdapter for WechatSearchAdapter {
    fn parse_published(&self, raw: &str, collected_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        parse_rfc3339(raw)
            .or_else(|| parse_relative(raw, collected_at))
            .or_else(|| parse_embedded_unix(raw))
            .or_else(|| parse_absolute(raw, collected_at))
    }
}

impl PlatformAdapter for WechatAuthenticatedAdapter {
    fn parse_published(&self, raw: &str, collected_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        parse_unix(raw)
            .or_else(|| parse_rfc3339(raw))
            .or_else(|| parse_relative(raw, collected_at))
            .or_else(|| parse_absolute(raw, collected_at))
    }
}

impl PlatformAdapter for SocialAppAdapter {
    fn parse_published(&self, raw: &str, collected_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let s = raw
            .trim_start_matches("编辑于")
            .trim_start_matches("发布于")
            .trim();
        parse_rfc3339(s)
            .or_else(|| parse_relative(s, collected_at))
            .or_else(|| parse_absolute(s, collected_at))
    }

    fn author_placeholders(&self) -> &'static [&'static str] {
        &["小红书用户", "用户"]
    }
}

impl PlatformAdapter for GenericAdapter {
    fn parse_published(&self, raw: &str, collected_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        parse_rfc3339(raw)
            .or_else(|| parse_unix(raw))
            .or_else(|| parse_absolute(raw, collected_at))
            .or_else(|| parse_relative(raw, collected_at))
    }
}

pub fn adapter_for(platform: Platform) -> &'static dyn PlatformAdapter {
    match platform {
        Platform::WechatSearch => &WechatSearchAdapter,
        Platform::WechatAuthenticated => &WechatAuthenticatedAdapter,
        Platform::SocialApp => &SocialAppAdapter,
        Platform::Other => &GenericAdapter,
    }
}

/* ----------------------------
Shared format parsers
---------------------------- */

pub fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Whole string is a unix timestamp: 10 digits = seconds, 13 = milliseconds.
pub fn parse_unix(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let n: i64 = s.parse().ok()?;
    match s.len() {
        10 => Utc.timestamp_opt(n, 0).single(),
        13 => Utc.timestamp_millis_opt(n).single(),
        _ => None,
    }
}

static RE_EMBEDDED_UNIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{13}|\d{10})\b").expect("embedded unix regex"));

fn parse_embedded_unix(s: &str) -> Option<DateTime<Utc>> {
    RE_EMBEDDED_UNIX
        .captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_unix(m.as_str()))
}

static RE_FULL_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{4})\s*[年/.\-]\s*(\d{1,2})\s*[月/.\-]\s*(\d{1,2})\s*日?(?:\s*(\d{1,2}):(\d{2})(?::(\d{2}))?)?")
        .expect("full date regex")
});

static RE_MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2})\s*[月\-/]\s*(\d{1,2})\s*日?(?:\s*(\d{1,2}):(\d{2}))?")
        .expect("month-day regex")
});

/// Absolute dates, with or without a year, read at UTC+08:00.
/// A year-less date that would land after `collected_at` belongs to last year.
pub fn parse_absolute(s: &str, collected_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if let Some(c) = RE_FULL_DATE.captures(s) {
        let y: i32 = c.get(1)?.as_str().parse().ok()?;
        let m: u32 = c.get(2)?.as_str().parse().ok()?;
        let d: u32 = c.get(3)?.as_str().parse().ok()?;
        let time = capture_time(c.get(4), c.get(5), c.get(6))?;
        return local_to_utc(NaiveDate::from_ymd_opt(y, m, d)?, time);
    }

    let c = RE_MONTH_DAY.captures(s)?;
    let m: u32 = c.get(1)?.as_str().parse().ok()?;
    let d: u32 = c.get(2)?.as_str().parse().ok()?;
    let time = capture_time(c.get(3), c.get(4), None)?;
    let year = collected_at.with_timezone(&source_offset()).year();

    // 02-29 has no current-year date outside leap years; fall through to last year.
    let this_year = NaiveDate::from_ymd_opt(year, m, d).and_then(|date| local_to_utc(date, time));
    match this_year {
        Some(ts) if ts <= collected_at => Some(ts),
        _ => local_to_utc(NaiveDate::from_ymd_opt(year - 1, m, d)?, time),
    }
}

fn capture_time(
    h: Option<regex::Match<'_>>,
    m: Option<regex::Match<'_>>,
    s: Option<regex::Match<'_>>,
) -> Option<NaiveTime> {
    let num = |x: Option<regex::Match<'_>>| -> Option<u32> {
        match x {
            Some(v) => v.as_str().parse().ok(),
            None => Some(0),
        }
    };
    NaiveTime::from_hms_opt(num(h)?, num(m)?, num(s)?)
}

fn local_to_utc(date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    match source_offset().from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        _ => None,
    }
}

static RE_REL_ZH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(秒|分钟|小时|天|周)前").expect("relative zh regex"));

static RE_REL_EN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(second|sec|minute|min|hour|hr|day|week)s?\s+ago")
        .expect("relative en regex")
});

static RE_CLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("clock regex"));

/// Relative labels anchored on `collected_at`.
pub fn parse_relative(s: &str, collected_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lower = s.to_lowercase();
    if s.contains("刚刚") || s.contains("刚发布") || lower.contains("just now") {
        return Some(collected_at);
    }

    if let Some(c) = RE_REL_ZH.captures(s) {
        let n: i64 = c.get(1)?.as_str().parse().ok()?;
        let unit = match c.get(2)?.as_str() {
            "秒" => 1,
            "分钟" => 60,
            "小时" => 3_600,
            "天" => 86_400,
            _ => 7 * 86_400,
        };
        return go_back(collected_at, n, unit);
    }

    if let Some(c) = RE_REL_EN.captures(&lower) {
        let n: i64 = c.get(1)?.as_str().parse().ok()?;
        let unit = match c.get(2)?.as_str() {
            "second" | "sec" => 1,
            "minute" | "min" => 60,
            "hour" | "hr" => 3_600,
            "day" => 86_400,
            _ => 7 * 86_400,
        };
        return go_back(collected_at, n, unit);
    }

    let days_back = if s.contains("前天") {
        2
    } else if s.contains("昨天") || lower.contains("yesterday") {
        1
    } else if s.contains("今天") || lower.contains("today") {
        0
    } else {
        return None;
    };

    // "昨天 12:30" pins the clock time on that local day.
    match RE_CLOCK.captures(s) {
        Some(c) => {
            let h: u32 = c.get(1)?.as_str().parse().ok()?;
            let m: u32 = c.get(2)?.as_str().parse().ok()?;
            let day = collected_at.with_timezone(&source_offset()).date_naive()
                - Duration::days(days_back);
            local_to_utc(day, NaiveTime::from_hms_opt(h, m, 0)?)
        }
        None => go_back(collected_at, days_back, 86_400),
    }
}

fn go_back(from: DateTime<Utc>, n: i64, unit_secs: i64) -> Option<DateTime<Utc>> {
    let secs = n.checked_mul(unit_secs)?;
    from.checked_sub_signed(Duration::try_seconds(secs)?)
}

/// Engagement counters as platforms print them: "1.2万", "3w", "1,024", "10+".
/// Unparsable input yields 0.
pub fn parse_count(s: &str) -> u64 {
    let t = s.trim().to_lowercase();
    if t.is_empty() {
        return 0;
    }
    let multiplier = if t.contains('亿') {
        100_000_000.0
    } else if t.contains('万') || t.ends_with('w') {
        10_000.0
    } else if t.ends_with('k') {
        1_000.0
    } else {
        1.0
    };
    let digits: String = t
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    match digits.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => (v * multiplier).round() as u64,
        _ => 0,
    }
}
