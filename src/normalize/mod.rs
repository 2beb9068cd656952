// src/normalize/mod.rs
//! Normalizer: turns a collector's `RawPost` into a canonical `OpinionItem`.
//! Never fails; anything unusable becomes a sentinel.

pub mod platforms;

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::dedup::KeyDeriver;
use crate::model::{Engagement, OpinionItem, RawPost, UNKNOWN_AUTHOR};
use crate::normalize::platforms::{adapter_for, parse_count};

/// Stored text is capped at this many chars.
pub const MAX_TEXT_CHARS: usize = 5_000;

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Decode entities, strip tags, fold typographic quotes, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags (search results wrap hits in <em>)
    out = RE_TAGS.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace (includes NBSP and the ideographic space)
    out = RE_WS.replace_all(&out, " ").trim().to_string();

    // 5) Length cap
    if out.chars().count() > MAX_TEXT_CHARS {
        out = out.chars().take(MAX_TEXT_CHARS).collect();
    }

    out
}

/// Matching form of a text: Unicode lowercase, full-width ASCII folded to
/// half-width, whitespace collapsed to single spaces.
pub fn fold_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_space = true;
    for ch in s.chars() {
        let ch = fold_width(ch);
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            out.extend(ch.to_lowercase());
            last_space = false;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

fn fold_width(ch: char) -> char {
    match ch {
        '\u{3000}' => ' ',
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(ch as u32 - 0xFEE0).unwrap_or(ch),
        _ => ch,
    }
}

/// Builds `OpinionItem`s. Holds the key derivation so every item leaves the
/// Normalizer with its signature already set.
#[derive(Debug, Clone)]
pub struct Normalizer {
    keys: KeyDeriver,
}

impl Normalizer {
    pub fn new(keys: KeyDeriver) -> Self {
        Self { keys }
    }

    pub fn normalize(&self, raw: RawPost) -> OpinionItem {
        let adapter = adapter_for(raw.platform);

        let url = html_escape::decode_html_entities(raw.url.trim()).trim().to_string();
        let title = normalize_text(&raw.title);
        let body = normalize_text(&raw.body);

        let author = normalize_text(&raw.author);
        let author = if author.is_empty() || adapter.author_placeholders().contains(&author.as_str())
        {
            UNKNOWN_AUTHOR.to_string()
        } else {
            author
        };

        let published_at = raw
            .published_at
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| adapter.parse_published(s, raw.collected_at));

        let engagement = Engagement {
            likes: raw.likes.as_deref().map(parse_count).unwrap_or(0),
            comments: raw.comments.as_deref().map(parse_count).unwrap_or(0),
            shares: raw.shares.as_deref().map(parse_count).unwrap_or(0),
        };

        let dedup_key = self.keys.key_for(&url, &title, &body);

        OpinionItem {
            platform: raw.platform,
            url,
            title,
            body,
            author,
            published_at,
            collected_at: raw.collected_at,
            engagement,
            dedup_key,
            matched_keywords: BTreeSet::new(),
            is_relevant: false,
            is_in_time_window: false,
            sentiment: None,
        }
    }
}
