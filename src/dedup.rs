// src/dedup.rs
//! Content signatures and first-occurrence deduplication.
//!
//! A post with a URL is keyed by its normalized URL only (scheme, `www.`,
//! fragment, trailing slash and tracking parameters removed; remaining query
//! pairs sorted). A post without a URL is keyed by its case-folded title plus
//! the first `body_prefix_chars` characters of its folded body. The prefix
//! length trades recall (short prefix catches reposts with edited tails) for
//! precision (templated posts share long openings), so it is configurable.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashSet};
use url::{form_urlencoded, Url};

use crate::config::DedupConfig;
use crate::model::OpinionItem;
use crate::normalize::fold_text;

/// Lowercase hex of the first `bytes` bytes of SHA-256(`text`).
pub(crate) fn digest_hex(text: &str, bytes: usize) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(bytes * 2);
    for b in digest.iter().take(bytes) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Short id for log lines; raw post text is never logged.
pub(crate) fn anon_id(text: &str) -> String {
    digest_hex(text, 6)
}

/// Derives `dedup_key`s. Cheap to clone.
#[derive(Debug, Clone)]
pub struct KeyDeriver {
    body_prefix_chars: usize,
    tracking_params: HashSet<String>,
}

impl KeyDeriver {
    pub fn new(cfg: &DedupConfig) -> Self {
        Self {
            body_prefix_chars: cfg.body_prefix_chars,
            tracking_params: cfg
                .tracking_params
                .iter()
                .map(|p| p.trim().to_ascii_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn key_for(&self, url: &str, title: &str, body: &str) -> String {
        let norm = self.normalize_url(url);
        if !norm.is_empty() {
            return format!("url:{}", digest_hex(&norm, 16));
        }
        let prefix: String = fold_text(body)
            .chars()
            .take(self.body_prefix_chars)
            .collect();
        let signature = format!("{}|{}", fold_text(title), prefix);
        format!("txt:{}", digest_hex(&signature, 16))
    }

    fn is_tracking(&self, param: &str) -> bool {
        let p = param.to_ascii_lowercase();
        p.starts_with("utm_") || self.tracking_params.contains(&p)
    }

    /// Scheme-less canonical form; empty input stays empty.
    pub fn normalize_url(&self, raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return String::new();
        }

        let parsed = Url::parse(raw)
            .ok()
            .filter(|u| u.host_str().is_some())
            .or_else(|| Url::parse(&format!("http://{raw}")).ok());
        let Some(url) = parsed.filter(|u| u.host_str().is_some()) else {
            return fold_text(raw).trim_end_matches('/').to_string();
        };

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);

        let mut out = String::from(host);
        if let Some(port) = url.port() {
            out.push_str(&format!(":{port}"));
        }
        out.push_str(url.path().trim_end_matches('/'));

        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| !self.is_tracking(k))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        if !pairs.is_empty() {
            pairs.sort();
            // Re-encode after decoding so `%26` inside a value stays distinct from `&`.
            let enc = |s: &str| form_urlencoded::byte_serialize(s.as_bytes()).collect::<String>();
            let query = pairs
                .iter()
                .map(|(k, v)| {
                    if v.is_empty() {
                        enc(k)
                    } else {
                        format!("{}={}", enc(k), enc(v))
                    }
                })
                .collect::<Vec<_>>()
                .join("&");
            out.push('?');
            out.push_str(&query);
        }
        out
    }
}

/// Keys persisted by the storage collaborator for cross-run dedup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeenKeys(BTreeSet<String>);

impl SeenKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.0.insert(key.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for SeenKeys {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for SeenKeys {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

/// Running seen-set for one batch, checked against keys from earlier runs.
#[derive(Debug)]
pub struct Deduplicator<'a> {
    previous: Option<&'a SeenKeys>,
    batch: HashSet<String>,
}

impl<'a> Deduplicator<'a> {
    pub fn new(previous: Option<&'a SeenKeys>) -> Self {
        Self {
            previous,
            batch: HashSet::new(),
        }
    }

    /// True the first time a key is offered (and it is not a previous-run key).
    pub fn admit(&mut self, key: &str) -> bool {
        if self.previous.is_some_and(|p| p.contains(key)) {
            return false;
        }
        self.batch.insert(key.to_string())
    }

    /// Splits `items` into (kept, duplicates), both in input order.
    pub fn partition(
        &mut self,
        items: Vec<OpinionItem>,
    ) -> (Vec<OpinionItem>, Vec<OpinionItem>) {
        let mut kept = Vec::with_capacity(items.len());
        let mut dropped = Vec::new();
        for item in items {
            if self.admit(&item.dedup_key) {
                kept.push(item);
            } else {
                dropped.push(item);
            }
        }
        (kept, dropped)
    }
}

/// Order-preserving dedup; the first occurrence of each key wins.
pub fn deduplicate(items: Vec<OpinionItem>, previous: Option<&SeenKeys>) -> Vec<OpinionItem> {
    Deduplicator::new(previous).partition(items).0
}
