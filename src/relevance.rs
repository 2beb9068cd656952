// src/relevance.rs
//! Relevance gate: two-level keyword matching.
//!
//! A primary keyword matches when it occurs in the title or body. If the
//! keyword has association terms configured, the match only counts when at
//! least one of them also occurs in the post. Each field (title, body, and
//! the author when `search_author` is on) is searched on its own, so a term
//! never matches across a field boundary. Comparison is on `fold_text`
//! output, so case and full-width variants compare equal, keyword spellings
//! in `associations` included.

use std::collections::BTreeSet;
use tracing::debug;

use crate::config::TriageConfig;
use crate::dedup::anon_id;
use crate::error::TriageError;
use crate::model::OpinionItem;
use crate::normalize::fold_text;

/// Outcome of matching one post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relevance {
    /// Configured keyword spellings that matched.
    pub matched: BTreeSet<String>,
    /// Keywords present in the text whose association check failed.
    pub unassociated: BTreeSet<String>,
}

impl Relevance {
    pub fn is_relevant(&self) -> bool {
        !self.matched.is_empty()
    }
}

#[derive(Debug, Clone)]
struct KeywordRule {
    keyword: String,
    folded: String,
    associations: Vec<String>,
}

/// Compiled keyword/association table.
#[derive(Debug, Clone)]
pub struct RelevanceMatcher {
    rules: Vec<KeywordRule>,
    search_author: bool,
}

impl RelevanceMatcher {
    /// Validates the keyword part of `cfg` and folds every term once.
    pub fn from_config(cfg: &TriageConfig) -> Result<Self, TriageError> {
        cfg.validate()?;

        let mut rules: Vec<KeywordRule> = Vec::with_capacity(cfg.keywords.len());
        for kw in &cfg.keywords {
            let keyword = kw.trim().to_string();
            let folded = fold_text(&keyword);
            if rules.iter().any(|r| r.folded == folded) {
                continue;
            }
            let associations = cfg
                .associations
                .iter()
                .filter(|(k, _)| fold_text(k) == folded)
                .flat_map(|(_, terms)| terms.iter().map(|t| fold_text(t)))
                .collect();
            rules.push(KeywordRule {
                keyword,
                folded,
                associations,
            });
        }

        Ok(Self {
            rules,
            search_author: cfg.search_author,
        })
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.keyword.as_str())
    }

    pub fn evaluate(&self, title: &str, body: &str, author: &str) -> Relevance {
        let title = fold_text(title);
        let body = fold_text(body);
        let author = if self.search_author {
            fold_text(author)
        } else {
            String::new()
        };
        let fields = [title.as_str(), body.as_str(), author.as_str()];

        let mut rel = Relevance::default();
        for rule in &self.rules {
            if !(title.contains(&rule.folded) || body.contains(&rule.folded)) {
                continue;
            }
            let associated = rule.associations.is_empty()
                || rule
                    .associations
                    .iter()
                    .any(|t| fields.iter().any(|f| f.contains(t.as_str())));
            if associated {
                rel.matched.insert(rule.keyword.clone());
            } else {
                rel.unassociated.insert(rule.keyword.clone());
            }
        }
        rel
    }

    /// Sets `matched_keywords` and `is_relevant` on `item`.
    pub fn annotate(&self, item: &mut OpinionItem) {
        let rel = self.evaluate(&item.title, &item.body, &item.author);
        item.is_relevant = rel.is_relevant();

        // Never log raw text. Only the key-derived id and keyword lists.
        debug!(
            target: "triage",
            id = %anon_id(&item.dedup_key),
            relevant = item.is_relevant,
            matched = ?truncate_vec(&rel.matched, 5),
            unassociated = ?truncate_vec(&rel.unassociated, 5),
            "relevance"
        );

        item.matched_keywords = rel.matched;
    }
}

pub(crate) fn truncate_vec<'a, T, I>(v: I, max: usize) -> Vec<String>
where
    T: ToString + 'a,
    I: IntoIterator<Item = &'a T>,
{
    v.into_iter().take(max).map(|x| x.to_string()).collect()
}
