//! Lexicon polarity scorer for mixed Chinese/English post text.
//!
//! Latin words are tokenized and looked up whole; a negator in the previous
//! 1..=3 tokens flips the sign. CJK runs have no word boundaries, so they are
//! scanned greedily for the longest lexicon term; a negator directly before a
//! term flips it. The summed raw score maps to a polarity in (-1, 1) via
//! `raw / (|raw| + 2)`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::config::SentimentConfig;
use crate::model::{OpinionItem, Sentiment, SentimentLabel};
use crate::normalize::fold_text;

struct Lexicon {
    words: HashMap<String, i32>,
    cjk: HashMap<String, i32>,
    cjk_max_chars: usize,
}

static LEXICON: Lazy<Lexicon> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    let all = serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon");

    let mut words = HashMap::new();
    let mut cjk = HashMap::new();
    for (term, weight) in all {
        let term = fold_text(&term);
        if term.is_ascii() {
            words.insert(term, weight);
        } else {
            cjk.insert(term, weight);
        }
    }
    let cjk_max_chars = cjk.keys().map(|t| t.chars().count()).max().unwrap_or(0);
    Lexicon {
        words,
        cjk,
        cjk_max_chars,
    }
});

/// Two-char negator checked before the single-char ones.
const CJK_NEGATOR_PAIR: [char; 2] = ['没', '有'];
const CJK_NEGATORS: &[char] = &['不', '没', '未', '无', '别', '非'];

#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentScorer {
    thresholds: SentimentConfig,
}

impl SentimentScorer {
    pub fn new(thresholds: SentimentConfig) -> Self {
        Self { thresholds }
    }

    /// Raw lexicon sum and the number of scored terms.
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        let folded = fold_text(text);
        let (w_score, w_hits) = score_words(&folded);
        let (c_score, c_hits) = score_cjk(&folded);
        (w_score + c_score, w_hits + c_hits)
    }

    /// Deterministic label and polarity. Blank text is neutral with score 0.
    pub fn score(&self, text: &str) -> Sentiment {
        if text.trim().is_empty() {
            return Sentiment::neutral();
        }
        let (raw, _) = self.score_text(text);
        let polarity = raw as f32 / (raw.abs() as f32 + 2.0);
        Sentiment {
            label: self.label_for(polarity),
            score: polarity,
        }
    }

    pub fn label_for(&self, polarity: f32) -> SentimentLabel {
        if polarity >= self.thresholds.positive_threshold {
            SentimentLabel::Positive
        } else if polarity <= -self.thresholds.negative_threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn annotate(&self, item: &mut OpinionItem) {
        item.sentiment = Some(self.score(&item.scoring_text()));
    }
}

/// ASCII word tokens, lower-case (input is already folded). Apostrophes stay
/// inside tokens so contractions like "isn't" survive.
fn tokenize(s: &str) -> impl Iterator<Item = &str> + '_ {
    s.split(|c: char| !(c.is_ascii_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "don't"
            | "doesn't"
            | "didn't"
            | "without"
    )
}

fn score_words(folded: &str) -> (i32, usize) {
    let tokens: Vec<&str> = tokenize(folded).collect();
    let mut score = 0;
    let mut hits = 0;
    for i in 0..tokens.len() {
        let base = LEXICON.words.get(tokens[i]).copied().unwrap_or(0);
        if base == 0 {
            continue;
        }
        let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k]));
        score += if negated { -base } else { base };
        hits += 1;
    }
    (score, hits)
}

fn score_cjk(folded: &str) -> (i32, usize) {
    let chars: Vec<char> = folded.chars().collect();
    let lex = &*LEXICON;
    let mut score = 0;
    let mut hits = 0;
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii() {
            i += 1;
            continue;
        }
        let longest = (1..=lex.cjk_max_chars.min(chars.len() - i))
            .rev()
            .find_map(|len| {
                let term: String = chars[i..i + len].iter().collect();
                lex.cjk.get(&term).map(|w| (len, *w))
            });
        match longest {
            Some((len, base)) => {
                score += if cjk_negated(&chars, i) { -base } else { base };
                hits += 1;
                i += len;
            }
            None => i += 1,
        }
    }
    (score, hits)
}

fn cjk_negated(chars: &[char], start: usize) -> bool {
    if start >= 2 && chars[start - 2..start] == CJK_NEGATOR_PAIR {
        return true;
    }
    start >= 1 && CJK_NEGATORS.contains(&chars[start - 1])
}
