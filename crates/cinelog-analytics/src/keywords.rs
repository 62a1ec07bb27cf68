//! Term-frequency keyword ranking over concatenated review text.
//!
//! Weights are scaled so the most frequent term is 100.00 and everything
//! else is proportional, rounded to two decimals. Raw counts back the
//! word-cloud widget. An empty input yields an empty list, never an error.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub word: String,
    /// 0-100 scale, two decimals, relative to the top term.
    pub weight: f64,
}

const MIN_TOKEN_CHARS: usize = 2;
/// Drops unsegmented runs (no-whitespace scripts, URLs pasted into reviews).
const MAX_TOKEN_CHARS: usize = 24;

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "again", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "but",
    "by", "can", "could", "did", "do", "does", "for", "from", "had", "has",
    "have", "he", "her", "here", "him", "his", "how", "i", "if", "in",
    "into", "is", "it", "its", "just", "me", "more", "most", "my", "no",
    "not", "of", "on", "only", "or", "other", "our", "out", "over", "she",
    "so", "some", "such", "than", "that", "the", "their", "them", "then",
    "there", "these", "they", "this", "to", "too", "very", "was", "we",
    "were", "what", "when", "which", "who", "will", "with", "would", "you",
    "your",
];

/// Top `top_n` terms with weights normalized to 0-100.
pub fn extract_keywords(text: &str, top_n: usize) -> Vec<Keyword> {
    let ranked = ranked_terms(text, top_n);
    let Some(max) = ranked.first().map(|(_, count)| *count) else {
        return Vec::new();
    };
    ranked
        .into_iter()
        .map(|(word, count)| Keyword {
            word,
            weight: round2(count as f64 / max as f64 * 100.0),
        })
        .collect()
}

/// Top `top_n` terms with raw occurrence counts, for the word cloud.
pub fn word_counts(text: &str, top_n: usize) -> Vec<(String, u64)> {
    ranked_terms(text, top_n)
}

fn ranked_terms(text: &str, top_n: usize) -> Vec<(String, u64)> {
    let mut frequencies: HashMap<String, u64> = HashMap::new();
    for token in tokenize(text) {
        *frequencies.entry(token).or_insert(0) += 1;
    }
    let mut ranked: Vec<(String, u64)> = frequencies.into_iter().collect();
    // Count descending, then alphabetical so output is deterministic.
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(top_n);
    ranked
}

fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            for folded in ch.to_lowercase() {
                current.push(folded);
            }
        } else if !current.is_empty() {
            push_token(&mut tokens, std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        push_token(&mut tokens, current);
    }
    tokens
}

fn push_token(tokens: &mut Vec<String>, token: String) {
    let chars = token.chars().count();
    if chars < MIN_TOKEN_CHARS || chars > MAX_TOKEN_CHARS {
        return;
    }
    if token.chars().all(|c| c.is_ascii_digit()) {
        return;
    }
    if STOPWORDS.contains(&token.as_str()) {
        return;
    }
    tokens.push(token);
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
