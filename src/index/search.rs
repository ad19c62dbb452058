//! Component F: tiered, deterministic relevance scoring.
//!
//! Candidates are scored by tier; within a tier, higher scores win; ties are
//! broken by `(-usage_count, file, line)` for stable output (spec §4.F).
//! Grounded on the tiered/boundary-bonus shape of `crates/core/src/fuzzy.rs`,
//! reworked from fzf-style dynamic-programming scoring into the spec's fixed
//! five-tier formula.

use crate::index::normalize::{abbreviation_variants, fold, VERB_PREFIXES};
use crate::model::Definition;

/// Score `term` against `query` using Tiers 1-4 (case-fold exact, case-style
/// variation, word-boundary, substring). Returns `None` if `query` doesn't
/// occur in `term` at all.
pub fn score_term(term: &str, query: &str) -> Option<f64> {
    if query.is_empty() {
        return None;
    }

    let folded_term = fold(term);
    let folded_query = fold(query);

    if folded_term == folded_query {
        return Some(if term == query { 1.00 } else { 0.95 });
    }

    if case_style_variation(term, query) {
        return Some(0.95);
    }

    let term_chars: Vec<char> = term.chars().collect();
    let query_chars: Vec<char> = query.chars().collect();
    let positions = find_all_case_insensitive(&term_chars, &query_chars);
    if positions.is_empty() {
        return None;
    }

    if folded_term.starts_with(&folded_query) {
        return Some(0.85);
    }
    if folded_term.ends_with(&folded_query) {
        return Some(0.80);
    }
    if positions.iter().any(|&pos| is_word_boundary(&term_chars, pos)) {
        return Some(0.75);
    }

    let ratio = query_chars.len() as f64 / term_chars.len() as f64;
    Some(0.60 * ratio)
}

/// Score `term` against `query`, additionally trying the query's fixed
/// abbreviation-table expansions at Tier 5 (capped at 0.50) when the direct
/// Tiers 1-4 score is `None`.
pub fn score_with_expansions(term: &str, query: &str) -> Option<f64> {
    if let Some(score) = score_term(term, query) {
        return Some(score);
    }
    for variant in abbreviation_variants(query) {
        if score_term(term, variant).is_some() {
            return Some(0.50);
        }
    }
    None
}

/// Two identifiers are a "case-style variation" of each other when their
/// camel/snake/kebab word-part sequences match even though their case-folded
/// strings don't (e.g. `auth_token` vs `authToken`). This is the crate's
/// resolution of the spec's Tier-2 "original-case variation match" — see
/// DESIGN.md decision #3.
fn case_style_variation(term: &str, query: &str) -> bool {
    let term_words = word_sequence(term);
    let query_words = word_sequence(query);
    !term_words.is_empty() && term_words == query_words
}

fn word_sequence(s: &str) -> Vec<String> {
    s.split(|c: char| c == '_' || c == '-' || c == '.' || c == '/')
        .flat_map(split_camel_words)
        .map(|w| w.to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

fn split_camel_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 {
            let prev = chars[i - 1];
            if prev.is_lowercase() && c.is_uppercase() {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn find_all_case_insensitive(haystack: &[char], needle: &[char]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }
    let mut hits = Vec::new();
    for start in 0..=(haystack.len() - needle.len()) {
        let window = &haystack[start..start + needle.len()];
        if window
            .iter()
            .zip(needle.iter())
            .all(|(a, b)| a.to_ascii_lowercase() == b.to_ascii_lowercase())
        {
            hits.push(start);
        }
    }
    hits
}

/// A position is a word boundary when preceded by a delimiter, a case
/// transition, or a recognized verb prefix (spec Glossary "Word boundary").
fn is_word_boundary(term_chars: &[char], pos: usize) -> bool {
    if pos == 0 {
        return true;
    }
    let prev = term_chars[pos - 1];
    let curr = term_chars[pos];
    if matches!(prev, '_' | '-' | '.' | '/') {
        return true;
    }
    if prev.is_lowercase() && curr.is_uppercase() {
        return true;
    }
    let prefix: String = term_chars[..pos].iter().collect::<String>().to_lowercase();
    VERB_PREFIXES.iter().any(|v| prefix == *v)
}

/// A matched definition, carrying its relevance score, total usage, and a
/// capped sample of its reference sites.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub definition: Definition,
    pub score: f64,
    pub usage_count: usize,
    pub sample_usages: Vec<crate::model::CrossReference>,
}

/// Stable ordering for search results: tier score descending, then
/// `(-usage_count, file, line)` ascending (spec §4.F).
pub fn compare_results(a: &SearchResult, b: &SearchResult) -> std::cmp::Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| b.usage_count.cmp(&a.usage_count))
        .then_with(|| a.definition.location.file.cmp(&b.definition.location.file))
        .then_with(|| a.definition.location.line.cmp(&b.definition.location.line))
}
