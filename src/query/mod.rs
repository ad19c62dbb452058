//! Component G: pattern algebra and query orchestration.
//!
//! Parses `a|b`/`a&b`/`!a`/`/regex/` into an expression tree and evaluates it
//! against a [`SemanticIndex`], then applies sort mode and `max_results`.
//! Grounded on `server/src/api.rs`'s small hand-rolled filter-expression
//! parsers (same recursive-descent-over-delimiters shape), generalized to
//! the spec's NOT > AND > OR precedence and set semantics.

use std::collections::BTreeMap;

use crate::error::{IndexError, Result};
use crate::groups::GroupRegistry;
use crate::index::search::{compare_results, SearchResult};
use crate::index::{SearchOptions, SemanticIndex};

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Term(String),
    Regex(String),
    Group(String),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Relevance,
    Usage,
    Name,
    File,
}

impl SortMode {
    pub fn parse(s: &str) -> Option<SortMode> {
        match s {
            "relevance" => Some(SortMode::Relevance),
            "usage" => Some(SortMode::Usage),
            "name" => Some(SortMode::Name),
            "file" => Some(SortMode::File),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub search: SearchOptions,
    pub sort: SortMode,
    pub max_results: Option<usize>,
}

/// Parse and evaluate `query` against `index`, applying `options.sort` and
/// `options.max_results` after combination (spec §4.G).
pub fn evaluate(
    index: &SemanticIndex,
    groups: &GroupRegistry,
    query: &str,
    options: &QueryOptions,
) -> Result<Vec<SearchResult>> {
    let expr = parse(query)?;
    // Leaf searches run without a per-leaf cap so AND/OR/NOT see full
    // candidate sets; the cap is applied once, after combination.
    let leaf_options = SearchOptions { max_results: None, ..options.search.clone() };

    let mut universe_leaves = Vec::new();
    collect_positive_leaves(&expr, &mut universe_leaves);
    let mut universe: BTreeMap<Key, SearchResult> = BTreeMap::new();
    for leaf in &universe_leaves {
        merge_into(&mut universe, eval_leaf(index, groups, leaf, &leaf_options)?);
    }

    let combined = eval(index, groups, &expr, &universe, &leaf_options)?;
    let mut results: Vec<SearchResult> = combined.into_values().collect();

    sort_results(&mut results, options.sort);
    if let Some(max) = options.max_results {
        results.truncate(max);
    }
    Ok(results)
}

/// `(file, line)` identity used for set combination, per spec §4.G ("AND
/// intersects result sets by `(file,line)`").
type Key = (String, usize);

fn key_of(r: &SearchResult) -> Key {
    (r.definition.location.file.clone(), r.definition.location.line)
}

fn merge_into(map: &mut BTreeMap<Key, SearchResult>, results: Vec<SearchResult>) {
    for r in results {
        let key = key_of(&r);
        match map.get(&key) {
            Some(existing) if existing.score >= r.score => {}
            _ => {
                map.insert(key, r);
            }
        }
    }
}

fn eval_leaf(
    index: &SemanticIndex,
    groups: &GroupRegistry,
    leaf: &Expr,
    options: &SearchOptions,
) -> Result<Vec<SearchResult>> {
    match leaf {
        Expr::Term(term) => index.search(term, options),
        Expr::Regex(pattern) => {
            index.search(pattern, &SearchOptions { regex: true, ..options.clone() })
        }
        Expr::Group(name) => {
            let terms = groups
                .terms_for(name)
                .ok_or_else(|| IndexError::query(format!("unknown concept group {name:?}")))?;
            index.search_group(terms, options)
        }
        Expr::And(_) | Expr::Or(_) | Expr::Not(_) => {
            unreachable!("eval_leaf called on a non-leaf expression")
        }
    }
}

fn eval(
    index: &SemanticIndex,
    groups: &GroupRegistry,
    expr: &Expr,
    universe: &BTreeMap<Key, SearchResult>,
    options: &SearchOptions,
) -> Result<BTreeMap<Key, SearchResult>> {
    match expr {
        Expr::Term(_) | Expr::Regex(_) | Expr::Group(_) => {
            let mut map = BTreeMap::new();
            merge_into(&mut map, eval_leaf(index, groups, expr, options)?);
            Ok(map)
        }
        Expr::Not(inner) => {
            let excluded = eval(index, groups, inner, universe, options)?;
            let mut remaining = universe.clone();
            for key in excluded.keys() {
                remaining.remove(key);
            }
            Ok(remaining)
        }
        Expr::And(parts) => {
            let mut evaluated = Vec::with_capacity(parts.len());
            for part in parts {
                evaluated.push(eval(index, groups, part, universe, options)?);
            }
            let mut common: Option<BTreeMap<Key, SearchResult>> = None;
            for branch in evaluated {
                common = Some(match common {
                    None => branch,
                    Some(acc) => intersect(acc, branch),
                });
            }
            Ok(common.unwrap_or_default())
        }
        Expr::Or(parts) => {
            let mut merged = BTreeMap::new();
            for part in parts {
                let branch = eval(index, groups, part, universe, options)?;
                for (key, result) in branch {
                    match merged.get(&key) {
                        Some(existing) if result.score <= score_of(existing) => {}
                        _ => {
                            merged.insert(key, result);
                        }
                    }
                }
            }
            Ok(merged)
        }
    }
}

fn score_of(r: &SearchResult) -> f64 {
    r.score
}

fn intersect(a: BTreeMap<Key, SearchResult>, b: BTreeMap<Key, SearchResult>) -> BTreeMap<Key, SearchResult> {
    a.into_iter()
        .filter_map(|(key, result)| {
            b.get(&key).map(|other| {
                let best = if other.score > result.score { other.clone() } else { result };
                (key, best)
            })
        })
        .collect()
}

fn collect_positive_leaves(expr: &Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Term(_) | Expr::Regex(_) | Expr::Group(_) => out.push(expr.clone()),
        Expr::And(parts) | Expr::Or(parts) => {
            for part in parts {
                collect_positive_leaves(part, out);
            }
        }
        Expr::Not(_) => {}
    }
}

pub fn sort_results(results: &mut [SearchResult], mode: SortMode) {
    match mode {
        SortMode::Relevance => results.sort_by(compare_results),
        SortMode::Usage => results.sort_by(|a, b| {
            b.usage_count
                .cmp(&a.usage_count)
                .then_with(|| a.definition.location.file.cmp(&b.definition.location.file))
                .then_with(|| a.definition.location.line.cmp(&b.definition.location.line))
        }),
        SortMode::Name => results.sort_by(|a, b| {
            a.definition
                .term
                .to_lowercase()
                .cmp(&b.definition.term.to_lowercase())
        }),
        SortMode::File => results.sort_by(|a, b| {
            a.definition
                .location
                .file
                .cmp(&b.definition.location.file)
                .then_with(|| a.definition.location.line.cmp(&b.definition.location.line))
        }),
    }
}

fn parse(query: &str) -> Result<Expr> {
    parse_or(query.trim())
}

fn parse_or(s: &str) -> Result<Expr> {
    let parts = split_top_level(s, '|');
    if parts.len() == 1 {
        parse_and(parts[0])
    } else {
        Ok(Expr::Or(parts.into_iter().map(parse_and).collect::<Result<_>>()?))
    }
}

fn parse_and(s: &str) -> Result<Expr> {
    let parts = split_top_level(s, '&');
    if parts.len() == 1 {
        parse_not(parts[0])
    } else {
        Ok(Expr::And(parts.into_iter().map(parse_not).collect::<Result<_>>()?))
    }
}

fn parse_not(s: &str) -> Result<Expr> {
    let s = s.trim();
    match s.strip_prefix('!') {
        Some(rest) => Ok(Expr::Not(Box::new(parse_not(rest)?))),
        None => parse_leaf(s),
    }
}

fn parse_leaf(s: &str) -> Result<Expr> {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('/') && s.ends_with('/') {
        Ok(Expr::Regex(s[1..s.len() - 1].to_string()))
    } else if let Some(name) = s.strip_prefix("group:") {
        Ok(Expr::Group(name.to_string()))
    } else if s.is_empty() {
        Err(IndexError::query("empty query leaf"))
    } else {
        Ok(Expr::Term(s.to_string()))
    }
}

/// Split `s` on top-level occurrences of `delim`, treating anything between
/// an odd/even pair of `/` as opaque (so a regex body's own `|`/`&` aren't
/// mistaken for operators).
fn split_top_level(s: &str, delim: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_regex = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if c == '/' {
            in_regex = !in_regex;
        } else if c == delim && !in_regex {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use crate::location::Location;
    use crate::model::{Definition, DefinitionKind, RefKind};

    fn index_with_scenario() -> SemanticIndex {
        let mut index = SemanticIndex::new();
        index.add(Definition::new(
            "authenticateUser",
            DefinitionKind::Function,
            Location::new("src/a.ts", 34, 0),
            "function authenticateUser() {}",
            "typescript",
        ));
        index.add(Definition::new(
            "errorHandler",
            DefinitionKind::Function,
            Location::new("src/b.ts", 1, 0),
            "function errorHandler() {}",
            "typescript",
        ));
        index.add(Definition::new(
            "errorHandler",
            DefinitionKind::Function,
            Location::new("tests/handler.test.ts", 1, 0),
            "function errorHandler() {}",
            "typescript",
        ));
        for _ in 0..3 {
            index.add_reference(crate::model::CrossReference::new(
                "authenticateUser",
                RefKind::Call,
                Location::new("src/caller.ts", 9, 0),
                "authenticateUser()",
            ));
        }
        index
    }

    #[test]
    fn or_query_unions_leaves() {
        let index = index_with_scenario();
        let groups = GroupRegistry::new(&ProjectConfig::default());
        let results = evaluate(&index, &groups, "authenticateUser|errorHandler", &QueryOptions::default()).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn and_query_requires_both_leaves_at_same_location() {
        let index = index_with_scenario();
        let groups = GroupRegistry::new(&ProjectConfig::default());
        let results = evaluate(&index, &groups, "error&handler", &QueryOptions::default()).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.definition.term == "errorHandler"));
    }

    #[test]
    fn not_query_excludes_matching_file() {
        let index = index_with_scenario();
        let groups = GroupRegistry::new(&ProjectConfig::default());
        let results = evaluate(&index, &groups, "handler&!test", &QueryOptions::default()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].definition.location.file, "src/b.ts");
    }

    #[test]
    fn regex_leaf_matches_compiled_pattern() {
        let index = index_with_scenario();
        let groups = GroupRegistry::new(&ProjectConfig::default());
        let results = evaluate(&index, &groups, "/^auth/", &QueryOptions::default()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].definition.term, "authenticateUser");
    }

    #[test]
    fn unknown_group_is_a_query_error() {
        let index = index_with_scenario();
        let groups = GroupRegistry::new(&ProjectConfig::default());
        let err = evaluate(&index, &groups, "group:not-a-group", &QueryOptions::default()).unwrap_err();
        assert!(matches!(err, IndexError::Query { .. }));
    }

    #[test]
    fn sort_by_usage_orders_descending() {
        let index = index_with_scenario();
        let mut options = QueryOptions::default();
        options.sort = SortMode::Usage;
        let groups = GroupRegistry::new(&ProjectConfig::default());
        let results = evaluate(&index, &groups, "authenticateUser|errorHandler", &options).unwrap();
        assert_eq!(results[0].definition.term, "authenticateUser");
    }

    #[test]
    fn split_top_level_ignores_delimiters_inside_regex_body() {
        let parts = split_top_level("/a|b/&c", '&');
        assert_eq!(parts, vec!["/a|b/", "c"]);
    }
}
