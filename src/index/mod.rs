//! Component F: the in-memory multi-map semantic index.
//!
//! Grounded on `server/src/graph.rs`'s `CodeGraph` (forward/reverse adjacency
//! maps kept in sync on insert/remove) generalized from a single call-graph
//! relation to the spec's four maps (`by_file`, `by_term`, `refs_by_target`,
//! `refs_by_file`) and its tiered scoring instead of exact-key lookup.

pub mod normalize;
pub mod search;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};
use crate::model::{CrossReference, Definition, DefinitionKind};
use crate::persistence;
use search::{compare_results, score_with_expansions, SearchResult};

/// Above this many definitions, `save()` persists a summary instead of the
/// full index (spec §4.F "Large-index fallback").
pub const LARGE_INDEX_THRESHOLD: usize = 50_000;

#[derive(Debug, Clone, Default)]
pub struct SemanticIndex {
    by_file: BTreeMap<String, Vec<Definition>>,
    /// Primary-term and alias-part keys (spec §4.F partial-match seeding).
    /// Kept and persisted as its own map because the on-disk format names it
    /// as one of the four maps, but `search` doesn't look values up in it
    /// directly: a bucket mixes a term's own key with every other term's
    /// alias parts, so a direct lookup for an exact search would also
    /// surface defs that merely alias-match the query. `search` instead
    /// recomputes the same tiers from `by_file` via `score_with_expansions`,
    /// which scores a definition's own term shape without that cross-talk.
    by_term: BTreeMap<String, Vec<Definition>>,
    refs_by_target: BTreeMap<String, Vec<CrossReference>>,
    refs_by_file: BTreeMap<String, Vec<CrossReference>>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub kind: Option<Vec<DefinitionKind>>,
    /// Substring filters on the definition's file path; any match passes.
    pub files: Option<Vec<String>>,
    pub exact: bool,
    pub regex: bool,
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_definitions: usize,
    pub total_references: usize,
    pub total_files: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactReport {
    pub references: Vec<CrossReference>,
    pub file_count: usize,
    pub by_kind: BTreeMap<String, usize>,
}

impl SemanticIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition, seeding `by_term` with its primary key and its
    /// camel/snake/kebab split parts as alias keys (spec §4.F partial-match
    /// seeding). Aliases never displace or duplicate the primary entry.
    pub fn add(&mut self, def: Definition) {
        self.by_file.entry(def.location.file.clone()).or_default().push(def.clone());

        let primary = normalize::fold(&def.term);
        push_dedup(self.by_term.entry(primary).or_default(), &def);

        for part in normalize::split_parts(&def.term) {
            push_dedup(self.by_term.entry(part).or_default(), &def);
        }
    }

    pub fn add_reference(&mut self, reference: CrossReference) {
        self.refs_by_file
            .entry(reference.from.file.clone())
            .or_default()
            .push(reference.clone());
        self.refs_by_target
            .entry(reference.target_term.clone())
            .or_default()
            .push(reference);
    }

    /// Remove every definition and reference attributed to `file`, pruning
    /// any term/target bucket left empty (spec §4.F `remove_file`).
    pub fn remove_file(&mut self, file: &str) {
        self.by_file.remove(file);

        for defs in self.by_term.values_mut() {
            defs.retain(|d| d.location.file != file);
        }
        self.by_term.retain(|_, defs| !defs.is_empty());

        self.refs_by_file.remove(file);
        for refs in self.refs_by_target.values_mut() {
            refs.retain(|r| r.from.file != file);
        }
        self.refs_by_target.retain(|_, refs| !refs.is_empty());
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            total_definitions: self.by_file.values().map(Vec::len).sum(),
            total_references: self.refs_by_file.values().map(Vec::len).sum(),
            total_files: self.by_file.len(),
        }
    }

    fn usage_count(&self, term: &str) -> usize {
        self.refs_by_target.get(term).map(Vec::len).unwrap_or(0)
    }

    fn sample_usages(&self, term: &str) -> Vec<CrossReference> {
        self.refs_by_target
            .get(term)
            .map(|refs| refs.iter().take(3).cloned().collect())
            .unwrap_or_default()
    }

    /// Exact references to `term` (spec §4.F `references`).
    pub fn references(&self, term: &str) -> &[CrossReference] {
        self.refs_by_target.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every reference to `term`, grouped by kind and counted by unique
    /// calling file (spec §4.F `impact`; resolved Open Question: config
    /// extractor references do participate, see DESIGN.md OQ2).
    pub fn impact(&self, term: &str) -> ImpactReport {
        let refs = self.references(term).to_vec();
        let mut by_kind: BTreeMap<String, usize> = BTreeMap::new();
        let mut files = std::collections::BTreeSet::new();
        for r in &refs {
            *by_kind.entry(r.ref_kind.label().to_string()).or_insert(0) += 1;
            files.insert(r.from.file.clone());
        }
        ImpactReport { references: refs, file_count: files.len(), by_kind }
    }

    /// Tiered, deterministic search (spec §4.F). `query` may be a plain
    /// term, an exact term (`options.exact`), or a regex body
    /// (`options.regex`, without the `/.../ ` delimiters — those are
    /// stripped by the query engine).
    pub fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        let candidates = self.by_file.values().flat_map(|v| v.iter());

        let mut results: Vec<SearchResult> = if options.regex {
            let re = regex::Regex::new(query).map_err(|e| IndexError::query(e.to_string()))?;
            candidates
                .filter(|d| re.is_match(&d.term))
                .map(|d| self.to_result(d, 0.70))
                .collect()
        } else if query.is_empty() {
            candidates.map(|d| self.to_result(d, 0.50)).collect()
        } else if options.exact {
            let folded_query = normalize::fold(query);
            candidates
                .filter(|d| normalize::fold(&d.term) == folded_query)
                .map(|d| {
                    let score = if d.term == query { 1.00 } else { 0.95 };
                    self.to_result(d, score)
                })
                .collect()
        } else {
            let folded_query = normalize::fold(query);
            candidates
                .filter_map(|d| {
                    score_with_expansions(&d.term, query)
                        .or_else(|| {
                            normalize::fold(&d.location.file)
                                .contains(&folded_query)
                                .then_some(0.30)
                        })
                        .map(|score| self.to_result(d, score))
                })
                .collect()
        };

        results = apply_filters(results, options);
        dedup_keep_first(&mut results);
        results.sort_by(compare_results);
        if let Some(max) = options.max_results {
            results.truncate(max);
        }
        Ok(results)
    }

    /// Search each term in `terms` and merge the results (spec §4.H group
    /// queries are an OR across the group's term list).
    pub fn search_group(&self, terms: &[String], options: &SearchOptions) -> Result<Vec<SearchResult>> {
        let mut results = Vec::new();
        for term in terms {
            results.extend(self.search(term, options)?);
        }
        dedup_keep_first(&mut results);
        results.sort_by(compare_results);
        if let Some(max) = options.max_results {
            results.truncate(max);
        }
        Ok(results)
    }

    fn to_result(&self, def: &Definition, score: f64) -> SearchResult {
        SearchResult {
            definition: def.clone(),
            score,
            usage_count: self.usage_count(&def.term),
            sample_usages: self.sample_usages(&def.term),
        }
    }

    /// Persist the index, falling back to a summary document above
    /// [`LARGE_INDEX_THRESHOLD`] entries (spec §4.F / §4.I).
    pub fn save(&self, project_root: &Path) -> Result<()> {
        let dir = persistence::resolve_curator_dir(project_root);
        let path = dir.join(persistence::INDEX_FILE);
        let stats = self.stats();
        if stats.total_definitions > LARGE_INDEX_THRESHOLD {
            let summary = self.summarize();
            persistence::atomic_write_json(&path, &summary)
                .map_err(|e| IndexError::PersistIndex { message: e.to_string() })
        } else {
            let doc = PersistedIndex {
                entries: as_pairs(&self.by_file),
                term_index: as_pairs(&self.by_term),
                cross_references: as_pairs(&self.refs_by_target),
                file_references: as_pairs(&self.refs_by_file),
            };
            persistence::atomic_write_json(&path, &doc)
                .map_err(|e| IndexError::PersistIndex { message: e.to_string() })
        }
    }

    /// Load a previously persisted full index. A summary document does not
    /// count as a persisted full index and yields `Ok(None)` (spec §4.F).
    pub fn load(project_root: &Path) -> Result<Option<SemanticIndex>> {
        let dir = persistence::resolve_curator_dir(project_root);
        let path = dir.join(persistence::INDEX_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let doc: serde_json::Value = persistence::read_json(&path)
            .map_err(|e| IndexError::PersistIndex { message: e.to_string() })?;
        if doc.get("type").and_then(|v| v.as_str()) == Some("large_index_summary") {
            return Ok(None);
        }
        let persisted: PersistedIndex = serde_json::from_value(doc)
            .map_err(|e| IndexError::PersistIndex { message: e.to_string() })?;
        Ok(Some(SemanticIndex {
            by_file: persisted.entries.into_iter().collect(),
            by_term: persisted.term_index.into_iter().collect(),
            refs_by_target: persisted.cross_references.into_iter().collect(),
            refs_by_file: persisted.file_references.into_iter().collect(),
        }))
    }

    fn summarize(&self) -> IndexSummary {
        let stats = self.stats();
        let mut term_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for defs in self.by_file.values() {
            for d in defs {
                *term_counts.entry(&d.term).or_insert(0) += 1;
            }
        }
        let mut top_terms: Vec<TermCount> = term_counts
            .into_iter()
            .map(|(term, count)| TermCount { term: term.to_string(), count })
            .collect();
        top_terms.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
        top_terms.truncate(100);
        IndexSummary {
            doc_type: "large_index_summary".to_string(),
            stats,
            timestamp: unix_timestamp(),
            top_terms,
            file_count: self.by_file.len(),
        }
    }
}

fn as_pairs<K: Clone, V: Clone>(map: &BTreeMap<K, V>) -> Vec<(K, V)> {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

fn unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn push_dedup(bucket: &mut Vec<Definition>, def: &Definition) {
    let already = bucket
        .iter()
        .any(|d| d.location.file == def.location.file && d.location.line == def.location.line && d.term == def.term);
    if !already {
        bucket.push(def.clone());
    }
}

fn apply_filters(results: Vec<SearchResult>, options: &SearchOptions) -> Vec<SearchResult> {
    results
        .into_iter()
        .filter(|r| {
            options
                .kind
                .as_ref()
                .map(|kinds| kinds.contains(&r.definition.kind))
                .unwrap_or(true)
        })
        .filter(|r| {
            options
                .files
                .as_ref()
                .map(|globs| globs.iter().any(|g| r.definition.location.file.contains(g.as_str())))
                .unwrap_or(true)
        })
        .collect()
}

/// Dedup by `(file, line, term)`, keeping the first (highest-scoring, since
/// results are tier-ordered by caller prior to this point only for group
/// merges; for a single `search()` call candidates are deduped before
/// sorting, so "first occurrence" here means "first produced by the tier
/// pass that already returns at most one candidate per definition").
fn dedup_keep_first(results: &mut Vec<SearchResult>) {
    let mut seen = std::collections::BTreeSet::new();
    results.retain(|r| {
        let key = (r.definition.location.file.clone(), r.definition.location.line, r.definition.term.clone());
        seen.insert(key)
    });
}

/// On-disk shape for the full index (spec §6 "Persisted file formats"): four
/// keys, each an array of `[key, value]` pairs rather than a JSON object, so
/// the serialized form doesn't depend on map-key string constraints.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedIndex {
    entries: Vec<(String, Vec<Definition>)>,
    #[serde(rename = "termIndex")]
    term_index: Vec<(String, Vec<Definition>)>,
    #[serde(rename = "crossReferences")]
    cross_references: Vec<(String, Vec<CrossReference>)>,
    #[serde(rename = "fileReferences")]
    file_references: Vec<(String, Vec<CrossReference>)>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TermCount {
    term: String,
    count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexSummary {
    #[serde(rename = "type")]
    doc_type: String,
    stats: IndexStats,
    timestamp: u64,
    top_terms: Vec<TermCount>,
    file_count: usize,
}
