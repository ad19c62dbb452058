//! `CuratorService`: the facade a CLI driver (or any embedder) calls.
//!
//! Owns the update pipeline (A → C → B → D/E → F → I) and the concurrency
//! discipline from spec §5: readers take a read guard against a live index,
//! while `ensure_fresh`/`remove_file` build a revised copy off to the side
//! and swap it in under a single write guard, mirroring the teacher's
//! `Arc<RwLock<ServerState>>` in `server/src/main.rs`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::batcher::{self, BatchKind, BatchParams, PendingFile};
use crate::change_detector::{self, Classification, FileStat, StatsCache};
use crate::config::ProjectConfig;
use crate::discovery::{self, DiscoveryConfig};
use crate::error::{IndexError, Result};
use crate::extractors;
use crate::groups::GroupRegistry;
use crate::index::search::SearchResult;
use crate::index::{ImpactReport, IndexStats, SearchOptions, SemanticIndex};
use crate::model::CrossReference;
use crate::persistence;
use crate::query::{self, QueryOptions};

/// Outcome of one `ensure_fresh()` cycle (spec §8 scenario 5's `changed`
/// counter, generalized to the other classifications).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub new: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub deleted: usize,
    pub cancelled: bool,
}

impl UpdateSummary {
    fn touched_anything(&self) -> bool {
        self.new > 0 || self.changed > 0 || self.deleted > 0
    }
}

pub struct CuratorService {
    root: PathBuf,
    index: Arc<RwLock<SemanticIndex>>,
    groups: Arc<RwLock<GroupRegistry>>,
    batch_params: BatchParams,
    /// Only one update runs at a time (spec §5 shared-resource policy).
    updating: Mutex<()>,
    cancel_requested: AtomicBool,
}

impl CuratorService {
    /// Load config and any previously persisted index for `root`. A missing
    /// or oversized persisted index just means the first `ensure_fresh()`
    /// does a full build.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = ProjectConfig::load(&root);
        let groups = GroupRegistry::new(&config);
        let index = SemanticIndex::load(&root)?.unwrap_or_default();

        Ok(CuratorService {
            root,
            index: Arc::new(RwLock::new(index)),
            groups: Arc::new(RwLock::new(groups)),
            batch_params: BatchParams::default(),
            updating: Mutex::new(()),
            cancel_requested: AtomicBool::new(false),
        })
    }

    /// Request that the update in progress (if any) stop at the next batch
    /// boundary. A no-op if no update is running.
    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    /// Build or incrementally refresh the index and persist it if anything
    /// changed. Idempotent: a second call with no file changes performs zero
    /// writes (spec §8). Also reloads the project config and rebuilds the
    /// concept-group registry from it, so edits to `customGroups` take
    /// effect on the next call even when no source files changed.
    pub fn ensure_fresh(&self) -> Result<UpdateSummary> {
        let _guard = self.updating.lock().unwrap();
        self.cancel_requested.store(false, Ordering::SeqCst);

        let config = ProjectConfig::load(&self.root);
        *self.groups.write().unwrap() = GroupRegistry::new(&config);

        let discovery_config = DiscoveryConfig {
            root: self.root.clone(),
            exclude: config.merged_exclusions(),
            include: config.include.clone(),
            priority_pattern: None,
        };
        let discovered = discovery::discover(&discovery_config)?;

        let curator_dir = persistence::resolve_curator_dir(&self.root);
        let stats_cache_path = curator_dir.join(persistence::STATS_CACHE_FILE);
        let cache = StatsCache::load(&stats_cache_path);

        let mut pending = Vec::new();
        let mut unchanged_paths = Vec::new();
        let mut unchanged_stats = BTreeMap::new();
        let mut summary = UpdateSummary::default();

        for rel_path in &discovered {
            let abs_path = self.root.join(rel_path);
            let current = stat_of(&abs_path);
            match change_detector::classify(&cache, rel_path, current) {
                Classification::Unchanged => {
                    summary.unchanged += 1;
                    unchanged_paths.push(rel_path.clone());
                    unchanged_stats.insert(rel_path.clone(), current);
                }
                Classification::New => {
                    summary.new += 1;
                    pending.push(PendingFile { rel_path: rel_path.clone(), abs_path, needs_read: true });
                }
                Classification::Changed => {
                    summary.changed += 1;
                    pending.push(PendingFile { rel_path: rel_path.clone(), abs_path, needs_read: true });
                }
            }
        }

        let deletions = change_detector::compute_deletions(&cache, &discovered);
        summary.deleted = deletions.len();

        if !summary.touched_anything() {
            debug!(unchanged = summary.unchanged, "ensure_fresh: nothing to do");
            return Ok(summary);
        }

        let batches = batcher::stream_batches(pending, unchanged_paths, unchanged_stats, deletions, &self.batch_params);

        let mut working = self.index.read().unwrap().clone();
        let mut new_cache_entries: BTreeMap<String, FileStat> = BTreeMap::new();
        let registry = extractors::registry();

        for batch in &batches {
            if self.cancel_requested.swap(false, Ordering::SeqCst) {
                summary.cancelled = true;
                debug!("ensure_fresh: cancelled between batches, in-memory index left untouched");
                return Ok(summary);
            }

            match batch.kind() {
                BatchKind::Content => {
                    let extracted: Vec<(String, crate::model::ExtractionResult)> = batch
                        .files
                        .par_iter()
                        .map(|(path, content)| {
                            let result = extractors::dispatch(&registry, content, path)
                                .unwrap_or_default();
                            (path.clone(), result)
                        })
                        .collect();

                    for (path, result) in extracted {
                        working.remove_file(&path);
                        for def in result.definitions {
                            working.add(def);
                        }
                        for reference in result.references {
                            working.add_reference(reference);
                        }
                    }
                    new_cache_entries.extend(batch.stats.clone());
                }
                BatchKind::Final => {
                    new_cache_entries.extend(batch.stats.clone());
                    for path in &batch.deleted {
                        working.remove_file(path);
                    }
                }
            }
        }

        *self.index.write().unwrap() = working;

        let new_cache = StatsCache { entries: new_cache_entries };
        if let Err(e) = new_cache.save(&stats_cache_path) {
            warn!(error = %e, "failed to persist stats cache, next run will rebuild fully");
        }

        let index = self.index.read().unwrap();
        index.save(&self.root)?;

        Ok(summary)
    }

    /// Full pattern-algebra search (spec §4.G): `a|b`, `a&b`, `!a`,
    /// `/regex/`, `group:<name>` leaves.
    pub fn search(&self, query_str: &str, options: &QueryOptions) -> Result<Vec<SearchResult>> {
        let index = self.index.read().unwrap();
        let groups = self.groups.read().unwrap();
        query::evaluate(&index, &groups, query_str, options)
    }

    /// A named concept group's terms, OR-ed together (spec §4.H).
    pub fn search_group(&self, name: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        let groups = self.groups.read().unwrap();
        let terms = groups
            .terms_for(name)
            .ok_or_else(|| IndexError::query(format!("unknown concept group {name:?}")))?
            .to_vec();
        let index = self.index.read().unwrap();
        index.search_group(&terms, options)
    }

    pub fn references(&self, term: &str) -> Vec<CrossReference> {
        self.index.read().unwrap().references(term).to_vec()
    }

    pub fn impact(&self, term: &str) -> ImpactReport {
        self.index.read().unwrap().impact(term)
    }

    pub fn stats(&self) -> IndexStats {
        self.index.read().unwrap().stats()
    }

    /// Drop in-memory state; the next `search`/`ensure_fresh` rebuilds it
    /// (spec §6 `clear()`).
    pub fn clear(&self) {
        self.index.write().unwrap().clear();
    }

    /// Remove one file's contribution and persist, outside the normal
    /// discovery cycle (e.g. a caller watching the filesystem directly).
    pub fn remove_file(&self, path: &str) -> Result<()> {
        self.index.write().unwrap().remove_file(path);
        self.index.read().unwrap().save(&self.root)
    }

    pub fn groups(&self) -> Vec<String> {
        self.groups.read().unwrap().list().iter().map(|g| g.name.clone()).collect()
    }
}

fn stat_of(path: &Path) -> FileStat {
    std::fs::metadata(path)
        .map(|m| FileStat {
            size: m.len(),
            mtime: m
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs())
                .unwrap_or(0),
        })
        .unwrap_or(FileStat { size: 0, mtime: 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn ensure_fresh_indexes_a_new_project_then_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/auth.ts", "export function login(user) {}\n");

        let service = CuratorService::new(tmp.path()).unwrap();
        let first = service.ensure_fresh().unwrap();
        assert_eq!(first.new, 1);
        assert_eq!(service.stats().total_definitions, 1);

        let second = service.ensure_fresh().unwrap();
        assert_eq!(second.new, 0);
        assert_eq!(second.changed, 0);
        assert!(!second.touched_anything());
    }

    #[test]
    fn search_finds_an_indexed_function() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/auth.ts", "export function login(user) {}\n");

        let service = CuratorService::new(tmp.path()).unwrap();
        service.ensure_fresh().unwrap();
        let results = service.search("login", &QueryOptions::default()).unwrap();
        assert!(results.iter().any(|r| r.definition.term == "login"));
    }

    #[test]
    fn removing_a_file_drops_its_definitions() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/auth.ts", "export function login(user) {}\n");

        let service = CuratorService::new(tmp.path()).unwrap();
        service.ensure_fresh().unwrap();
        service.remove_file("src/auth.ts").unwrap();
        assert_eq!(service.stats().total_definitions, 0);
    }

    #[test]
    fn search_group_errors_on_unknown_group() {
        let tmp = tempfile::tempdir().unwrap();
        let service = CuratorService::new(tmp.path()).unwrap();
        let err = service.search_group("not-a-group", &SearchOptions::default()).unwrap_err();
        assert!(matches!(err, IndexError::Query { .. }));
    }

    #[test]
    fn ensure_fresh_picks_up_a_custom_group_added_after_construction() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/app.ts", "export function boot() {}\n");

        let service = CuratorService::new(tmp.path()).unwrap();
        assert!(!service.groups().iter().any(|g| g == "widgets"));

        write(
            tmp.path(),
            ".curatorconfig.json",
            r#"{"customGroups": {"widgets": ["boot", "render"]}}"#,
        );
        service.ensure_fresh().unwrap();
        assert!(service.groups().iter().any(|g| g == "widgets"));

        let results = service.search_group("widgets", &SearchOptions::default()).unwrap();
        assert!(results.iter().any(|r| r.definition.term == "boot"));
    }

    #[test]
    fn clear_resets_in_memory_state() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/auth.ts", "export function login(user) {}\n");
        let service = CuratorService::new(tmp.path()).unwrap();
        service.ensure_fresh().unwrap();
        service.clear();
        assert_eq!(service.stats().total_definitions, 0);
    }
}
