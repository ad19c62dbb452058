//! Component C: change detector.
//!
//! Maintains a persisted `path -> (size, mtime)` stats cache and classifies
//! each discovered file as unchanged / changed / new, with deletions being
//! whatever the prior cache had that this run didn't discover. Grounded on
//! `server/src/scan.rs`'s `fs::metadata`-based size lookup, extended with an
//! mtime comparison since the size-differs-first, then-mtime precedence this
//! follows needs both.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    pub size: u64,
    pub mtime: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsCache {
    pub entries: BTreeMap<String, FileStat>,
}

impl StatsCache {
    /// Load the cache from disk. A missing or corrupt file is treated as an
    /// empty cache — the spec calls the cache "advisory"; a bad cache just
    /// forces a full rebuild rather than failing the update.
    pub fn load(path: &Path) -> StatsCache {
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_default(),
            Err(_) => StatsCache::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        crate::persistence::atomic_write_json(path, self).map_err(|e| {
            warn!(error = %e, "failed to persist stats cache");
            crate::error::IndexError::PersistStats { message: e.to_string() }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Unchanged,
    Changed,
    New,
}

/// Classify `rel_path` against the cache using the file's current size and
/// mtime, per spec §4.C:
///  1. size differs from cache -> Changed
///  2. else mtime matches cache -> Unchanged
///  3. else -> Changed
/// A path absent from the cache is New.
pub fn classify(cache: &StatsCache, rel_path: &str, current: FileStat) -> Classification {
    match cache.entries.get(rel_path) {
        None => Classification::New,
        Some(prior) => {
            if prior.size != current.size {
                Classification::Changed
            } else if prior.mtime == current.mtime {
                Classification::Unchanged
            } else {
                Classification::Changed
            }
        }
    }
}

/// Paths present in the prior cache but absent from this run's discovery.
pub fn compute_deletions(cache: &StatsCache, discovered: &[String]) -> Vec<String> {
    let discovered: std::collections::BTreeSet<&str> =
        discovered.iter().map(|s| s.as_str()).collect();
    cache
        .entries
        .keys()
        .filter(|p| !discovered.contains(p.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with(entries: &[(&str, u64, u64)]) -> StatsCache {
        let mut cache = StatsCache::default();
        for (path, size, mtime) in entries {
            cache.entries.insert(path.to_string(), FileStat { size: *size, mtime: *mtime });
        }
        cache
    }

    #[test]
    fn unknown_path_is_new() {
        let cache = StatsCache::default();
        assert_eq!(
            classify(&cache, "x.ts", FileStat { size: 10, mtime: 1 }),
            Classification::New
        );
    }

    #[test]
    fn size_difference_wins_over_matching_mtime() {
        let cache = cache_with(&[("x.ts", 100, 5)]);
        assert_eq!(
            classify(&cache, "x.ts", FileStat { size: 200, mtime: 5 }),
            Classification::Changed
        );
    }

    #[test]
    fn matching_size_and_mtime_is_unchanged() {
        let cache = cache_with(&[("x.ts", 100, 5)]);
        assert_eq!(
            classify(&cache, "x.ts", FileStat { size: 100, mtime: 5 }),
            Classification::Unchanged
        );
    }

    #[test]
    fn matching_size_but_different_mtime_is_changed() {
        let cache = cache_with(&[("x.ts", 100, 5)]);
        assert_eq!(
            classify(&cache, "x.ts", FileStat { size: 100, mtime: 6 }),
            Classification::Changed
        );
    }

    #[test]
    fn deletions_are_cached_paths_not_rediscovered() {
        let cache = cache_with(&[("a.ts", 1, 1), ("b.ts", 1, 1)]);
        let deleted = compute_deletions(&cache, &["a.ts".to_string()]);
        assert_eq!(deleted, vec!["b.ts".to_string()]);
    }

    #[test]
    fn corrupt_cache_file_loads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("statscache.json");
        std::fs::write(&path, "not json").unwrap();
        let cache = StatsCache::load(&path);
        assert!(cache.entries.is_empty());
    }
}
