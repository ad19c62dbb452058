//! Component A: file discovery & exclusion.
//!
//! Walks the project root once, applying the merged default+config exclusion
//! globs and any inclusion overrides. With no inclusion overrides configured,
//! excluded directories are pruned outright and never descended into; once
//! an override is configured, the walk can no longer assume an excluded
//! directory has nothing to offer, so it descends everywhere and leaves the
//! exclude/include decision to the per-file check. Grounded on
//! `server/src/scan.rs`'s use of `ignore::WalkBuilder` for directory
//! traversal; `ignore::gitignore` already implements the `*`/`**`/`?` glob
//! dialect spec §4.A calls for, so it also backs the include/exclude
//! predicate itself instead of a hand-rolled matcher.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::WalkBuilder;

use crate::error::{IndexError, Result};

/// Directory/file name fragments excluded by default, merged with any
/// project-configured exclusions (spec §6 "Default exclusions").
pub fn default_exclusions() -> Vec<String> {
    [
        "node_modules",
        ".git",
        "dist",
        "build",
        ".curator",
        ".venv",
        "__pycache__",
        "target",
        "*.lock",
        "*.min.js",
        "*.map",
        "*.woff",
        "*.woff2",
        "*.png",
        "*.jpg",
        "*.jpeg",
        "*.gif",
        "*.ico",
        "*.pdf",
        "*.zip",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub struct DiscoveryConfig {
    pub root: std::path::PathBuf,
    /// Default exclusions ∪ project-configured exclusions.
    pub exclude: Vec<String>,
    /// Globs that override exclusions when non-empty.
    pub include: Vec<String>,
    /// Files matching this glob sort before all others.
    pub priority_pattern: Option<String>,
}

impl DiscoveryConfig {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        DiscoveryConfig {
            root: root.into(),
            exclude: default_exclusions(),
            include: Vec::new(),
            priority_pattern: None,
        }
    }
}

fn build_matcher(root: &Path, patterns: &[String]) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    for pattern in patterns {
        builder.add_line(None, pattern).map_err(|e| IndexError::Discovery {
            path: root.to_path_buf(),
            message: format!("bad glob pattern {pattern:?}: {e}"),
        })?;
    }
    builder.build().map_err(|e| IndexError::Discovery {
        path: root.to_path_buf(),
        message: e.to_string(),
    })
}

/// Every proper ancestor directory (as a `/`-joined relative path) of each
/// literal include pattern, plus whether any pattern contains glob
/// metacharacters. Lets directory pruning stay precise for the common case
/// of literal path overrides (`"dist/bundle.js"`) instead of disabling
/// pruning for the whole tree the moment any override is configured.
fn include_ancestor_dirs(patterns: &[String]) -> (std::collections::HashSet<String>, bool) {
    let mut ancestors = std::collections::HashSet::new();
    let mut has_glob = false;
    for pattern in patterns {
        if pattern.contains(['*', '?', '[']) {
            has_glob = true;
            continue;
        }
        let parts: Vec<&str> = pattern.trim_matches('/').split('/').collect();
        for depth in 1..parts.len() {
            ancestors.insert(parts[..depth].join("/"));
        }
    }
    (ancestors, has_glob)
}

/// Walk `config.root` once and return a deterministic, priority-first list
/// of project-relative paths (using `/` separators) that survive the
/// exclude/include predicate.
pub fn discover(config: &DiscoveryConfig) -> Result<Vec<String>> {
    if !config.root.exists() {
        return Err(IndexError::Discovery {
            path: config.root.clone(),
            message: "root does not exist".to_string(),
        });
    }

    let exclude = build_matcher(&config.root, &config.exclude)?;
    let include = if config.include.is_empty() {
        None
    } else {
        Some(build_matcher(&config.root, &config.include)?)
    };
    let priority = match &config.priority_pattern {
        Some(p) => Some(build_matcher(&config.root, std::slice::from_ref(p))?),
        None => None,
    };

    let (include_ancestors, include_has_glob) = include_ancestor_dirs(&config.include);

    let mut walker = WalkBuilder::new(&config.root);
    walker
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .standard_filters(false)
        .filter_entry({
            let exclude = exclude.clone();
            let root = config.root.clone();
            move |entry| {
                let path = entry.path();
                if path == root {
                    return true;
                }
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                if !exclude.matched(path, is_dir).is_ignore() {
                    return true;
                }
                if !is_dir {
                    return false;
                }
                // This directory is excluded. Still descend into it if an
                // include override might reach something inside: a literal
                // ancestor of an include pattern always does; a glob pattern
                // might match anywhere, so it forces a full walk rather than
                // risk skipping the file it was meant to pull back in.
                include_has_glob || {
                    let rel = path.strip_prefix(&root).unwrap_or(path);
                    include_ancestors.contains(&crate::location::normalize_path(&rel.to_string_lossy()))
                }
            }
        });

    let mut paths = Vec::new();
    for entry in walker.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let path = entry.path();
        if path == config.root {
            continue;
        }
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            continue;
        }
        let included = include.as_ref().is_some_and(|i| i.matched(path, false).is_ignore());
        if !included && exclude.matched_path_or_any_parents(path, false).is_ignore() {
            continue;
        }
        let rel = path.strip_prefix(&config.root).unwrap_or(path);
        paths.push(crate::location::normalize_path(&rel.to_string_lossy()));
    }

    paths.sort();
    if let Some(priority) = priority {
        let (mut prio, mut rest): (Vec<_>, Vec<_>) = paths
            .into_iter()
            .partition(|p| priority.matched(p, false).is_ignore());
        prio.sort();
        rest.sort();
        prio.append(&mut rest);
        paths = prio;
    }

    Ok(paths)
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
    fn excludes_default_dirs_and_never_descends_into_them() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/a.ts", "x");
        write(tmp.path(), "node_modules/pkg/index.js", "x");
        write(tmp.path(), "target/debug/foo", "x");

        let config = DiscoveryConfig::new(tmp.path());
        let found = discover(&config).unwrap();

        assert_eq!(found, vec!["src/a.ts".to_string()]);
    }

    #[test]
    fn inclusion_overrides_exclusion() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "dist/bundle.js", "x");
        write(tmp.path(), "src/a.ts", "x");

        let mut config = DiscoveryConfig::new(tmp.path());
        config.include.push("dist/bundle.js".to_string());
        let found = discover(&config).unwrap();

        assert!(found.contains(&"dist/bundle.js".to_string()));
        assert!(found.contains(&"src/a.ts".to_string()));
    }

    #[test]
    fn inclusion_override_does_not_pull_in_unrelated_excluded_files() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "dist/bundle.js", "x");
        write(tmp.path(), "dist/other.js", "x");

        let mut config = DiscoveryConfig::new(tmp.path());
        config.include.push("dist/bundle.js".to_string());
        let found = discover(&config).unwrap();

        assert!(found.contains(&"dist/bundle.js".to_string()));
        assert!(!found.contains(&"dist/other.js".to_string()));
    }

    #[test]
    fn priority_pattern_sorts_first() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/b.ts", "x");
        write(tmp.path(), "src/main.ts", "x");
        write(tmp.path(), "src/a.ts", "x");

        let mut config = DiscoveryConfig::new(tmp.path());
        config.priority_pattern = Some("**/main.ts".to_string());
        let found = discover(&config).unwrap();

        assert_eq!(found[0], "src/main.ts");
        assert_eq!(found[1], "src/a.ts");
        assert_eq!(found[2], "src/b.ts");
    }

    #[test]
    fn double_star_matches_at_any_depth() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "a/b/c/node_modules/x.js", "x");
        write(tmp.path(), "a/b/c/keep.js", "x");

        let config = DiscoveryConfig::new(tmp.path());
        let found = discover(&config).unwrap();
        assert_eq!(found, vec!["a/b/c/keep.js".to_string()]);
    }
}
