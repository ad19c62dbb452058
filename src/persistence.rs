//! Component I: persistence & on-disk layout.
//!
//! Atomic write discipline (temp file + rename) under `<project>/.curator/`,
//! falling back to `$HOME/.codebase-curator/projects/<sanitized-path>/` when
//! the project directory isn't writable. Grounded on `server/src/init.rs`'s
//! tolerant-parse-or-default style and the general "write beside the real
//! path, then rename" idiom used across the teacher's config writers.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

pub const CURATOR_DIR: &str = ".curator";
pub const INDEX_FILE: &str = "semantic-index.json";
pub const STATS_CACHE_FILE: &str = "semantic/statscache.json";

/// Resolve the directory index/cache files live under for `project_root`,
/// creating it (and falling back to a `$HOME`-based directory) if needed.
pub fn resolve_curator_dir(project_root: &Path) -> PathBuf {
    let primary = project_root.join(CURATOR_DIR);
    if fs::create_dir_all(&primary).is_ok() && is_writable(&primary) {
        return primary;
    }
    fallback_dir(project_root)
}

fn is_writable(dir: &Path) -> bool {
    let probe = dir.join(".write_probe");
    match fs::write(&probe, b"") {
        Ok(()) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

fn sanitize_path(path: &Path) -> String {
    path.to_string_lossy()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn fallback_dir(project_root: &Path) -> PathBuf {
    let home = dirs_home().unwrap_or_else(|| PathBuf::from("."));
    let dir = home
        .join(".codebase-curator")
        .join("projects")
        .join(sanitize_path(project_root));
    let _ = fs::create_dir_all(&dir);
    dir
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Write `value` to `path` atomically: serialize to a sibling temp file,
/// then rename over the target. Creates missing parent directories first.
pub fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> std::io::Result<T> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
