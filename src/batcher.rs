//! Component B: stream batcher.
//!
//! Yields batches of `(path, content)` honoring a memory-budget ceiling,
//! streaming large files in chunks with a truncation sentinel, and always
//! ending with a terminal batch carrying the full processed-stats map and
//! deletions. Grounded on `server/src/scan.rs`'s size-capped, parallel file
//! reads (`MAX_FILE_READ`, `is_text_file`).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::warn;

use crate::change_detector::FileStat;

/// Sentinel appended to content that was truncated because reading the rest
/// would have exceeded the batch's memory budget.
pub const TRUNCATION_SENTINEL: &str = "\n/* ...truncated... */";

#[derive(Debug, Clone, Copy)]
pub struct BatchParams {
    /// Maximum number of files per batch.
    pub batch_size: usize,
    /// Maximum bytes of content per batch.
    pub memory_limit: usize,
    /// Files at or above this size are read in chunks.
    pub chunk_size: usize,
}

impl Default for BatchParams {
    fn default() -> Self {
        BatchParams { batch_size: 200, memory_limit: 16 * 1024 * 1024, chunk_size: 256 * 1024 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Content,
    Final,
}

#[derive(Debug, Default)]
pub struct Batch {
    pub kind_content: bool,
    pub files: BTreeMap<String, String>,
    pub stats: BTreeMap<String, FileStat>,
    pub unchanged: Vec<String>,
    pub deleted: Vec<String>,
}

impl Batch {
    pub fn kind(&self) -> BatchKind {
        if self.kind_content { BatchKind::Content } else { BatchKind::Final }
    }
}

/// One file queued for this run, with whatever the change detector decided
/// about it.
pub struct PendingFile {
    pub rel_path: String,
    pub abs_path: std::path::PathBuf,
    pub needs_read: bool,
}

/// Read a single file's content, chunking and truncating per `params`.
/// `already_in_batch` is the number of content bytes already queued in the
/// batch being filled, used to compute the remaining budget.
fn read_with_budget(
    abs_path: &Path,
    size_hint: u64,
    params: &BatchParams,
    already_in_batch: usize,
) -> std::io::Result<String> {
    let remaining_budget = params.memory_limit.saturating_sub(already_in_batch);

    if (size_hint as usize) < params.chunk_size {
        let mut content = String::new();
        File::open(abs_path)?.read_to_string(&mut content)?;
        return Ok(content);
    }

    // Stream in chunks, stopping (and marking truncated) once we'd exceed
    // the remaining per-batch budget.
    let mut file = File::open(abs_path)?;
    file.seek(SeekFrom::Start(0))?;
    let mut buf = vec![0u8; 64 * 1024];
    let mut content = Vec::new();
    let mut truncated = false;

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        if content.len() + n > remaining_budget {
            let room = remaining_budget.saturating_sub(content.len());
            content.extend_from_slice(&buf[..room.min(n)]);
            truncated = true;
            break;
        }
        content.extend_from_slice(&buf[..n]);
    }

    let mut text = String::from_utf8_lossy(&content).into_owned();
    if truncated {
        text.push_str(TRUNCATION_SENTINEL);
    }
    Ok(text)
}

/// Split `pending` into content batches followed by exactly one terminal
/// batch. `processed_stats` is the full stats map as of this run (used to
/// compute `deleted` against the prior cache) and is only attached to the
/// terminal batch, per spec §4.B.
pub fn stream_batches(
    pending: Vec<PendingFile>,
    unchanged: Vec<String>,
    processed_stats: BTreeMap<String, FileStat>,
    deleted: Vec<String>,
    params: &BatchParams,
) -> Vec<Batch> {
    let mut batches = Vec::new();
    let mut current = Batch { kind_content: true, ..Batch::default() };
    let mut bytes_in_batch = 0usize;

    for file in pending {
        if !file.needs_read {
            continue;
        }
        let size_hint = std::fs::metadata(&file.abs_path).map(|m| m.len()).unwrap_or(0);
        match read_with_budget(&file.abs_path, size_hint, params, bytes_in_batch) {
            Ok(content) => {
                bytes_in_batch += content.len();
                current.files.insert(file.rel_path.clone(), content);
                current.stats.insert(
                    file.rel_path,
                    FileStat { size: size_hint, mtime: mtime_of(&file.abs_path) },
                );
            }
            Err(e) => {
                warn!(path = %file.abs_path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        }

        if current.files.len() >= params.batch_size || bytes_in_batch >= params.memory_limit {
            batches.push(std::mem::take(&mut current));
            current = Batch { kind_content: true, ..Batch::default() };
            bytes_in_batch = 0;
        }
    }

    if !current.files.is_empty() {
        batches.push(current);
    }

    batches.push(Batch {
        kind_content: false,
        files: BTreeMap::new(),
        stats: processed_stats,
        unchanged,
        deleted,
    });

    batches
}

fn mtime_of(path: &Path) -> u64 {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(rel: &str, abs: &Path) -> PendingFile {
        PendingFile { rel_path: rel.to_string(), abs_path: abs.to_path_buf(), needs_read: true }
    }

    #[test]
    fn terminal_batch_is_always_emitted_and_empty_of_files() {
        let batches = stream_batches(Vec::new(), Vec::new(), BTreeMap::new(), Vec::new(), &BatchParams::default());
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].kind(), BatchKind::Final);
        assert!(batches[0].files.is_empty());
    }

    #[test]
    fn flushes_batch_when_file_count_cap_reached() {
        let tmp = tempfile::tempdir().unwrap();
        let mut files = Vec::new();
        for i in 0..5 {
            let path = tmp.path().join(format!("f{i}.ts"));
            std::fs::write(&path, "x").unwrap();
            files.push(pending(&format!("f{i}.ts"), &path));
        }
        let params = BatchParams { batch_size: 2, memory_limit: usize::MAX, chunk_size: 1 << 20 };
        let batches = stream_batches(files, Vec::new(), BTreeMap::new(), Vec::new(), &params);

        // 5 files / batch_size 2 -> 3 content batches + 1 terminal
        assert_eq!(batches.len(), 4);
        assert_eq!(batches[0].files.len(), 2);
        assert_eq!(batches[1].files.len(), 2);
        assert_eq!(batches[2].files.len(), 1);
        assert_eq!(batches[3].kind(), BatchKind::Final);
    }

    #[test]
    fn exact_chunk_size_file_is_read_whole() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("f.ts");
        let params = BatchParams { batch_size: 10, memory_limit: usize::MAX, chunk_size: 10 };
        std::fs::write(&path, "0123456789").unwrap(); // exactly chunk_size bytes
        let files = vec![pending("f.ts", &path)];
        let batches = stream_batches(files, Vec::new(), BTreeMap::new(), Vec::new(), &params);
        assert_eq!(batches[0].files["f.ts"], "0123456789");
    }

    #[test]
    fn large_file_truncated_when_budget_exceeded() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("big.ts");
        std::fs::write(&path, "a".repeat(1000)).unwrap();
        let params = BatchParams { batch_size: 10, memory_limit: 100, chunk_size: 10 };
        let files = vec![pending("big.ts", &path)];
        let batches = stream_batches(files, Vec::new(), BTreeMap::new(), Vec::new(), &params);
        assert!(batches[0].files["big.ts"].ends_with(TRUNCATION_SENTINEL));
    }
}
