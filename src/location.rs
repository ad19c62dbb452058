//! A source location: project-relative path, 1-based line, 0-based column.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Project-relative path, normalized to use `/` as the separator.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// 0-based column.
    pub column: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Location { file: normalize_path(&file.into()), line, column }
    }
}

/// Normalize a path to use `/` separators, as spec §3 invariant 3 requires.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_backslashes() {
        let loc = Location::new("src\\a\\b.rs", 3, 0);
        assert_eq!(loc.file, "src/a/b.rs");
    }
}
