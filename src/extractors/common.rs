//! Shared extractor helpers (spec §4.E "Universal contracts").
//!
//! Line-oriented by design — extractors never build an AST, matching the
//! spec's `context`/`surrounding`/`related` model. Grounded on
//! `crates/core/src/conventions.rs`'s per-line string-matching style.

use std::collections::BTreeSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use regex::Regex;

use crate::location::Location;
use crate::model::Definition;

/// Development markers recognized inside comments (spec §4.E).
pub const MARKERS: &[&str] = &[
    "TODO", "FIXME", "HACK", "XXX", "BUG", "OPTIMIZE", "REFACTOR", "NOTE", "REVIEW", "DEPRECATED",
    "WORKAROUND", "TEMP", "KLUDGE", "SMELL",
];

/// If `comment_text` opens with (or contains, word-bounded) a known marker,
/// return it. Used to set `Definition.attributes["marker_kind"]`.
pub fn marker_kind(comment_text: &str) -> Option<&'static str> {
    let upper = comment_text.to_uppercase();
    MARKERS.iter().copied().find(|marker| {
        upper
            .match_indices(marker.as_ref() as &str)
            .any(|(i, _)| is_word_bounded(&upper, i, marker.len()))
    })
}

fn is_word_bounded(s: &str, start: usize, len: usize) -> bool {
    let before_ok = s[..start].chars().next_back().map(|c| !c.is_alphanumeric()).unwrap_or(true);
    let after = start + len;
    let after_ok = s[after..].chars().next().map(|c| !c.is_alphanumeric()).unwrap_or(true);
    before_ok && after_ok
}

/// Environment-variable-name categories considered sensitive (spec §4.E).
fn secret_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(password|secret|token|key|auth)").unwrap())
}

pub fn is_secret_name(name: &str) -> bool {
    secret_name_re().is_match(name)
}

/// Mask a sensitive value as `***<len>:<hash8>`, preserving length and a
/// stable fingerprint without retaining the raw value in the index.
pub fn mask_secret(raw_value: &str) -> String {
    let mut hasher = DefaultHasher::new();
    raw_value.hash(&mut hasher);
    format!("***{}:{:08x}", raw_value.len(), (hasher.finish() & 0xffff_ffff) as u32)
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap())
}

/// Other identifiers co-occurring on `line`, excluding `term` itself (spec §3
/// `Definition.related`).
pub fn related_identifiers(line: &str, term: &str) -> BTreeSet<String> {
    identifier_re()
        .find_iter(line)
        .map(|m| m.as_str().to_string())
        .filter(|id| id != term)
        .collect()
}

/// Up to 5 lines centered on `idx` (0-based index into `lines`).
pub fn surrounding(lines: &[&str], idx: usize) -> Vec<String> {
    let start = idx.saturating_sub(2);
    let end = (idx + 3).min(lines.len());
    lines[start..end].iter().map(|s| s.to_string()).collect()
}

/// Build a `Definition` with `context`/`surrounding`/`related` populated
/// from `lines` at 0-based `idx`, matching the universal contract every
/// extractor follows.
pub fn definition_at(
    lines: &[&str],
    idx: usize,
    term: impl Into<String>,
    kind: crate::model::DefinitionKind,
    file: &str,
    column: usize,
    language: &str,
) -> Definition {
    let term = term.into();
    let line = lines.get(idx).copied().unwrap_or("");
    let related = related_identifiers(line, &term);
    Definition::new(term, kind, Location::new(file, idx + 1, column), line, language)
        .with_related(related)
        .with_surrounding(surrounding(lines, idx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_kind_is_word_bounded() {
        assert_eq!(marker_kind("// TODO: fix this"), Some("TODO"));
        assert_eq!(marker_kind("// a hackathon idea"), None);
        assert_eq!(marker_kind("nothing to see here"), None);
    }

    #[test]
    fn secret_name_matches_common_categories() {
        assert!(is_secret_name("DB_PASSWORD"));
        assert!(is_secret_name("API_TOKEN"));
        assert!(!is_secret_name("PORT"));
    }

    #[test]
    fn mask_secret_hides_raw_value_but_keeps_length() {
        let masked = mask_secret("hunter2");
        assert!(!masked.contains("hunter2"));
        assert!(masked.starts_with("***7:"));
    }

    #[test]
    fn surrounding_caps_at_five_lines_and_respects_file_edges() {
        let lines: Vec<&str> = (0..10).map(|_| "x").collect();
        assert_eq!(surrounding(&lines, 0).len(), 3);
        assert_eq!(surrounding(&lines, 5).len(), 5);
        assert_eq!(surrounding(&lines, 9).len(), 3);
    }

    #[test]
    fn related_identifiers_excludes_the_term_itself() {
        let related = related_identifiers("function login(user, password) {", "login");
        assert!(related.contains("user"));
        assert!(related.contains("password"));
        assert!(!related.contains("login"));
    }
}
