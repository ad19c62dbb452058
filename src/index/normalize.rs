//! Case folding, identifier splitting, and the Tier-5 abbreviation table.
//!
//! Splitting mirrors the camelCase word-boundary detection in
//! `server/src/scan.rs::describe`, generalized to also split on `_` and `-`
//! and to drop the word-joining (we want the parts, not a sentence).

/// Case-fold a term for matching. Stored terms are never mutated; only this
/// copy is used for comparisons (spec §3 invariant 4).
pub fn fold(term: &str) -> String {
    term.to_lowercase()
}

/// Split `term` on camelCase boundaries, `_`, and `-`, returning parts of
/// length >= 3 that differ from the whole term (spec §4.F partial-match
/// seeding). Parts are returned case-folded.
pub fn split_parts(term: &str) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    for underscore_piece in term.split('_') {
        for piece in underscore_piece.split('-') {
            parts.extend(split_camel(piece));
        }
    }
    let whole = fold(term);
    parts
        .into_iter()
        .map(|p| fold(&p))
        .filter(|p| p.len() >= 3 && *p != whole)
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn split_camel(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 {
            let prev = chars[i - 1];
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_ascii_digit() && c.is_alphabetic())
                || (i + 1 < chars.len()
                    && prev.is_uppercase()
                    && c.is_uppercase()
                    && chars[i + 1].is_lowercase());
            if boundary {
                parts.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Word-boundary verb prefixes recognized by Tier-3 matching (spec Glossary).
pub const VERB_PREFIXES: &[&str] =
    &["get", "set", "is", "has", "create", "update", "delete", "handle", "process"];

/// Fixed Tier-5 abbreviation table (spec Glossary "Abbreviation variant").
pub fn abbreviation_variants(query: &str) -> Vec<&'static str> {
    let table: &[(&str, &[&str])] = &[
        ("auth", &["authenticate", "authorization"]),
        ("cfg", &["config"]),
        ("config", &["configuration"]),
        ("db", &["database"]),
        ("ctx", &["context"]),
        ("req", &["request", "require"]),
        ("res", &["response", "result"]),
        ("err", &["error"]),
        ("msg", &["message"]),
        ("usr", &["user"]),
        ("pwd", &["password"]),
        ("mgr", &["manager"]),
        ("ctrl", &["controller", "control"]),
        ("svc", &["service"]),
        ("repo", &["repository"]),
        ("util", &["utility"]),
        ("lib", &["library"]),
        ("pkg", &["package"]),
        ("proc", &["process", "processor"]),
        ("exec", &["execute"]),
        ("init", &["initialize"]),
    ];
    let folded = fold(query);
    table
        .iter()
        .find(|(k, _)| *k == folded)
        .map(|(_, v)| v.to_vec())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_camel_case() {
        let parts = split_parts("authenticateUser");
        assert!(parts.contains(&"authenticate".to_string()));
        assert!(parts.contains(&"user".to_string()));
    }

    #[test]
    fn splits_snake_and_kebab_case() {
        assert!(split_parts("auth_token").contains(&"token".to_string()));
        assert!(split_parts("auth-token").contains(&"token".to_string()));
    }

    #[test]
    fn short_parts_are_dropped() {
        // "is" and "ok" are < 3 chars and should not appear as parts
        let parts = split_parts("isOk");
        assert!(!parts.contains(&"is".to_string()));
        assert!(!parts.contains(&"ok".to_string()));
    }

    #[test]
    fn whole_term_is_never_returned_as_its_own_part() {
        let parts = split_parts("login");
        assert!(!parts.contains(&"login".to_string()));
    }

    #[test]
    fn abbreviation_table_expands_known_entries() {
        assert_eq!(abbreviation_variants("auth"), vec!["authenticate", "authorization"]);
        assert_eq!(abbreviation_variants("db"), vec!["database"]);
        assert!(abbreviation_variants("zzz").is_empty());
    }
}
