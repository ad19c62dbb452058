//! Pattern algebra (`a|b`, `a&b`, `!a`, `/regex/`), concept groups, and sort
//! modes, exercised end to end through `CuratorService`.

use std::fs;
use std::path::Path;

use curator_core::query::{QueryOptions, SortMode};
use curator_core::service::CuratorService;
use curator_core::SearchOptions;

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn seeded_project() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "src/auth.ts", "export function authenticateUser(token) {}\n");
    write(tmp.path(), "src/handler.ts", "export function errorHandler() {}\n");
    write(tmp.path(), "tests/handler.test.ts", "export function errorHandler() {}\n");
    tmp
}

#[test]
fn or_query_unions_both_leaves() {
    let tmp = seeded_project();
    let service = CuratorService::new(tmp.path()).unwrap();
    service.ensure_fresh().unwrap();

    let results = service.search("authenticateUser|errorHandler", &QueryOptions::default()).unwrap();
    // 1 authenticateUser def + 2 errorHandler defs (src/handler.ts and
    // tests/handler.test.ts both declare one).
    assert_eq!(results.len(), 3);
}

#[test]
fn and_query_requires_both_leaves_at_the_same_location() {
    let tmp = seeded_project();
    let service = CuratorService::new(tmp.path()).unwrap();
    service.ensure_fresh().unwrap();

    let results = service.search("error&handler", &QueryOptions::default()).unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.definition.term == "errorHandler"));
}

#[test]
fn not_query_excludes_the_test_file() {
    let tmp = seeded_project();
    let service = CuratorService::new(tmp.path()).unwrap();
    service.ensure_fresh().unwrap();

    let results = service.search("handler&!test", &QueryOptions::default()).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].definition.location.file, "src/handler.ts");
}

#[test]
fn regex_leaf_matches_a_compiled_pattern() {
    let tmp = seeded_project();
    let service = CuratorService::new(tmp.path()).unwrap();
    service.ensure_fresh().unwrap();

    let results = service.search("/^authenticate/", &QueryOptions::default()).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].definition.term, "authenticateUser");
}

#[test]
fn concept_group_query_is_an_or_over_its_terms() {
    let tmp = seeded_project();
    let service = CuratorService::new(tmp.path()).unwrap();
    service.ensure_fresh().unwrap();

    let results = service.search_group("auth", &SearchOptions::default()).unwrap();
    assert!(results.iter().any(|r| r.definition.term == "authenticateUser"));
}

#[test]
fn group_leaf_composes_inside_pattern_algebra() {
    let tmp = seeded_project();
    let service = CuratorService::new(tmp.path()).unwrap();
    service.ensure_fresh().unwrap();

    let results = service.search("group:auth&!test", &QueryOptions::default()).unwrap();
    assert!(results.iter().any(|r| r.definition.term == "authenticateUser"));
}

#[test]
fn sort_mode_file_orders_by_path_then_line() {
    let tmp = seeded_project();
    let service = CuratorService::new(tmp.path()).unwrap();
    service.ensure_fresh().unwrap();

    let options = QueryOptions { sort: SortMode::File, ..QueryOptions::default() };
    let results = service.search("errorHandler", &options).unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].definition.location.file <= results[1].definition.location.file);
}
