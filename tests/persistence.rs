//! Save/clear/load round-trip and the large-index summary fallback (spec
//! §4.I / §8 scenario 4).

use std::fs;

use curator_core::index::{SearchOptions, SemanticIndex};
use curator_core::location::Location;
use curator_core::model::{CrossReference, Definition, DefinitionKind, RefKind};
use curator_core::service::CuratorService;

fn def(term: &str, file: &str, line: usize) -> Definition {
    Definition::new(term, DefinitionKind::Function, Location::new(file, line, 0), format!("fn {term}()"), "rust")
}

#[test]
fn save_clear_load_round_trip_preserves_query_results() {
    let tmp = tempfile::tempdir().unwrap();
    let mut index = SemanticIndex::new();
    index.add(def("authenticateUser", "src/auth.rs", 10));
    index.add_reference(CrossReference::new(
        "authenticateUser",
        RefKind::Call,
        Location::new("src/caller.rs", 4, 0),
        "authenticateUser()",
    ));
    index.save(tmp.path()).unwrap();

    index.clear();
    assert_eq!(index.stats().total_definitions, 0);

    let loaded = SemanticIndex::load(tmp.path()).unwrap().unwrap();
    let results = loaded
        .search("authenticateUser", &SearchOptions { exact: true, ..Default::default() })
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].usage_count, 1);
    assert_eq!(loaded.stats().total_definitions, 1);
}

#[test]
fn large_index_saves_a_summary_and_load_reports_it_as_absent() {
    let tmp = tempfile::tempdir().unwrap();
    let mut index = SemanticIndex::new();
    for i in 0..50_001 {
        index.add(def(&format!("term{i}"), &format!("src/file{i}.rs"), 1));
    }
    index.save(tmp.path()).unwrap();

    let raw = fs::read_to_string(tmp.path().join(".curator").join("semantic-index.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc.get("type").and_then(|v| v.as_str()), Some("large_index_summary"));
    let top_terms = doc.get("top_terms").and_then(|v| v.as_array()).unwrap();
    assert!(top_terms.len() <= 100);

    // A summary document doesn't count as a persisted full index.
    assert!(SemanticIndex::load(tmp.path()).unwrap().is_none());

    // A fresh service over the same root starts from empty state rather
    // than trying (and failing) to rehydrate the summary.
    let service = CuratorService::new(tmp.path()).unwrap();
    let stats = service.stats();
    assert_eq!(stats.total_definitions, 0);
    assert_eq!(stats.total_references, 0);
}

#[test]
fn deleting_the_last_file_leaves_an_empty_serialized_document() {
    let tmp = tempfile::tempdir().unwrap();
    let mut index = SemanticIndex::new();
    index.add(def("onlyHere", "src/only.rs", 1));
    index.save(tmp.path()).unwrap();

    index.remove_file("src/only.rs");
    assert_eq!(index.stats().total_definitions, 0);
    index.save(tmp.path()).unwrap();

    let loaded = SemanticIndex::load(tmp.path()).unwrap().unwrap();
    let stats = loaded.stats();
    assert_eq!(stats.total_definitions, 0);
    assert_eq!(stats.total_references, 0);
}
