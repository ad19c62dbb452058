//! One representative fixture per supported language/format, checked
//! against expected `Definition`/`CrossReference` shapes.

use curator_core::extractors;
use curator_core::model::{DefinitionKind, RefKind};

fn names(result: &curator_core::model::ExtractionResult) -> Vec<&str> {
    result.definitions.iter().map(|d| d.term.as_str()).collect()
}

#[test]
fn typescript_fixture() {
    let src = r#"
import { Logger } from './logger';

export class UserService {
  authenticate(token) {
    return new Logger();
  }
}
"#;
    let reg = extractors::registry();
    let result = extractors::dispatch(&reg, src, "src/user_service.ts").unwrap();
    let names = names(&result);
    assert!(names.contains(&"UserService"));
    assert!(names.contains(&"UserService.authenticate"));
    assert!(result.references.iter().any(|r| r.target_term == "Logger" && r.ref_kind == RefKind::Instantiation));
}

#[test]
fn python_fixture() {
    let src = "class Repository:\n    def save(self, entity):\n        pass\n";
    let reg = extractors::registry();
    let result = extractors::dispatch(&reg, src, "app/repository.py").unwrap();
    let names = names(&result);
    assert!(names.contains(&"Repository"));
    assert!(names.contains(&"Repository.save"));
}

#[test]
fn go_fixture() {
    let src = "package main\n\nfunc (s *Server) Start() {\n}\n";
    let reg = extractors::registry();
    let result = extractors::dispatch(&reg, src, "main.go").unwrap();
    let names = names(&result);
    assert!(names.iter().any(|n| *n == "main"));
    assert!(names.contains(&"Server.Start"));
}

#[test]
fn rust_fixture() {
    let src = "pub struct Config {\n}\n\nimpl Config {\n    pub fn load() -> Self {\n        Config {}\n    }\n}\n";
    let reg = extractors::registry();
    let result = extractors::dispatch(&reg, src, "src/config.rs").unwrap();
    let names = names(&result);
    assert!(names.contains(&"Config"));
    assert!(names.contains(&"load"));
    assert!(result.references.iter().any(|r| r.target_term == "Config" && r.ref_kind == RefKind::TypeReference));
}

#[test]
fn swift_fixture() {
    let src = "struct Session: Codable {\n    func refresh() {\n    }\n}\n";
    let reg = extractors::registry();
    let result = extractors::dispatch(&reg, src, "Session.swift").unwrap();
    let names = names(&result);
    assert!(names.contains(&"Session"));
    assert!(names.contains(&"Session.refresh"));
    assert!(result.references.iter().any(|r| r.target_term == "Codable" && r.ref_kind == RefKind::Implements));
}

#[test]
fn shell_fixture() {
    let src = "export APP_ENV=production\n\ndeploy() {\n  echo ok\n}\n";
    let reg = extractors::registry();
    let result = extractors::dispatch(&reg, src, "scripts/deploy.sh").unwrap();
    let names = names(&result);
    assert!(names.contains(&"APP_ENV"));
    assert!(names.contains(&"deploy"));
}

#[test]
fn package_json_fixture() {
    let src = "{\n  \"scripts\": {\n    \"build\": \"tsc\"\n  },\n  \"dependencies\": {\n    \"react\": \"^18\"\n  }\n}\n";
    let reg = extractors::registry();
    let result = extractors::dispatch(&reg, src, "package.json").unwrap();
    let build = result.definitions.iter().find(|d| d.term == "build").unwrap();
    assert_eq!(build.kind, DefinitionKind::Function);
    let react = result.definitions.iter().find(|d| d.term == "react").unwrap();
    assert_eq!(react.kind, DefinitionKind::Import);
}

#[test]
fn yaml_fixture() {
    let src = "jobs:\n  build:\n    runs-on: ubuntu-latest\n";
    let reg = extractors::registry();
    let result = extractors::dispatch(&reg, src, ".github/workflows/ci.yaml").unwrap();
    let def = result.definitions.iter().find(|d| d.term == "jobs").unwrap();
    assert_eq!(def.attributes.get("context_kind").map(String::as_str), Some("github_actions"));
}

#[test]
fn cargo_toml_fixture() {
    let src = "[package]\nname = \"curator-core\"\n\n[dependencies]\nserde = \"1\"\n";
    let reg = extractors::registry();
    let result = extractors::dispatch(&reg, src, "Cargo.toml").unwrap();
    let dep = result.definitions.iter().find(|d| d.term == "serde").unwrap();
    assert_eq!(dep.kind, DefinitionKind::Import);
}

#[test]
fn env_file_fixture() {
    let src = "DATABASE_URL=postgres://localhost/app\nAPI_SECRET=s3cr3t\n";
    let reg = extractors::registry();
    let result = extractors::dispatch(&reg, src, ".env").unwrap();
    let secret = result.definitions.iter().find(|d| d.term == "API_SECRET").unwrap();
    assert!(secret.attributes.contains_key("masked_value"));
    assert!(!secret.attributes["masked_value"].contains("s3cr3t"));
}
