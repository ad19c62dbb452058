//! YAML extractor (spec §4.E).

use std::sync::OnceLock;

use regex::Regex;

use super::common::definition_at;
use super::Extractor;
use crate::model::{DefinitionKind, ExtractionResult};

pub struct YamlExtractor;

macro_rules! lazy_re {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).unwrap())
        }
    };
}

lazy_re!(key_re, r"^(\s*)(?:-\s*)?([A-Za-z_][\w.-]*)\s*:");

fn context_kind(path: &str) -> Option<&'static str> {
    let file = super::file_name(path);
    if file == "docker-compose.yml" || file == "docker-compose.yaml" {
        Some("docker_compose")
    } else if path.contains(".github/workflows/") {
        Some("github_actions")
    } else if file == ".gitlab-ci.yml" {
        Some("gitlab_ci")
    } else if path.contains("/tasks/") || path.contains("playbook") {
        Some("ansible")
    } else if path.contains("/k8s/") || path.contains("/kubernetes/") {
        Some("kubernetes")
    } else {
        None
    }
}

impl Extractor for YamlExtractor {
    fn matches(&self, path: &str, _content: &str) -> bool {
        super::has_extension(path, &[".yaml", ".yml"])
    }

    fn name(&self) -> &'static str {
        "yaml"
    }

    fn extract(&self, content: &str, path: &str) -> ExtractionResult {
        let mut result = ExtractionResult::new();
        let lines: Vec<&str> = content.lines().collect();
        let kind_hint = context_kind(path);

        for (idx, line) in lines.iter().enumerate() {
            if line.trim_start().starts_with('#') {
                continue;
            }
            let Some(c) = key_re().captures(line) else { continue };
            let indent = c[1].len();
            let key = c[2].to_string();
            let mut def = definition_at(&lines, idx, key, DefinitionKind::Variable, path, indent, "yaml");
            if let Some(hint) = kind_hint {
                def = def.with_attribute("context_kind", hint);
            }
            result.push_def(def);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_become_variable_definitions() {
        let src = "name: curator\nversion: 1.0\n";
        let result = YamlExtractor.extract(src, "config.yaml");
        let names: Vec<_> = result.definitions.iter().map(|d| d.term.as_str()).collect();
        assert!(names.contains(&"name"));
        assert!(names.contains(&"version"));
    }

    #[test]
    fn github_actions_workflow_is_flagged() {
        let src = "on: push\njobs:\n  build:\n    runs-on: ubuntu-latest\n";
        let result = YamlExtractor.extract(src, ".github/workflows/ci.yaml");
        let def = result.definitions.iter().find(|d| d.term == "on").unwrap();
        assert_eq!(def.attributes.get("context_kind").map(String::as_str), Some("github_actions"));
    }

    #[test]
    fn docker_compose_is_flagged() {
        let src = "services:\n  web:\n    image: nginx\n";
        let result = YamlExtractor.extract(src, "docker-compose.yml");
        let def = result.definitions.iter().find(|d| d.term == "services").unwrap();
        assert_eq!(def.attributes.get("context_kind").map(String::as_str), Some("docker_compose"));
    }
}
