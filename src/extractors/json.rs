//! JSON extractor (spec §4.E).
//!
//! Stays line-oriented like every other extractor rather than building a
//! `serde_json::Value` tree, so a malformed document still yields partial
//! results instead of nothing.

use std::sync::OnceLock;

use regex::Regex;

use super::common::definition_at;
use super::Extractor;
use crate::location::Location;
use crate::model::{CrossReference, DefinitionKind, ExtractionResult, RefKind};

pub struct JsonExtractor;

macro_rules! lazy_re {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).unwrap())
        }
    };
}

lazy_re!(key_re, r#"^\s*"([^"]+)"\s*:"#);

const DEPENDENCY_SECTIONS: &[&str] = &["dependencies", "devDependencies", "peerDependencies", "optionalDependencies"];

impl Extractor for JsonExtractor {
    fn matches(&self, path: &str, _content: &str) -> bool {
        super::has_extension(path, &[".json", ".jsonc", ".json5"])
    }

    fn name(&self) -> &'static str {
        "json"
    }

    fn extract(&self, content: &str, path: &str) -> ExtractionResult {
        let mut result = ExtractionResult::new();
        let lines: Vec<&str> = content.lines().collect();
        let file = super::file_name(path);
        let is_package_json = file == "package.json";
        let is_tsconfig = file == "tsconfig.json" || file == "jsconfig.json";

        let mut section_stack: Vec<(usize, String)> = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            let indent = line.len() - line.trim_start().len();
            while section_stack.last().is_some_and(|(i, _)| indent <= *i) {
                section_stack.pop();
            }

            let Some(c) = key_re().captures(line) else { continue };
            let key = c[1].to_string();
            let in_section = |name: &str| section_stack.last().map(|(_, s)| s == name).unwrap_or(false);

            if is_package_json && in_section("scripts") {
                result.push_def(definition_at(&lines, idx, key.clone(), DefinitionKind::Function, path, indent, "json"));
            } else if is_package_json && DEPENDENCY_SECTIONS.iter().any(|s| in_section(s)) {
                result.push_def(definition_at(&lines, idx, key.clone(), DefinitionKind::Import, path, indent, "json"));
                result.push_ref(CrossReference::new(key.clone(), RefKind::Import, Location::new(path, idx + 1, indent), *line));
            } else if is_tsconfig && in_section("paths") {
                result.push_def(
                    definition_at(&lines, idx, key.clone(), DefinitionKind::Variable, path, indent, "json")
                        .with_attribute("context_kind", "path_mapping"),
                );
            } else {
                result.push_def(definition_at(&lines, idx, key.clone(), DefinitionKind::Variable, path, indent, "json"));
            }

            if line.trim_end().ends_with('{') {
                section_stack.push((indent, key));
            }
        }

        result
    }
}
