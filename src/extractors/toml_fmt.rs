//! TOML extractor (spec §4.E).

use std::sync::OnceLock;

use regex::Regex;

use super::common::definition_at;
use super::Extractor;
use crate::location::Location;
use crate::model::{CrossReference, DefinitionKind, ExtractionResult, RefKind};

pub struct TomlExtractor;

macro_rules! lazy_re {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).unwrap())
        }
    };
}

lazy_re!(table_re, r"^\s*\[([\w.-]+)\]");
lazy_re!(key_value_re, r#"^\s*([A-Za-z_][\w-]*)\s*="#);

const DEPENDENCY_TABLES: &[&str] = &["dependencies", "dev-dependencies", "build-dependencies"];

impl Extractor for TomlExtractor {
    fn matches(&self, path: &str, _content: &str) -> bool {
        super::has_extension(path, &[".toml"])
    }

    fn name(&self) -> &'static str {
        "toml"
    }

    fn extract(&self, content: &str, path: &str) -> ExtractionResult {
        let mut result = ExtractionResult::new();
        let lines: Vec<&str> = content.lines().collect();
        let is_cargo_toml = super::file_name(path) == "Cargo.toml";
        let mut current_table: Option<String> = None;

        for (idx, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with('#') {
                continue;
            }

            if let Some(c) = table_re().captures(line) {
                let name = c[1].to_string();
                result.push_def(definition_at(&lines, idx, name.clone(), DefinitionKind::Variable, path, 0, "toml").with_attribute("declaration", "table"));
                current_table = Some(name);
                continue;
            }

            if let Some(c) = key_value_re().captures(line) {
                let key = c[1].to_string();
                let is_dependency_table = current_table.as_deref().map(|t| DEPENDENCY_TABLES.iter().any(|d| t == *d || t.ends_with(&format!(".{d}")))).unwrap_or(false);
                if is_cargo_toml && is_dependency_table {
                    result.push_def(definition_at(&lines, idx, key.clone(), DefinitionKind::Import, path, 0, "toml"));
                    result.push_ref(CrossReference::new(key, RefKind::Import, Location::new(path, idx + 1, 0), *line));
                } else {
                    result.push_def(definition_at(&lines, idx, key, DefinitionKind::Variable, path, 0, "toml"));
                }
            }
        }

        result
    }
}
