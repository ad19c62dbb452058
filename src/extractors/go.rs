//! Go extractor (spec §4.E).

use std::sync::OnceLock;

use regex::Regex;

use super::common::definition_at;
use super::Extractor;
use crate::location::Location;
use crate::model::{CrossReference, DefinitionKind, ExtractionResult, RefKind};

pub struct GoExtractor;

macro_rules! lazy_re {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).unwrap())
        }
    };
}

lazy_re!(package_re, r"^\s*package\s+(\w+)");
lazy_re!(func_receiver_re, r"^\s*func\s*\(\s*\w+\s+\*?([A-Za-z_]\w*)\s*\)\s*([A-Za-z_]\w*)\s*\(");
lazy_re!(func_plain_re, r"^\s*func\s+([A-Za-z_]\w*)\s*\(");
lazy_re!(struct_re, r"^\s*type\s+([A-Za-z_]\w*)\s+struct\s*\{");
lazy_re!(interface_re, r"^\s*type\s+([A-Za-z_]\w*)\s+interface\s*\{");
lazy_re!(const_single_re, r"^\s*const\s+([A-Za-z_]\w*)");
lazy_re!(var_single_re, r"^\s*var\s+([A-Za-z_]\w*)");
lazy_re!(block_entry_re, r"^\s*([A-Za-z_]\w*)\s*(?:[=\s]|$)");
lazy_re!(import_aliased_re, r#"^\s*([A-Za-z_]\w*)\s+"([^"]+)""#);
lazy_re!(import_plain_re, r#"^\s*"([^"]+)""#);
lazy_re!(embedded_field_re, r"^\s*\*?([A-Za-z_]\w*(?:\.[A-Za-z_]\w*)?)\s*$");

impl Extractor for GoExtractor {
    fn matches(&self, path: &str, _content: &str) -> bool {
        super::has_extension(path, &[".go"])
    }

    fn name(&self) -> &'static str {
        "go"
    }

    fn extract(&self, content: &str, path: &str) -> ExtractionResult {
        let mut result = ExtractionResult::new();
        let lines: Vec<&str> = content.lines().collect();

        let mut struct_stack: Vec<(usize, String)> = Vec::new();
        let mut in_const_block = false;
        let mut in_var_block = false;
        let mut in_import_block = false;
        let mut current_func_idx: Option<usize> = None;

        for (idx, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            let indent = line.len() - line.trim_start().len();

            if trimmed == ")" {
                in_const_block = false;
                in_var_block = false;
                in_import_block = false;
                continue;
            }
            while struct_stack.last().is_some_and(|(i, _)| indent <= *i && !trimmed.is_empty()) {
                struct_stack.pop();
            }

            if let Some(c) = package_re().captures(line) {
                result.push_def(
                    definition_at(&lines, idx, &c[1], DefinitionKind::File, path, 0, "go")
                        .with_attribute("declaration", "package"),
                );
                continue;
            }

            if let Some(c) = func_receiver_re().captures(line) {
                let term = format!("{}.{}", &c[1], &c[2]);
                result.push_def(definition_at(&lines, idx, term, DefinitionKind::Function, path, indent, "go"));
                current_func_idx = Some(result.definitions.len() - 1);
                continue;
            }
            if let Some(c) = func_plain_re().captures(line) {
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Function, path, indent, "go"));
                current_func_idx = Some(result.definitions.len() - 1);
                continue;
            }

            if let Some(c) = struct_re().captures(line) {
                let name = c[1].to_string();
                result.push_def(definition_at(&lines, idx, name.clone(), DefinitionKind::Class, path, indent, "go"));
                struct_stack.push((indent, name));
                continue;
            }
            if let Some(c) = interface_re().captures(line) {
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Class, path, indent, "go"));
                continue;
            }

            if let Some((_, struct_name)) = struct_stack.last() {
                if let Some(c) = embedded_field_re().captures(line) {
                    result.push_ref(CrossReference::new(
                        c[1].to_string(),
                        RefKind::Extends,
                        Location::new(path, idx + 1, indent),
                        *line,
                    ));
                    let _ = struct_name;
                }
            }

            if trimmed == "const (" {
                in_const_block = true;
                continue;
            }
            if trimmed == "var (" {
                in_var_block = true;
                continue;
            }
            if trimmed == "import (" {
                in_import_block = true;
                continue;
            }

            if in_const_block || in_var_block {
                if let Some(c) = block_entry_re().captures(line) {
                    let kind = if in_const_block { DefinitionKind::Constant } else { DefinitionKind::Variable };
                    result.push_def(definition_at(&lines, idx, &c[1], kind, path, indent, "go"));
                }
            } else if let Some(c) = const_single_re().captures(line) {
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Constant, path, indent, "go"));
            } else if let Some(c) = var_single_re().captures(line) {
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Variable, path, indent, "go"));
            }

            if in_import_block {
                if let Some(c) = import_aliased_re().captures(line) {
                    let def = definition_at(&lines, idx, c[2].to_string(), DefinitionKind::Import, path, indent, "go")
                        .with_attribute("alias", c[1].to_string());
                    result.push_def(def);
                    result.push_ref(CrossReference::new(c[2].to_string(), RefKind::Import, Location::new(path, idx + 1, indent), *line));
                } else if let Some(c) = import_plain_re().captures(line) {
                    result.push_def(definition_at(&lines, idx, c[1].to_string(), DefinitionKind::Import, path, indent, "go"));
                    result.push_ref(CrossReference::new(c[1].to_string(), RefKind::Import, Location::new(path, idx + 1, indent), *line));
                }
            }

            if let Some(func_idx) = current_func_idx {
                if line.contains("<-") {
                    result.definitions[func_idx].attributes.entry("channel_ops".to_string()).or_insert_with(|| "true".to_string());
                }
            }
            if trimmed == "}" && indent == 0 {
                current_func_idx = None;
            }
        }

        result
    }
}
