//! Rust extractor (spec §4.E).

use std::sync::OnceLock;

use regex::Regex;

use super::common::definition_at;
use super::Extractor;
use crate::location::Location;
use crate::model::{CrossReference, DefinitionKind, ExtractionResult, RefKind};

pub struct RustExtractor;

macro_rules! lazy_re {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).unwrap())
        }
    };
}

lazy_re!(fn_re, r#"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+"[^"]*"\s+)?fn\s+([A-Za-z_]\w*)"#);
lazy_re!(struct_re, r"^\s*(?:pub(?:\([^)]*\))?\s+)?struct\s+([A-Za-z_]\w*)");
lazy_re!(enum_re, r"^\s*(?:pub(?:\([^)]*\))?\s+)?enum\s+([A-Za-z_]\w*)");
lazy_re!(trait_re, r"^\s*(?:pub(?:\([^)]*\))?\s+)?trait\s+([A-Za-z_]\w*)");
lazy_re!(impl_trait_re, r"^\s*impl(?:<[^>]*>)?\s+([A-Za-z_][\w:]*)(?:<[^>]*>)?\s+for\s+([A-Za-z_][\w:]*)");
lazy_re!(impl_inherent_re, r"^\s*impl(?:<[^>]*>)?\s+([A-Za-z_][\w:]*)");
lazy_re!(mod_re, r"^\s*(?:pub(?:\([^)]*\))?\s+)?mod\s+([A-Za-z_]\w*)");
lazy_re!(use_re, r"^\s*(?:pub(?:\([^)]*\))?\s+)?use\s+([\w:{},\s*]+);");
lazy_re!(const_re, r"^\s*(?:pub(?:\([^)]*\))?\s+)?const\s+([A-Z_][A-Z0-9_]*)");
lazy_re!(static_re, r"^\s*(?:pub(?:\([^)]*\))?\s+)?static\s+(?:mut\s+)?([A-Z_][A-Z0-9_]*)");
lazy_re!(macro_rules_re, r"^\s*macro_rules!\s*([A-Za-z_]\w*)");
lazy_re!(derive_re, r"^\s*#\[derive\(([^)]*)\)\]");

impl Extractor for RustExtractor {
    fn matches(&self, path: &str, _content: &str) -> bool {
        super::has_extension(path, &[".rs"])
    }

    fn name(&self) -> &'static str {
        "rust"
    }

    fn extract(&self, content: &str, path: &str) -> ExtractionResult {
        let mut result = ExtractionResult::new();
        let lines: Vec<&str> = content.lines().collect();
        let mut pending_derives: Vec<String> = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            let indent = line.len() - line.trim_start().len();

            if let Some(c) = derive_re().captures(line) {
                for trait_name in c[1].split(',') {
                    pending_derives.push(trait_name.trim().to_string());
                }
                continue;
            }

            if let Some(c) = fn_re().captures(line) {
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Function, path, indent, "rust"));
            } else if let Some(c) = struct_re().captures(line) {
                let name = c[1].to_string();
                result.push_def(definition_at(&lines, idx, name.clone(), DefinitionKind::Class, path, indent, "rust"));
                flush_derives(&mut result, &mut pending_derives, &name, path, idx, line);
            } else if let Some(c) = enum_re().captures(line) {
                let name = c[1].to_string();
                result.push_def(definition_at(&lines, idx, name.clone(), DefinitionKind::Class, path, indent, "rust"));
                flush_derives(&mut result, &mut pending_derives, &name, path, idx, line);
            } else if let Some(c) = trait_re().captures(line) {
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Class, path, indent, "rust"));
            } else if let Some(c) = mod_re().captures(line) {
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::File, path, indent, "rust"));
            } else if let Some(c) = macro_rules_re().captures(line) {
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Function, path, indent, "rust").with_attribute("declaration", "macro_rules"));
            } else if let Some(c) = const_re().captures(line) {
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Constant, path, indent, "rust"));
            } else if let Some(c) = static_re().captures(line) {
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Constant, path, indent, "rust"));
            }

            if !derive_re().is_match(line) && !struct_re().is_match(line) && !enum_re().is_match(line) {
                pending_derives.clear();
            }

            if let Some(c) = impl_trait_re().captures(line) {
                result.push_ref(CrossReference::new(
                    c[1].to_string(),
                    RefKind::Implements,
                    Location::new(path, idx + 1, indent),
                    *line,
                ));
                let _ = &c[2];
            } else if let Some(c) = impl_inherent_re().captures(line) {
                result.push_ref(CrossReference::new(
                    c[1].to_string(),
                    RefKind::TypeReference,
                    Location::new(path, idx + 1, indent),
                    *line,
                ));
            }

            if let Some(c) = use_re().captures(line) {
                for path_part in split_use_tree(&c[1]) {
                    result.push_def(definition_at(&lines, idx, path_part.clone(), DefinitionKind::Import, path, indent, "rust"));
                    result.push_ref(CrossReference::new(path_part, RefKind::Import, Location::new(path, idx + 1, indent), *line));
                }
            }
        }

        result
    }
}

fn flush_derives(result: &mut ExtractionResult, pending: &mut Vec<String>, owner: &str, path: &str, idx: usize, line: &str) {
    for trait_name in pending.drain(..) {
        result.push_ref(CrossReference::new(trait_name, RefKind::TypeReference, Location::new(path, idx + 1, 0), line));
    }
    let _ = owner;
}

/// Splits a `use` path into its leaf segments, expanding a trailing
/// `{a, b, c}` group. Does not attempt full brace-nesting resolution.
fn split_use_tree(tree: &str) -> Vec<String> {
    let tree = tree.trim();
    if let Some(brace_idx) = tree.find('{') {
        let prefix = tree[..brace_idx].trim_end_matches("::").trim();
        let inner = tree[brace_idx + 1..].trim_end_matches('}');
        inner
            .split(',')
            .map(|leaf| leaf.trim())
            .filter(|leaf| !leaf.is_empty() && *leaf != "*")
            .map(|leaf| {
                if prefix.is_empty() {
                    leaf.to_string()
                } else {
                    format!("{prefix}::{leaf}")
                }
            })
            .collect()
    } else if tree.ends_with("::*") {
        vec![]
    } else {
        vec![tree.to_string()]
    }
}
