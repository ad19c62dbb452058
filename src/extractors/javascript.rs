//! JS/TS family extractor (spec §4.E).
//!
//! Line-oriented, regex-based — matches the spec's `context`/`surrounding`
//! data model rather than building an AST. Grounded on
//! `crates/core/src/conventions.rs`'s per-line regex scanning style.

use std::sync::OnceLock;

use regex::Regex;

use super::common::definition_at;
use super::Extractor;
use crate::location::Location;
use crate::model::{CrossReference, DefinitionKind, ExtractionResult, RefKind};

pub struct JavaScriptExtractor;

const EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs"];

const CONTROL_KEYWORDS: &[&str] =
    &["if", "for", "while", "switch", "catch", "function", "return", "typeof", "new", "do", "else"];

macro_rules! lazy_re {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).unwrap())
        }
    };
}

lazy_re!(fn_named_re, r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s+([A-Za-z_$][\w$]*)\s*\(");
lazy_re!(
    fn_arrow_re,
    r"^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?\([^)]*\)\s*(?::[^=]+)?=>"
);
lazy_re!(class_re, r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)");
lazy_re!(interface_re, r"^\s*(?:export\s+)?interface\s+([A-Za-z_$][\w$]*)");
lazy_re!(type_alias_re, r"^\s*(?:export\s+)?type\s+([A-Za-z_$][\w$]*)\s*=");
lazy_re!(method_re, r"^\s*(?:public\s+|private\s+|protected\s+)?(?:static\s+)?(?:async\s+)?(?:get\s+|set\s+)?([A-Za-z_$][\w$]*)\s*\([^)]*\)\s*(?::[^{]+)?\{\s*$");
lazy_re!(var_const_re, r"^\s*(?:export\s+)?(const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=]+)?=");
lazy_re!(import_from_re, r#"^\s*import\s+(.+?)\s+from\s+['"]([^'"]+)['"]"#);
lazy_re!(import_side_effect_re, r#"^\s*import\s+['"]([^'"]+)['"]"#);
lazy_re!(require_re, r#"require\(\s*['"]([^'"]+)['"]\s*\)"#);
lazy_re!(new_re, r"\bnew\s+([A-Za-z_$][\w$.]*)\s*\(");
lazy_re!(extends_re, r"\bclass\s+[A-Za-z_$][\w$]*\s+extends\s+([A-Za-z_$][\w$.]*)");
lazy_re!(implements_re, r"\bimplements\s+([A-Za-z_$][\w$.,\s]*?)\s*(?:\{|$)");
lazy_re!(call_re, r"\b([A-Za-z_$][\w$]*)\s*\(");
lazy_re!(jsx_re, r"<([A-Z][A-Za-z0-9]*)");

fn is_upper_snake(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_uppercase() || c == '_' || c.is_ascii_digit())
}

impl Extractor for JavaScriptExtractor {
    fn matches(&self, path: &str, _content: &str) -> bool {
        super::has_extension(path, EXTENSIONS)
    }

    fn name(&self) -> &'static str {
        "javascript"
    }

    fn extract(&self, content: &str, path: &str) -> ExtractionResult {
        let mut result = ExtractionResult::new();
        let lines: Vec<&str> = content.lines().collect();
        let mut current_class: Option<String> = None;

        for (idx, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            // Byte ranges on this line that a declaration regex already
            // claimed as a name, so call_re doesn't also read the same
            // identifier as a spurious self-call (e.g. `function login(`).
            let mut declared_ranges: Vec<(usize, usize)> = Vec::new();

            if let Some(c) = class_re().captures(line) {
                let name = c[1].to_string();
                declared_ranges.push((c.get(1).unwrap().start(), c.get(1).unwrap().end()));
                result.push_def(definition_at(&lines, idx, name.clone(), DefinitionKind::Class, path, 0, "typescript"));
                current_class = Some(name);
            } else if let Some(c) = interface_re().captures(line) {
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Class, path, 0, "typescript"));
            } else if let Some(c) = type_alias_re().captures(line) {
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Class, path, 0, "typescript"));
            } else if let Some(c) = fn_named_re().captures(line) {
                declared_ranges.push((c.get(1).unwrap().start(), c.get(1).unwrap().end()));
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Function, path, 0, "typescript"));
            } else if let Some(c) = fn_arrow_re().captures(line) {
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Function, path, 0, "typescript"));
            } else if let Some(class) = &current_class {
                if let Some(c) = method_re().captures(line) {
                    let method = &c[1];
                    if !CONTROL_KEYWORDS.contains(&method) {
                        declared_ranges.push((c.get(1).unwrap().start(), c.get(1).unwrap().end()));
                        let term = format!("{class}.{method}");
                        result.push_def(definition_at(&lines, idx, term, DefinitionKind::Function, path, 0, "typescript"));
                    }
                }
            }

            if trimmed == "}" {
                current_class = None;
            }

            if let Some(c) = var_const_re().captures(line) {
                if fn_arrow_re().is_match(line) {
                    // already handled above as a function
                } else {
                    let name = &c[2];
                    let kind = if is_upper_snake(name) { DefinitionKind::Constant } else { DefinitionKind::Variable };
                    result.push_def(definition_at(&lines, idx, name, kind, path, 0, "typescript"));
                }
            }

            if let Some(c) = import_from_re().captures(line) {
                let clause = c[1].trim();
                let module = c[2].to_string();
                let kind_attr = if clause.starts_with('{') {
                    "named"
                } else if clause.starts_with('*') {
                    "namespace"
                } else {
                    "default"
                };
                let def = definition_at(&lines, idx, module.clone(), DefinitionKind::Import, path, 0, "typescript")
                    .with_attribute("import_kind", kind_attr);
                result.push_def(def);
                result.push_ref(CrossReference::new(
                    module,
                    RefKind::Import,
                    Location::new(path, idx + 1, 0),
                    *line,
                ));
            } else if let Some(c) = import_side_effect_re().captures(line) {
                let module = c[1].to_string();
                result.push_def(
                    definition_at(&lines, idx, module.clone(), DefinitionKind::Import, path, 0, "typescript")
                        .with_attribute("import_kind", "side_effect"),
                );
                result.push_ref(CrossReference::new(module, RefKind::Import, Location::new(path, idx + 1, 0), *line));
            }

            if let Some(c) = require_re().captures(line) {
                let module = c[1].to_string();
                result.push_ref(CrossReference::new(module, RefKind::Import, Location::new(path, idx + 1, 0), *line));
            }

            if let Some(c) = extends_re().captures(line) {
                result.push_ref(CrossReference::new(&c[1], RefKind::Extends, Location::new(path, idx + 1, 0), *line));
            }

            if let Some(c) = implements_re().captures(line) {
                for name in c[1].split(',') {
                    let name = name.trim();
                    if !name.is_empty() {
                        result.push_ref(CrossReference::new(name, RefKind::Implements, Location::new(path, idx + 1, 0), *line));
                    }
                }
            }

            for c in new_re().captures_iter(line) {
                result.push_ref(CrossReference::new(&c[1], RefKind::Instantiation, Location::new(path, idx + 1, 0), *line));
            }

            for c in jsx_re().captures_iter(line) {
                result.push_ref(CrossReference::new(&c[1], RefKind::TypeReference, Location::new(path, idx + 1, 0), *line));
            }

            for c in call_re().captures_iter(line) {
                let name_match = c.get(1).unwrap();
                let name = name_match.as_str();
                let is_declaration = declared_ranges
                    .iter()
                    .any(|&(start, end)| name_match.start() == start && name_match.end() == end);
                if !CONTROL_KEYWORDS.contains(&name) && !is_declaration {
                    result.push_ref(CrossReference::new(name, RefKind::Call, Location::new(path, idx + 1, 0), *line));
                }
            }
        }

        result
    }
}
