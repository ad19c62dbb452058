//! Python extractor (spec §4.E).

use std::sync::OnceLock;

use regex::Regex;

use super::common::definition_at;
use super::Extractor;
use crate::location::Location;
use crate::model::{CrossReference, DefinitionKind, ExtractionResult, RefKind};

pub struct PythonExtractor;

macro_rules! lazy_re {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).unwrap())
        }
    };
}

lazy_re!(def_re, r"^(\s*)(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\(");
lazy_re!(class_re, r"^(\s*)class\s+([A-Za-z_]\w*)\s*(?:\(([^)]*)\))?\s*:");
lazy_re!(decorator_re, r"^\s*@([A-Za-z_][\w.]*)");
lazy_re!(const_re, r"^([A-Z][A-Z0-9_]*)\s*(?::[^=]+)?=");
lazy_re!(import_re, r"^\s*import\s+([\w.]+)(?:\s+as\s+(\w+))?");
lazy_re!(from_import_re, r"^\s*from\s+([\w.]+)\s+import\s+(.+)");
lazy_re!(docstring_re, r#"^\s*(?:"""|''')(.*)"#);

fn indent_of(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

impl Extractor for PythonExtractor {
    fn matches(&self, path: &str, _content: &str) -> bool {
        super::has_extension(path, &[".py"])
    }

    fn name(&self) -> &'static str {
        "python"
    }

    fn extract(&self, content: &str, path: &str) -> ExtractionResult {
        let mut result = ExtractionResult::new();
        let lines: Vec<&str> = content.lines().collect();
        // Stack of (indent, class name) so nested defs resolve to the
        // innermost enclosing class.
        let mut class_stack: Vec<(usize, String)> = Vec::new();
        let mut pending_decorators: Vec<String> = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let indent = indent_of(line);
            while class_stack.last().is_some_and(|(i, _)| indent <= *i) {
                class_stack.pop();
            }

            if let Some(c) = decorator_re().captures(line) {
                pending_decorators.push(c[1].to_string());
                continue;
            }

            if let Some(c) = class_re().captures(line) {
                let name = c[2].to_string();
                result.push_def(definition_at(&lines, idx, name.clone(), DefinitionKind::Class, path, indent, "python"));
                if let Some(bases) = c.get(3) {
                    for base in bases.as_str().split(',') {
                        let base = base.trim();
                        if !base.is_empty() && base != "object" {
                            result.push_ref(CrossReference::new(base, RefKind::Extends, Location::new(path, idx + 1, indent), *line));
                        }
                    }
                }
                emit_decorator_refs(&mut result, &mut pending_decorators, path, idx, line);
                class_stack.push((indent, name));
                maybe_docstring(&mut result, &lines, idx, path);
                continue;
            }

            if let Some(c) = def_re().captures(line) {
                let name = &c[2];
                let term = match class_stack.last() {
                    Some((_, class_name)) => format!("{class_name}.{name}"),
                    None => name.to_string(),
                };
                let mut def = definition_at(&lines, idx, term, DefinitionKind::Function, path, indent, "python");
                if name.starts_with("__") && name.ends_with("__") {
                    def = def.with_attribute("dunder", "true");
                }
                result.push_def(def);
                emit_decorator_refs(&mut result, &mut pending_decorators, path, idx, line);
                maybe_docstring(&mut result, &lines, idx, path);
                continue;
            }

            pending_decorators.clear();

            if indent == 0 {
                if let Some(c) = const_re().captures(line) {
                    result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Constant, path, 0, "python"));
                }
            }

            if let Some(c) = from_import_re().captures(line) {
                let module = c[1].to_string();
                for name in c[2].split(',') {
                    let name = name.split(" as ").next().unwrap_or(name).trim();
                    if name.is_empty() || name == "*" {
                        continue;
                    }
                    result.push_def(definition_at(&lines, idx, format!("{module}.{name}"), DefinitionKind::Import, path, 0, "python"));
                }
                result.push_ref(CrossReference::new(module, RefKind::Import, Location::new(path, idx + 1, 0), *line));
            } else if let Some(c) = import_re().captures(line) {
                let module = c[1].to_string();
                result.push_def(definition_at(&lines, idx, module.clone(), DefinitionKind::Import, path, 0, "python"));
                result.push_ref(CrossReference::new(module, RefKind::Import, Location::new(path, idx + 1, 0), *line));
            }
        }

        result
    }
}

fn emit_decorator_refs(result: &mut ExtractionResult, pending: &mut Vec<String>, path: &str, idx: usize, line: &str) {
    for decorator in pending.drain(..) {
        result.push_ref(CrossReference::new(decorator, RefKind::Call, Location::new(path, idx + 1, 0), line));
    }
}

fn maybe_docstring(result: &mut ExtractionResult, lines: &[&str], header_idx: usize, path: &str) {
    if let Some(next) = lines.get(header_idx + 1) {
        if let Some(c) = docstring_re().captures(next) {
            let text = c[1].trim().to_string();
            if !text.is_empty() {
                result.push_def(definition_at(lines, header_idx + 1, text, DefinitionKind::Comment, path, 0, "python"));
            }
        }
    }
}
