//! Swift extractor (spec §4.E).

use std::sync::OnceLock;

use regex::Regex;

use super::common::definition_at;
use super::Extractor;
use crate::location::Location;
use crate::model::{CrossReference, DefinitionKind, ExtractionResult, RefKind};

pub struct SwiftExtractor;

macro_rules! lazy_re {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).unwrap())
        }
    };
}

const ACCESS_MODIFIERS: &[&str] = &["open", "public", "internal", "fileprivate", "private"];

lazy_re!(
    func_re,
    r"^\s*(?:@\w+\s+)*(?:(?:open|public|internal|fileprivate|private)\s+)?(?:static\s+|class\s+)?(?:mutating\s+)?func\s+([A-Za-z_]\w*|`[^`]+`)"
);
lazy_re!(
    type_re,
    r"^\s*(?:@\w+\s+)*(?:(?:open|public|internal|fileprivate|private)\s+)?(?:final\s+)?(class|struct|enum)\s+([A-Za-z_]\w*)\s*(?::\s*([^{]+))?\{"
);
lazy_re!(
    protocol_re,
    r"^\s*(?:(?:open|public|internal|fileprivate|private)\s+)?protocol\s+([A-Za-z_]\w*)"
);
lazy_re!(extension_re, r"^\s*extension\s+([A-Za-z_][\w.]*)");
lazy_re!(
    property_re,
    r"^\s*(?:@(\w+)\s+)*(?:(?:open|public|internal|fileprivate|private)\s+)?(?:static\s+)?(?:let|var)\s+([A-Za-z_]\w*)"
);

impl Extractor for SwiftExtractor {
    fn matches(&self, path: &str, _content: &str) -> bool {
        super::has_extension(path, &[".swift"])
    }

    fn name(&self) -> &'static str {
        "swift"
    }

    fn extract(&self, content: &str, path: &str) -> ExtractionResult {
        let mut result = ExtractionResult::new();
        let lines: Vec<&str> = content.lines().collect();
        let mut current_type: Option<String> = None;

        for (idx, line) in lines.iter().enumerate() {
            let indent = line.len() - line.trim_start().len();
            let trimmed = line.trim();

            if let Some(c) = type_re().captures(line) {
                let name = c[2].to_string();
                result.push_def(definition_at(&lines, idx, name.clone(), DefinitionKind::Class, path, indent, "swift"));
                if let Some(conforms) = c.get(3) {
                    for target in conforms.as_str().split(',') {
                        let target = target.trim();
                        if !target.is_empty() {
                            result.push_ref(CrossReference::new(target, RefKind::Implements, Location::new(path, idx + 1, indent), *line));
                        }
                    }
                }
                current_type = Some(name);
            } else if let Some(c) = protocol_re().captures(line) {
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Class, path, indent, "swift"));
            } else if let Some(c) = extension_re().captures(line) {
                result.push_ref(CrossReference::new(&c[1], RefKind::TypeReference, Location::new(path, idx + 1, indent), *line));
                current_type = Some(c[1].to_string());
            } else if let Some(c) = func_re().captures(line) {
                let name = c[1].trim_matches('`');
                let term = match &current_type {
                    Some(owner) => format!("{owner}.{name}"),
                    None => name.to_string(),
                };
                let mut def = definition_at(&lines, idx, term, DefinitionKind::Function, path, indent, "swift");
                for modifier in ACCESS_MODIFIERS {
                    if trimmed.starts_with(modifier) {
                        def = def.with_attribute("access", *modifier);
                        break;
                    }
                }
                result.push_def(def);
            } else if let Some(c) = property_re().captures(line) {
                let name = &c[2];
                let mut def = definition_at(&lines, idx, name, DefinitionKind::Variable, path, indent, "swift");
                if let Some(wrapper) = c.get(1) {
                    def = def.with_attribute("property_wrapper", wrapper.as_str());
                }
                result.push_def(def);
            }

            if trimmed == "}" && indent == 0 {
                current_type = None;
            }
        }

        result
    }
}
