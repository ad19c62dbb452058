//! `.env` extractor (spec §4.E).

use std::sync::OnceLock;

use regex::Regex;

use super::common::{definition_at, is_secret_name, mask_secret};
use super::Extractor;
use crate::model::{DefinitionKind, ExtractionResult};

pub struct EnvExtractor;

macro_rules! lazy_re {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).unwrap())
        }
    };
}

// Quoted values are matched separately so a `#` inside the quotes isn't
// mistaken for the start of a trailing comment.
lazy_re!(assign_quoted_re, r#"^\s*(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=\s*"([^"]*)"\s*(?:#.*)?$"#);
lazy_re!(assign_plain_re, r#"^\s*(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=\s*([^#]*?)\s*(?:#.*)?$"#);

fn category(name: &str) -> &'static str {
    let upper = name.to_uppercase();
    if upper.contains("DB") || upper.contains("DATABASE") || upper.contains("POSTGRES") || upper.contains("MYSQL") || upper.contains("REDIS") {
        "db"
    } else if upper.contains("AUTH") || upper.contains("JWT") || upper.contains("OAUTH") {
        "auth"
    } else if upper.contains("API") {
        "api"
    } else if upper.contains("URL") || upper.contains("URI") || upper.contains("HOST") {
        "url"
    } else if upper.contains("PORT") {
        "port"
    } else {
        "other"
    }
}

impl Extractor for EnvExtractor {
    fn matches(&self, path: &str, _content: &str) -> bool {
        let file = super::file_name(path);
        file == ".env" || file.starts_with(".env.")
    }

    fn name(&self) -> &'static str {
        "env"
    }

    fn extract(&self, content: &str, path: &str) -> ExtractionResult {
        let mut result = ExtractionResult::new();
        let lines: Vec<&str> = content.lines().collect();

        for (idx, line) in lines.iter().enumerate() {
            if line.trim_start().starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let Some(c) = assign_quoted_re().captures(line).or_else(|| assign_plain_re().captures(line)) else {
                continue;
            };
            let name = c[1].to_string();
            let value = c[2].trim();

            let mut def = definition_at(&lines, idx, name.clone(), DefinitionKind::Variable, path, 0, "env")
                .with_attribute("category", category(&name));

            if is_secret_name(&name) && !value.is_empty() {
                def = def.with_attribute("masked_value", mask_secret(value));
            }

            result.push_def(def);
        }

        result
    }
}
