//! Shell extractor (spec §4.E).

use std::sync::OnceLock;

use regex::Regex;

use super::common::definition_at;
use super::Extractor;
use crate::location::Location;
use crate::model::{CrossReference, DefinitionKind, ExtractionResult, RefKind};

pub struct ShellExtractor;

macro_rules! lazy_re {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).unwrap())
        }
    };
}

lazy_re!(func_keyword_re, r"^\s*function\s+([A-Za-z_][\w]*)\s*(?:\(\))?\s*\{?");
lazy_re!(func_paren_re, r"^\s*([A-Za-z_][\w]*)\s*\(\)\s*\{?");
lazy_re!(export_re, r"^\s*export\s+([A-Za-z_][\w]*)=?");
lazy_re!(alias_re, r#"^\s*alias\s+([A-Za-z_][\w]*)="#);
lazy_re!(trap_re, r#"^\s*trap\s+(?:'([^']*)'|"([^"]*)"|(\S+))\s+\w+"#);
lazy_re!(getopts_re, r#"^\s*getopts\s+"([^"]+)""#);

/// True if the file's first line is a `#!` shebang naming a shell
/// interpreter, covering extensionless scripts (spec §4.E). Handles both
/// a direct interpreter path (`#!/bin/bash`, with or without trailing
/// flags) and an `env`-wrapped one (`#!/usr/bin/env bash`).
fn has_shell_shebang(content: &str) -> bool {
    const SHELLS: &[&str] = &["sh", "bash", "zsh", "fish", "ksh", "dash"];
    content
        .lines()
        .next()
        .and_then(|first| first.strip_prefix("#!"))
        .is_some_and(|rest| {
            rest.split_whitespace()
                .filter_map(|word| word.rsplit('/').next())
                .any(|name| SHELLS.contains(&name))
        })
}

impl Extractor for ShellExtractor {
    fn matches(&self, path: &str, content: &str) -> bool {
        super::has_extension(path, &[".sh", ".bash", ".zsh", ".fish"]) || has_shell_shebang(content)
    }

    fn name(&self) -> &'static str {
        "shell"
    }

    fn extract(&self, content: &str, path: &str) -> ExtractionResult {
        let mut result = ExtractionResult::new();
        let lines: Vec<&str> = content.lines().collect();

        for (idx, line) in lines.iter().enumerate() {
            if line.trim_start().starts_with('#') {
                continue;
            }

            if let Some(c) = func_keyword_re().captures(line) {
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Function, path, 0, "shell"));
            } else if let Some(c) = func_paren_re().captures(line) {
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Function, path, 0, "shell"));
            } else if let Some(c) = export_re().captures(line) {
                result.push_def(
                    definition_at(&lines, idx, &c[1], DefinitionKind::Variable, path, 0, "shell").with_attribute("exported", "true"),
                );
            } else if let Some(c) = alias_re().captures(line) {
                result.push_def(definition_at(&lines, idx, &c[1], DefinitionKind::Function, path, 0, "shell").with_attribute("declaration", "alias"));
            }

            if let Some(c) = trap_re().captures(line) {
                let command = c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)).unwrap().as_str();
                result.push_ref(CrossReference::new(command, RefKind::Call, Location::new(path, idx + 1, 0), *line));
            }

            if let Some(c) = getopts_re().captures(line) {
                for flag in c[1].chars().filter(|ch| ch.is_alphanumeric()) {
                    result.push_ref(CrossReference::new(flag.to_string(), RefKind::Call, Location::new(path, idx + 1, 0), *line));
                }
            }
        }

        result
    }
}
