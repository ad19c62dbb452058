//! Project config schema (spec §6) and tolerant loading.
//!
//! Looks for `.curatorconfig.json`, then `.curatorrc.json`, then `.curatorrc`
//! under the project root, in that order, the first one present wins. A
//! missing or malformed file degrades to `ProjectConfig::default()` plus a
//! warning — grounded on `server/src/init.rs`'s tolerant parse-or-fallback
//! handling of `.codescope.toml`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Filenames checked under the project root, in precedence order.
pub const CONFIG_FILENAMES: &[&str] = &[".curatorconfig.json", ".curatorrc.json", ".curatorrc"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default, rename = "customGroups")]
    pub custom_groups: BTreeMap<String, CustomGroupValue>,
}

/// A custom concept group: either a bare term list, or an object with an
/// optional description/emoji alongside the term list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomGroupValue {
    Terms(Vec<String>),
    Full {
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        emoji: Option<String>,
        terms: Vec<String>,
    },
}

impl CustomGroupValue {
    pub fn terms(&self) -> &[String] {
        match self {
            CustomGroupValue::Terms(t) => t,
            CustomGroupValue::Full { terms, .. } => terms,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            CustomGroupValue::Terms(_) => None,
            CustomGroupValue::Full { description, .. } => description.as_deref(),
        }
    }

    pub fn emoji(&self) -> Option<&str> {
        match self {
            CustomGroupValue::Terms(_) => None,
            CustomGroupValue::Full { emoji, .. } => emoji.as_deref(),
        }
    }
}

impl ProjectConfig {
    /// Load from the first config file present under `root`; defaults
    /// (empty exclude/include/customGroups) on anything missing or invalid.
    pub fn load(root: &Path) -> ProjectConfig {
        for name in CONFIG_FILENAMES {
            let path = root.join(name);
            if !path.is_file() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(text) => match serde_json::from_str::<ProjectConfig>(&text) {
                    Ok(config) => return config,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                        return ProjectConfig::default();
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unreadable config, using defaults");
                    return ProjectConfig::default();
                }
            }
        }
        ProjectConfig::default()
    }

    /// The effective exclusion list: built-in defaults merged with the
    /// config's `exclude`.
    pub fn merged_exclusions(&self) -> Vec<String> {
        let mut merged = crate::discovery::default_exclusions();
        merged.extend(self.exclude.iter().cloned());
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ProjectConfig::load(tmp.path());
        assert!(config.exclude.is_empty());
        assert!(config.custom_groups.is_empty());
    }

    #[test]
    fn invalid_json_degrades_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(".curatorconfig.json"), "{ not json").unwrap();
        let config = ProjectConfig::load(tmp.path());
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn parses_bare_and_full_custom_groups() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(".curatorconfig.json"),
            r#"{
                "exclude": ["vendor"],
                "customGroups": {
                    "bare": ["x", "y"],
                    "full": {"description": "d", "emoji": "🔥", "terms": ["z"]}
                }
            }"#,
        )
        .unwrap();
        let config = ProjectConfig::load(tmp.path());
        assert_eq!(config.exclude, vec!["vendor".to_string()]);
        assert_eq!(config.custom_groups["bare"].terms(), &["x".to_string(), "y".to_string()]);
        assert_eq!(config.custom_groups["full"].terms(), &["z".to_string()]);
        assert_eq!(config.custom_groups["full"].description(), Some("d"));
    }

    #[test]
    fn config_filename_precedence_prefers_curatorconfig_json() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(".curatorconfig.json"), r#"{"exclude": ["a"]}"#).unwrap();
        std::fs::write(tmp.path().join(".curatorrc.json"), r#"{"exclude": ["b"]}"#).unwrap();
        let config = ProjectConfig::load(tmp.path());
        assert_eq!(config.exclude, vec!["a".to_string()]);
    }
}
