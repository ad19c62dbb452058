//! Component H: concept groups.
//!
//! A named, user-editable bundle of terms queried as a logical OR. Built-in
//! defaults can be overridden by project config entries of the same name.

use std::collections::BTreeMap;

use crate::config::{CustomGroupValue, ProjectConfig};

#[derive(Debug, Clone)]
pub struct ConceptGroup {
    pub name: String,
    pub description: String,
    pub emoji: Option<String>,
    pub terms: Vec<String>,
}

/// The 21 built-in concept groups from spec §4.H.
pub fn default_groups() -> Vec<ConceptGroup> {
    let data: &[(&str, &str, &[&str])] = &[
        ("auth", "Authentication and authorization", &["auth", "authenticate", "authorization", "login", "logout", "session", "token", "jwt", "oauth"]),
        ("database", "Database access and persistence", &["database", "db", "query", "schema", "migration", "model", "repository", "orm"]),
        ("cache", "Caching layers", &["cache", "memoize", "ttl", "invalidate", "redis", "lru"]),
        ("api", "API surface and routing", &["api", "endpoint", "route", "controller", "handler", "request", "response"]),
        ("error", "Error handling", &["error", "exception", "fail", "panic", "catch", "throw", "recover"]),
        ("user", "User domain model", &["user", "account", "profile", "member", "customer"]),
        ("payment", "Payments and billing", &["payment", "billing", "invoice", "charge", "subscription", "checkout"]),
        ("config", "Configuration", &["config", "configuration", "settings", "env", "environment"]),
        ("test", "Testing", &["test", "spec", "mock", "stub", "fixture", "assert"]),
        ("async", "Asynchronous execution", &["async", "await", "promise", "future", "coroutine", "task"]),
        ("service", "Service layer", &["service", "provider", "manager", "factory"]),
        ("flow", "Control flow", &["flow", "pipeline", "workflow", "state", "transition"]),
        ("architecture", "Architectural components", &["module", "component", "layer", "boundary"]),
        ("import", "Imports and dependencies", &["import", "require", "dependency", "module"]),
        ("interface", "Interfaces and contracts", &["interface", "contract", "protocol", "trait", "abstract"]),
        ("state", "State management", &["state", "store", "reducer", "mutation", "context"]),
        ("event", "Events and messaging", &["event", "emit", "listener", "subscribe", "publish", "dispatch"]),
        ("logging", "Logging and observability", &["log", "logger", "logging", "trace", "metric", "telemetry"]),
        ("security", "Security", &["security", "encrypt", "decrypt", "sanitize", "validate", "csrf", "xss"]),
        ("build", "Build tooling", &["build", "compile", "bundle", "webpack", "rollup", "vite"]),
        ("deploy", "Deployment", &["deploy", "deployment", "release", "rollout", "ci", "cd"]),
    ];
    data.iter()
        .map(|(name, desc, terms)| ConceptGroup {
            name: name.to_string(),
            description: desc.to_string(),
            emoji: None,
            terms: terms.iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}

/// Registry of concept groups: built-ins, overridden by same-named entries
/// in the project config.
pub struct GroupRegistry {
    groups: BTreeMap<String, ConceptGroup>,
}

impl GroupRegistry {
    pub fn new(config: &ProjectConfig) -> GroupRegistry {
        let mut groups: BTreeMap<String, ConceptGroup> =
            default_groups().into_iter().map(|g| (g.name.clone(), g)).collect();

        for (name, value) in &config.custom_groups {
            groups.insert(name.clone(), custom_to_group(name, value));
        }

        GroupRegistry { groups }
    }

    pub fn list(&self) -> Vec<&ConceptGroup> {
        self.groups.values().collect()
    }

    pub fn terms_for(&self, name: &str) -> Option<&[String]> {
        self.groups.get(name).map(|g| g.terms.as_slice())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }
}

fn custom_to_group(name: &str, value: &CustomGroupValue) -> ConceptGroup {
    ConceptGroup {
        name: name.to_string(),
        description: value.description().unwrap_or("").to_string(),
        emoji: value.emoji().map(|s| s.to_string()),
        terms: value.terms().to_vec(),
    }
}
