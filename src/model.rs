//! The uniform `(Definition, CrossReference)` model every extractor produces.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::location::Location;

/// What kind of named entity a [`Definition`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    Function,
    Class,
    Variable,
    Constant,
    String,
    Comment,
    Import,
    File,
}

impl DefinitionKind {
    pub fn label(&self) -> &'static str {
        match self {
            DefinitionKind::Function => "function",
            DefinitionKind::Class => "class",
            DefinitionKind::Variable => "variable",
            DefinitionKind::Constant => "constant",
            DefinitionKind::String => "string",
            DefinitionKind::Comment => "comment",
            DefinitionKind::Import => "import",
            DefinitionKind::File => "file",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "function" => Some(DefinitionKind::Function),
            "class" => Some(DefinitionKind::Class),
            "variable" => Some(DefinitionKind::Variable),
            "constant" => Some(DefinitionKind::Constant),
            "string" => Some(DefinitionKind::String),
            "comment" => Some(DefinitionKind::Comment),
            "import" => Some(DefinitionKind::Import),
            "file" => Some(DefinitionKind::File),
            _ => None,
        }
    }
}

/// What kind of edge a [`CrossReference`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    Call,
    Import,
    Extends,
    Implements,
    Instantiation,
    TypeReference,
}

impl RefKind {
    pub fn label(&self) -> &'static str {
        match self {
            RefKind::Call => "call",
            RefKind::Import => "import",
            RefKind::Extends => "extends",
            RefKind::Implements => "implements",
            RefKind::Instantiation => "instantiation",
            RefKind::TypeReference => "type_reference",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "call" => Some(RefKind::Call),
            "import" => Some(RefKind::Import),
            "extends" => Some(RefKind::Extends),
            "implements" => Some(RefKind::Implements),
            "instantiation" => Some(RefKind::Instantiation),
            "type_reference" => Some(RefKind::TypeReference),
            _ => None,
        }
    }
}

/// A named entity extracted from source: `SemanticInfo` in spec terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub term: String,
    pub kind: DefinitionKind,
    pub location: Location,
    /// The source line, trimmed of trailing whitespace.
    pub context: String,
    /// Up to 5 lines centered on `location.line`.
    pub surrounding: Vec<String>,
    /// Other identifiers co-occurring on `location`'s line, excluding `term`.
    pub related: BTreeSet<String>,
    /// Canonical language tag, e.g. "typescript", "python".
    pub language: String,
    /// Language-specific attributes, e.g. `is_async`, `marker_kind`.
    pub attributes: BTreeMap<String, String>,
}

impl Definition {
    pub fn new(
        term: impl Into<String>,
        kind: DefinitionKind,
        location: Location,
        context: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Definition {
            term: term.into(),
            kind,
            location,
            context: context.into().trim_end().to_string(),
            surrounding: Vec::new(),
            related: BTreeSet::new(),
            language: language.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_related(mut self, related: BTreeSet<String>) -> Self {
        self.related = related;
        self
    }

    pub fn with_surrounding(mut self, surrounding: Vec<String>) -> Self {
        self.surrounding = surrounding;
        self
    }
}

/// A directed edge from a use site to a term: `CrossReference` in spec terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossReference {
    pub target_term: String,
    pub ref_kind: RefKind,
    pub from: Location,
    /// The source line at `from`.
    pub context: String,
}

impl CrossReference {
    pub fn new(
        target_term: impl Into<String>,
        ref_kind: RefKind,
        from: Location,
        context: impl Into<String>,
    ) -> Self {
        CrossReference {
            target_term: target_term.into(),
            ref_kind,
            from,
            context: context.into().trim_end().to_string(),
        }
    }
}

/// The output of a single extractor invocation.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    pub definitions: Vec<Definition>,
    pub references: Vec<CrossReference>,
}

impl ExtractionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_def(&mut self, def: Definition) {
        self.definitions.push(def);
    }

    pub fn push_ref(&mut self, reference: CrossReference) {
        self.references.push(reference);
    }
}
