//! A cross-language semantic code index: incremental extraction of
//! `(Definition, CrossReference)` pairs from a project tree, a tiered fuzzy
//! search index, and a pattern-algebra query engine over it.
//!
//! [`service::CuratorService`] is the intended entry point for an embedder
//! (CLI, editor plugin, MCP tool): it owns the update pipeline and the
//! concurrency discipline described in each module's doc comment.

pub mod batcher;
pub mod change_detector;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extractors;
pub mod groups;
pub mod index;
pub mod location;
pub mod model;
pub mod persistence;
pub mod query;
pub mod service;

pub use error::{IndexError, Result};
pub use index::{SearchOptions, SemanticIndex};
pub use model::{CrossReference, Definition, DefinitionKind, RefKind};
pub use query::QueryOptions;
pub use service::CuratorService;
