//! Knowledge Graph Ontology
//!
//! Defines the closed vocabulary of the code knowledge graph: the node kinds,
//! the relations that connect them, and the deterministic ids nodes are keyed by.
//!
//! ## Modules
//!
//! - `ids` - `NodeId` and its constructors, one per identity rule
//! - `nodes` - One record type per node kind, united by `NodePayload`

mod ids;
mod nodes;

pub use ids::*;
pub use nodes::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every kind of node the graph can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Class,
    Method,
    Function,
    Variable,
    Import,
    Decorator,
    Comment,
    LogStatement,
    #[serde(rename = "api_integration")]
    Integration,
    Version,
    Localization,
    Dependency,
    BuildScript,
    Config,
    Documentation,
    Project,
}

impl NodeKind {
    /// All node kinds, in declaration order.
    pub const ALL: [NodeKind; 17] = [
        NodeKind::File,
        NodeKind::Class,
        NodeKind::Method,
        NodeKind::Function,
        NodeKind::Variable,
        NodeKind::Import,
        NodeKind::Decorator,
        NodeKind::Comment,
        NodeKind::LogStatement,
        NodeKind::Integration,
        NodeKind::Version,
        NodeKind::Localization,
        NodeKind::Dependency,
        NodeKind::BuildScript,
        NodeKind::Config,
        NodeKind::Documentation,
        NodeKind::Project,
    ];

    /// The `type` tag written to the graph JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Class => "class",
            Self::Method => "method",
            Self::Function => "function",
            Self::Variable => "variable",
            Self::Import => "import",
            Self::Decorator => "decorator",
            Self::Comment => "comment",
            Self::LogStatement => "log_statement",
            Self::Integration => "api_integration",
            Self::Version => "version",
            Self::Localization => "localization",
            Self::Dependency => "dependency",
            Self::BuildScript => "build_script",
            Self::Config => "config",
            Self::Documentation => "documentation",
            Self::Project => "project",
        }
    }

    /// Parse a `type` tag back into a kind.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == tag)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The label on a directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relation {
    /// File defines a class or top-level function.
    Defines,
    /// Class owns a method.
    HasMethod,
    /// File imports a module or name.
    Imports,
    /// File carries a decorator.
    DecoratedWith,
    /// File binds a module-level variable.
    HasVariable,
    /// File contains a comment or docstring.
    HasComment,
    /// File emits a log statement or uses a translated message.
    Uses,
    /// File talks to an external service or library.
    IntegratesWith,
    /// File states a version constraint.
    HasVersion,
    /// File is described by a config record.
    ConfiguredBy,
    /// File holds a localization catalog.
    Contains,
    /// Build script depends on a package.
    DependsOn,
    /// Project is documented by a document.
    HasDocumentation,
}

impl Relation {
    /// The relation name written to the graph JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Defines => "DEFINES",
            Self::HasMethod => "HAS_METHOD",
            Self::Imports => "IMPORTS",
            Self::DecoratedWith => "DECORATED_WITH",
            Self::HasVariable => "HAS_VARIABLE",
            Self::HasComment => "HAS_COMMENT",
            Self::Uses => "USES",
            Self::IntegratesWith => "INTEGRATES_WITH",
            Self::HasVersion => "HAS_VERSION",
            Self::ConfiguredBy => "CONFIGURED_BY",
            Self::Contains => "CONTAINS",
            Self::DependsOn => "DEPENDS_ON",
            Self::HasDocumentation => "HAS_DOCUMENTATION",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
