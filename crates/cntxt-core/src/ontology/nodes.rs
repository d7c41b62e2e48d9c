//! Node records, one per node kind.
//!
//! `NodePayload` is internally tagged by `type`, so a node serializes as
//! `{"id": ..., "type": "class", "name": ...}` with a fixed field set per kind.

use serde::{Deserialize, Serialize};

use super::{NodeId, NodeKind};

/// A node in the knowledge graph.
///
/// `payload` is `None` for implicit endpoints: ids an edge referenced before
/// anything was recorded under them. Those serialize as `{"id": ...}` only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: NodeId,
    #[serde(flatten)]
    pub payload: Option<NodePayload>,
}

impl GraphNode {
    /// The kind of this node, if it carries a payload.
    pub fn kind(&self) -> Option<NodeKind> {
        self.payload.as_ref().map(NodePayload::kind)
    }
}

/// A unified node record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodePayload {
    File(FileEntity),
    Class(ClassEntity),
    Method(CallableEntity),
    Function(CallableEntity),
    Variable(VariableEntity),
    Import(NamedEntity),
    Decorator(NamedEntity),
    Comment(CommentEntity),
    LogStatement(LogStatementEntity),
    #[serde(rename = "api_integration")]
    Integration(IntegrationEntity),
    Version(VersionEntity),
    Localization(LocalizationEntity),
    Dependency(DependencyEntity),
    BuildScript(BuildScriptEntity),
    Config(ConfigEntity),
    Documentation(DocumentationEntity),
    Project(NamedEntity),
}

impl NodePayload {
    /// Get the kind of this record.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::File(_) => NodeKind::File,
            Self::Class(_) => NodeKind::Class,
            Self::Method(_) => NodeKind::Method,
            Self::Function(_) => NodeKind::Function,
            Self::Variable(_) => NodeKind::Variable,
            Self::Import(_) => NodeKind::Import,
            Self::Decorator(_) => NodeKind::Decorator,
            Self::Comment(_) => NodeKind::Comment,
            Self::LogStatement(_) => NodeKind::LogStatement,
            Self::Integration(_) => NodeKind::Integration,
            Self::Version(_) => NodeKind::Version,
            Self::Localization(_) => NodeKind::Localization,
            Self::Dependency(_) => NodeKind::Dependency,
            Self::BuildScript(_) => NodeKind::BuildScript,
            Self::Config(_) => NodeKind::Config,
            Self::Documentation(_) => NodeKind::Documentation,
            Self::Project(_) => NodeKind::Project,
        }
    }
}

// =============================================================================
// STRUCTURE
// =============================================================================

/// A file in the analyzed tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntity {
    /// Path relative to the analyzed root, `/`-separated
    pub path: String,

    /// Detected text encoding
    pub encoding: String,

    /// `SOURCE_CODE` for Python sources, the lowercased extension otherwise
    #[serde(rename = "fileType")]
    pub file_type: String,

    /// Coarse category for files that are not Python sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<FileCategory>,

    /// What the file is for, inferred from path and content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<FilePurpose>,
}

/// A record that is nothing but a name (imports, decorators, the project).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub name: String,
}

/// Coarse file category, from the extension and a binary sniff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    SourceCode,
    Text,
    Documentation,
    Config,
    Image,
    Video,
    Audio,
    Archive,
    Data,
    Binary,
    Other,
}

/// Inferred purpose of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilePurpose {
    TestCode,
    Documentation,
    ExampleCode,
    Configuration,
    Data,
    Asset,
    SourceCode,
    ExecutableScript,
    Other,
}

// =============================================================================
// CODE
// =============================================================================

/// A class, keyed by bare name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassEntity {
    pub name: String,

    /// Base class expressions as written
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

/// A function or method, keyed by bare name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallableEntity {
    pub name: String,

    /// Return annotation as written
    pub return_type: Option<String>,

    pub parameters: Vec<ParameterEntity>,

    /// Decorator text without the leading `@`
    pub decorators: Vec<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_async: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_generator: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

/// A parameter of a function or method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterEntity {
    pub name: String,

    #[serde(rename = "type")]
    pub type_hint: Option<String>,

    pub default: Option<String>,
}

/// A module-level assignment, keyed by bare name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableEntity {
    pub name: String,

    /// Right-hand side as written, trailing comment removed
    pub value: String,

    pub type_hint: Option<String>,

    pub is_constant: bool,
}

/// A comment or docstring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentEntity {
    pub comment_type: CommentKind,
    pub content: String,
    pub line_number: usize,

    /// Name of the `def`/`class` a docstring belongs to
    pub associated_element: Option<String>,

    pub tags: Vec<String>,
}

/// What sort of comment a `CommentEntity` is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    Inline,
    Docstring,
    Todo,
    Fixme,
}

/// A `logging.<level>(...)` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogStatementEntity {
    pub level: LogLevel,
    pub message: String,
}

/// Standard library logging levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Parse a logging method name such as `warning`.
    pub fn from_method(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "DEBUG" => Some(Self::Debug),
            "INFO" => Some(Self::Info),
            "WARNING" => Some(Self::Warning),
            "ERROR" => Some(Self::Error),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }
}

// =============================================================================
// INTEGRATIONS AND VERSIONS
// =============================================================================

/// An external service, endpoint or library a file talks to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationEntity {
    pub name: String,

    /// Endpoint, when one is known; empty otherwise
    pub url: String,

    pub kind: IntegrationKind,
}

/// How an integration was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationKind {
    Url,
    ApiKey,
    ExternalLibrary,
    SdkInitialization,
    ServiceConnection,
    Credential,
}

/// Version constraints of one kind, shared by every file that states them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionEntity {
    pub version_type: VersionKind,
    pub constraints: Vec<String>,
}

/// The kinds of version information a file can state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionKind {
    PythonVersionConstraints,
    RequiresPython,
    Deprecated,
    CommentVersions,
    DeprecationWarnings,
}

impl VersionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PythonVersionConstraints => "python_version_constraints",
            Self::RequiresPython => "requires_python",
            Self::Deprecated => "deprecated",
            Self::CommentVersions => "comment_versions",
            Self::DeprecationWarnings => "deprecation_warnings",
        }
    }
}

// =============================================================================
// PROJECT FILES
// =============================================================================

/// A localization catalog, or a translated message used from code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizationEntity {
    /// Catalog path; absent for messages found in source code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    pub locale: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
}

/// A package a build script depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEntity {
    pub name: String,

    /// Version constraint as written; empty when unpinned
    pub version: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
}

/// A build or dependency manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildScriptEntity {
    pub path: String,
    pub build_tool: BuildTool,
}

/// Build tooling a manifest belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildTool {
    Setuptools,
    Requirements,
    Pipenv,
    Poetry,
    Unknown,
}

impl BuildTool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setuptools => "setuptools",
            Self::Requirements => "requirements",
            Self::Pipenv => "pipenv",
            Self::Poetry => "poetry",
            Self::Unknown => "unknown",
        }
    }
}

/// A configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntity {
    pub path: String,
    pub config_type: ConfigKind,

    /// Top-level keys (or sections) in file order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
}

/// Configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigKind {
    #[serde(rename = "environment")]
    Env,
    #[serde(rename = "ini")]
    Ini,
    #[serde(rename = "config")]
    Cfg,
    #[serde(rename = "yaml")]
    Yaml,
    #[serde(rename = "json")]
    Json,
}

/// A documentation file, reduced to its section titles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentationEntity {
    pub path: String,
    pub sections: Vec<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}
