//! Fact collectors that feed the graph assembler alongside the scanners.
//!
//! Each collector is a plain function (or a small strategy type) over text
//! or paths that returns typed records:
//!
//! - `imports`, `variables`, `logging`, `integrations`, `versions` and the
//!   gettext half of `localization` read Python source text
//! - `dependencies`, `config_files`, `docs`, `file_types` and the catalog
//!   half of `localization` read project files

pub mod config_files;
pub mod dependencies;
pub mod docs;
pub mod file_types;
pub mod imports;
pub mod integrations;
pub mod localization;
pub mod logging;
pub mod variables;
pub mod versions;

pub use config_files::{config_kind_for, parse_config, ConfigRecord};
pub use dependencies::{
    build_tool_for, parse_dependencies, parse_requirement, project_build_tool, Dependency,
};
pub use docs::{is_documentation_file, parse_sections, DocCoverage, Section};
pub use file_types::{classify_file, FileInfo};
pub use imports::extract_imports;
pub use integrations::{extract_integrations, Integration};
pub use localization::{
    extract_gettext_messages, is_mo, locale_from_path, parse_po, PoEntry, UNKNOWN_LOCALE,
};
pub use logging::{LogEntry, LogExtractor, LogStrategy, RegexLogExtractor, SyntaxTreeLogExtractor};
pub use variables::{extract_variables, VariableInfo};
pub use versions::{extract_version_constraints, project_python_version, VersionInfo};
