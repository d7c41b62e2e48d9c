//! Default values for cntxt configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Scan Defaults
// ============================================================================

/// Directories never descended into.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    // Python caches and environments
    "__pycache__",
    ".venv",
    "env",
    "venv",
    ".mypy_cache",
    ".pytest_cache",
    ".eggs",
    ".tox",
    ".coverage",
    // Build outputs
    "build",
    "dist",
    "node_modules",
    // Version control
    ".git",
    ".svn",
    ".hg",
    // IDE/Editor
    ".idea",
    ".vscode",
];

/// File names skipped wherever they appear.
pub const DEFAULT_IGNORED_FILES: &[&str] = &[
    ".gitignore",
    ".DS_Store",
    "Thumbs.db",
    ".env",
    ".env.example",
];

/// Whether `.gitignore` rules prune the walk.
pub const DEFAULT_RESPECT_GITIGNORE: bool = false;

// ============================================================================
// Output Defaults
// ============================================================================

/// Directory the graph artifacts are written to, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "compression";

/// File name of the graph JSON.
pub const DEFAULT_GRAPH_FILE: &str = "code_knowledge_graph.json";

/// File name of the compressed text artifact.
pub const DEFAULT_COMPRESSED_FILE: &str = "compressed_knowledge_graph.txt";

/// File name of the Graphviz export.
pub const DEFAULT_DOT_FILE: &str = "knowledge_graph.dot";

/// Seconds to wait for the graph JSON to appear before compressing.
pub const DEFAULT_WAIT_SECS: u64 = 10;

// ============================================================================
// Metadata Defaults
// ============================================================================

/// Reported README path when none is found.
pub const DEFAULT_README_PATH: &str = "README.md";

/// Reported API docs path when none is found.
pub const DEFAULT_API_DOCS_PATH: &str = "docs/api.md";
