//! Deterministic node identifiers.
//!
//! Every id is derived from the node kind plus a discriminating string, so the
//! same fact always lands on the same node. Classes, functions, methods and
//! variables are keyed by bare name: two files defining `Foo` share one node.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

/// Hex characters of the SHA-256 digest kept in content-hashed ids.
const HASH_LEN: usize = 16;

/// Identifier of a node in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn file(rel_path: &str) -> Self {
        Self(format!("File: {}", rel_path))
    }

    pub fn class(name: &str) -> Self {
        Self(format!("Class: {}", name))
    }

    pub fn method(name: &str) -> Self {
        Self(format!("Method: {}", name))
    }

    pub fn function(name: &str) -> Self {
        Self(format!("Function: {}", name))
    }

    pub fn variable(name: &str) -> Self {
        Self(format!("Variable: {}", name))
    }

    pub fn import(name: &str) -> Self {
        Self(format!("Import: {}", name))
    }

    pub fn decorator(text: &str) -> Self {
        Self(format!("Decorator: {}", text))
    }

    /// Comments are keyed by line and content only, with no file qualifier.
    pub fn comment(line: usize, content: &str) -> Self {
        Self(format!("Comment: {}_{}", line, content_hash(content)))
    }

    /// Log statements are keyed by message only, with no file qualifier.
    pub fn log_statement(message: &str) -> Self {
        Self(format!("Log: {}", content_hash(message)))
    }

    pub fn integration(name: &str) -> Self {
        Self(format!("Integration: {}", name))
    }

    pub fn version(version_type: &str) -> Self {
        Self(format!("Version: {}", version_type))
    }

    /// Localization catalogs are keyed by file name, not full path.
    pub fn localization_file(rel_path: &str) -> Self {
        let base = Path::new(rel_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(rel_path);
        Self(format!("i18n: {}", base))
    }

    /// Translated messages used from source code.
    pub fn localization_message(message: &str) -> Self {
        Self(format!("i18n: {}", message))
    }

    pub fn dependency(name: &str, version: &str) -> Self {
        Self(format!("Dependency: {}", dependency_key(name, version)))
    }

    pub fn build_script(rel_path: &str) -> Self {
        Self(format!("Build: {}", rel_path))
    }

    pub fn config(rel_path: &str) -> Self {
        Self(format!("Config: {}", rel_path))
    }

    pub fn documentation(rel_path: &str) -> Self {
        Self(format!("Documentation: {}", rel_path))
    }

    /// The single project node documentation hangs off.
    pub fn project() -> Self {
        Self("Project: Main".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// `name==version`, the key dependencies are deduplicated by.
pub fn dependency_key(name: &str, version: &str) -> String {
    format!("{}=={}", name, version)
}

/// Truncated SHA-256 of the text, stable across runs and platforms.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(HASH_LEN);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_deterministic() {
        assert_eq!(NodeId::comment(3, "hello"), NodeId::comment(3, "hello"));
        assert_ne!(NodeId::comment(3, "hello"), NodeId::comment(4, "hello"));
        assert_eq!(NodeId::log_statement("boot"), NodeId::log_statement("boot"));
        assert_eq!(content_hash("boot").len(), HASH_LEN);
    }

    #[test]
    fn test_id_formats() {
        assert_eq!(NodeId::file("pkg/mod.py").as_str(), "File: pkg/mod.py");
        assert_eq!(NodeId::class("Foo").as_str(), "Class: Foo");
        assert_eq!(NodeId::dependency("requests", "2.31").as_str(), "Dependency: requests==2.31");
        assert_eq!(NodeId::dependency("flask", "").as_str(), "Dependency: flask==");
        assert_eq!(
            NodeId::localization_file("locale/fr_FR/LC_MESSAGES/app.po").as_str(),
            "i18n: app.po"
        );
        assert_eq!(NodeId::project().as_str(), "Project: Main");
    }
}
