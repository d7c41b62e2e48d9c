//! Python version constraints and deprecation markers.

use regex::Regex;
use std::fs;
use std::path::Path;

use crate::ontology::VersionKind;

const CONSTRAINT_PATTERN: &str = r"(>=|<=|==|!=|>|<)\s*(\d+\.\d+(?:\.\d+)?)";
const REQUIRES_PYTHON_PATTERN: &str = r"Requires-Python\s*[:=]\s*([^\n]+)";
const DEPRECATED_PATTERN: &str = r"@deprecated(?:\((.*?)\))?";
const COMMENT_VERSION_PATTERN: &str = r"#.*?(Python\s*(\d+\.\d+(?:\.\d+)?))";
const DEPRECATION_WARNING_PATTERN: &str =
    r#"warnings\.warn\(['"]([^'"]+)['"].*DeprecationWarning"#;

/// Project files consulted for the interpreter requirement, in priority order.
const PROJECT_VERSION_SOURCES: &[(&str, &str)] = &[
    ("pyproject.toml", r#"requires-python\s*=\s*['"]([^'"]+)['"]"#),
    ("setup.cfg", r"Requires-Python\s*=\s*([^\n]+)"),
    ("setup.py", r#"python_requires\s*=\s*['"]([^'"]+)['"]"#),
    ("Pipfile", r#"python_version\s*=\s*['"]([^'"]+)['"]"#),
];

/// Version facts of one kind found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub kind: VersionKind,
    pub constraints: Vec<String>,
}

/// Collect version facts from Python source.
///
/// Kinds with no match are omitted, except `deprecated`: a bare
/// `@deprecated` is reported with an empty constraint list.
pub fn extract_version_constraints(content: &str) -> Vec<VersionInfo> {
    let mut found = Vec::new();

    let constraints = collect(content, CONSTRAINT_PATTERN, |cap| {
        Some(format!("{}{}", &cap[1], &cap[2]))
    });
    push_nonempty(&mut found, VersionKind::PythonVersionConstraints, constraints);

    let requires = collect(content, REQUIRES_PYTHON_PATTERN, |cap| {
        Some(cap[1].trim().to_string())
    });
    push_nonempty(&mut found, VersionKind::RequiresPython, requires);

    if let Ok(re) = Regex::new(DEPRECATED_PATTERN) {
        if re.is_match(content) {
            let reasons = re
                .captures_iter(content)
                .filter_map(|cap| cap.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            found.push(VersionInfo {
                kind: VersionKind::Deprecated,
                constraints: reasons,
            });
        }
    }

    let comments = collect(content, COMMENT_VERSION_PATTERN, |cap| {
        Some(cap[1].to_string())
    });
    push_nonempty(&mut found, VersionKind::CommentVersions, comments);

    let warnings = collect(content, DEPRECATION_WARNING_PATTERN, |cap| {
        Some(cap[1].to_string())
    });
    push_nonempty(&mut found, VersionKind::DeprecationWarnings, warnings);

    found
}

/// The interpreter requirement declared by the project's packaging files.
pub fn project_python_version(root: &Path) -> Option<String> {
    for (file, pattern) in PROJECT_VERSION_SOURCES {
        let Ok(content) = fs::read_to_string(root.join(file)) else {
            continue;
        };
        let Ok(re) = Regex::new(pattern) else {
            continue;
        };
        if let Some(cap) = re.captures(&content) {
            return Some(cap[1].trim().to_string());
        }
    }
    None
}

fn collect<F>(content: &str, pattern: &str, map: F) -> Vec<String>
where
    F: Fn(&regex::Captures) -> Option<String>,
{
    match Regex::new(pattern) {
        Ok(re) => re.captures_iter(content).filter_map(|cap| map(&cap)).collect(),
        Err(_) => Vec::new(),
    }
}

fn push_nonempty(found: &mut Vec<VersionInfo>, kind: VersionKind, constraints: Vec<String>) {
    if !constraints.is_empty() {
        found.push(VersionInfo { kind, constraints });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extract_version_constraints() {
        let code = r#"
import sys
if sys.version_info >= 3.8:  # needs Python 3.8
    pass

@deprecated
def old():
    warnings.warn("use new()", DeprecationWarning)

@deprecated("gone in 2.0")
def older():
    pass
"#;
        let found = extract_version_constraints(code);
        let kinds: Vec<VersionKind> = found.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            [
                VersionKind::PythonVersionConstraints,
                VersionKind::Deprecated,
                VersionKind::CommentVersions,
                VersionKind::DeprecationWarnings,
            ]
        );
        assert_eq!(found[0].constraints, [">=3.8"]);
        assert_eq!(found[1].constraints, ["\"gone in 2.0\""]);
        assert_eq!(found[2].constraints, ["Python 3.8"]);
        assert_eq!(found[3].constraints, ["use new()"]);
    }

    #[test]
    fn test_bare_deprecated_is_reported() {
        let found = extract_version_constraints("@deprecated\ndef f():\n    pass\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, VersionKind::Deprecated);
        assert!(found[0].constraints.is_empty());
    }

    #[test]
    fn test_project_python_version_priority() {
        let dir = TempDir::new().unwrap();
        assert_eq!(project_python_version(dir.path()), None);

        fs::write(dir.path().join("setup.py"), "setup(python_requires='>=3.7')").unwrap();
        assert_eq!(project_python_version(dir.path()).as_deref(), Some(">=3.7"));

        fs::write(
            dir.path().join("pyproject.toml"),
            "[project]\nrequires-python = \">=3.10\"\n",
        )
        .unwrap();
        assert_eq!(project_python_version(dir.path()).as_deref(), Some(">=3.10"));
    }
}
