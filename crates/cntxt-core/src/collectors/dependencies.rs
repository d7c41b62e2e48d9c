//! Dependency manifests: `requirements.txt`, `setup.py`, `Pipfile`, `pyproject.toml`.

use regex::Regex;
use std::path::Path;

use crate::error::{CntxtError, Result};
use crate::ontology::BuildTool;

const REQUIREMENT_PATTERN: &str = r"^([^=<>!~]+)(?:[=<>!~]=?|@)(.+)$";
const EXTRAS_PATTERN: &str = r"\[(.*?)\]";
const INSTALL_REQUIRES_PATTERN: &str = r"(?s)install_requires\s*=\s*\[(.*?)\]";
const EXTRAS_REQUIRE_PATTERN: &str = r"(?s)extras_require\s*=\s*\{(.*?)\}";
const EXTRAS_ENTRY_PATTERN: &str = r#"(?s)['"]([^'"]+)['"]\s*:\s*\[(.*?)\]"#;
const QUOTED_PATTERN: &str = r#"['"]([^'"]+)['"]"#;

/// Extra tag given to development-only dependencies.
const DEV_EXTRA: &str = "dev";

/// A package a manifest depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    /// Version as written after the operator, empty when unpinned
    pub version: String,
    pub extras: Vec<String>,
}

impl Dependency {
    fn new(name: impl Into<String>, version: impl Into<String>, extras: Vec<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            extras,
        }
    }
}

/// Build tool a manifest file name belongs to, `None` for non-manifests.
pub fn build_tool_for(file_name: &str) -> Option<BuildTool> {
    match file_name {
        "setup.py" => Some(BuildTool::Setuptools),
        "requirements.txt" => Some(BuildTool::Requirements),
        "Pipfile" => Some(BuildTool::Pipenv),
        "pyproject.toml" => Some(BuildTool::Poetry),
        _ => None,
    }
}

/// Build tool of the project as a whole, judged by manifests at its root.
pub fn project_build_tool(root: &Path) -> BuildTool {
    if root.join("pyproject.toml").exists() {
        BuildTool::Poetry
    } else if root.join("Pipfile").exists() {
        BuildTool::Pipenv
    } else if root.join("setup.py").exists() {
        BuildTool::Setuptools
    } else {
        BuildTool::Unknown
    }
}

/// Parse a manifest's dependencies, dispatching on its file name.
pub fn parse_dependencies(rel_path: &str, content: &str) -> Result<Vec<Dependency>> {
    let file_name = Path::new(rel_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(rel_path);

    match build_tool_for(file_name) {
        Some(BuildTool::Requirements) => Ok(parse_requirements(content)),
        Some(BuildTool::Setuptools) => Ok(parse_setup_py(content)),
        Some(BuildTool::Pipenv) => {
            parse_pipfile(content).map_err(|e| CntxtError::parse(rel_path, e))
        }
        Some(BuildTool::Poetry) => {
            parse_pyproject(content).map_err(|e| CntxtError::parse(rel_path, e))
        }
        _ => Ok(Vec::new()),
    }
}

// =============================================================================
// REQUIREMENT STRINGS
// =============================================================================

/// Parse one requirement specifier such as `requests[socks]>=2.31`.
pub fn parse_requirement(spec: &str) -> Option<Dependency> {
    let spec = spec.trim();
    if spec.is_empty() || spec.starts_with('#') || spec.starts_with('-') {
        return None;
    }
    // Environment markers are not part of the version.
    let spec = spec.split(';').next().unwrap_or(spec).trim();

    let mut extras = Vec::new();
    let mut bare = spec.to_string();
    if let Ok(re) = Regex::new(EXTRAS_PATTERN) {
        if let Some(cap) = re.captures(spec) {
            extras = split_list(&cap[1]);
            bare = re.replace(spec, "").into_owned();
        }
    }

    let re = Regex::new(REQUIREMENT_PATTERN).ok()?;
    let dependency = match re.captures(&bare) {
        Some(cap) => Dependency::new(cap[1].trim(), cap[2].trim(), extras),
        None => Dependency::new(bare.trim(), "", extras),
    };
    Some(dependency)
}

fn parse_requirements(content: &str) -> Vec<Dependency> {
    content.lines().filter_map(parse_requirement).collect()
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

fn quoted_items(s: &str) -> Vec<String> {
    match Regex::new(QUOTED_PATTERN) {
        Ok(re) => re.captures_iter(s).map(|cap| cap[1].to_string()).collect(),
        Err(_) => Vec::new(),
    }
}

// =============================================================================
// setup.py
// =============================================================================

fn parse_setup_py(content: &str) -> Vec<Dependency> {
    let mut dependencies = Vec::new();

    if let Ok(re) = Regex::new(INSTALL_REQUIRES_PATTERN) {
        if let Some(cap) = re.captures(content) {
            dependencies.extend(quoted_items(&cap[1]).iter().filter_map(|s| parse_requirement(s)));
        }
    }

    let (Ok(block), Ok(entry)) = (
        Regex::new(EXTRAS_REQUIRE_PATTERN),
        Regex::new(EXTRAS_ENTRY_PATTERN),
    ) else {
        return dependencies;
    };
    if let Some(cap) = block.captures(content) {
        for extra in entry.captures_iter(&cap[1]) {
            let tag = extra[1].to_string();
            for spec in quoted_items(&extra[2]) {
                if let Some(mut dep) = parse_requirement(&spec) {
                    dep.extras.push(tag.clone());
                    dependencies.push(dep);
                }
            }
        }
    }

    dependencies
}

// =============================================================================
// TOML MANIFESTS
// =============================================================================

fn parse_pipfile(content: &str) -> std::result::Result<Vec<Dependency>, toml::de::Error> {
    let doc: toml::Table = toml::from_str(content)?;
    let mut dependencies = Vec::new();
    if let Some(packages) = doc.get("packages").and_then(|v| v.as_table()) {
        dependencies.extend(table_dependencies(packages, None));
    }
    if let Some(packages) = doc.get("dev-packages").and_then(|v| v.as_table()) {
        dependencies.extend(table_dependencies(packages, Some(DEV_EXTRA)));
    }
    Ok(dependencies)
}

fn parse_pyproject(content: &str) -> std::result::Result<Vec<Dependency>, toml::de::Error> {
    let doc: toml::Table = toml::from_str(content)?;
    let mut dependencies = Vec::new();

    let poetry = doc
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.as_table());
    if let Some(poetry) = poetry {
        if let Some(deps) = poetry.get("dependencies").and_then(|v| v.as_table()) {
            dependencies.extend(
                table_dependencies(deps, None)
                    .into_iter()
                    .filter(|d| d.name != "python"),
            );
        }
        if let Some(deps) = poetry.get("dev-dependencies").and_then(|v| v.as_table()) {
            dependencies.extend(table_dependencies(deps, Some(DEV_EXTRA)));
        }
    }

    let pep621 = doc
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array());
    if let Some(specs) = pep621 {
        dependencies.extend(
            specs
                .iter()
                .filter_map(|v| v.as_str())
                .filter_map(parse_requirement),
        );
    }

    Ok(dependencies)
}

/// `name = "version"` or `name = { version = ..., extras = [...] }` entries.
fn table_dependencies(table: &toml::Table, tag: Option<&str>) -> Vec<Dependency> {
    table
        .iter()
        .map(|(name, value)| {
            let (version, mut extras) = match value {
                toml::Value::String(v) => (v.clone(), Vec::new()),
                toml::Value::Table(t) => {
                    let version = t
                        .get("version")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string();
                    let extras = t
                        .get("extras")
                        .and_then(|e| e.as_array())
                        .map(|a| {
                            a.iter()
                                .filter_map(|e| e.as_str().map(str::to_string))
                                .collect()
                        })
                        .unwrap_or_default();
                    (version, extras)
                }
                _ => (String::new(), Vec::new()),
            };
            if let Some(tag) = tag {
                extras.push(tag.to_string());
            }
            let version = version.trim_start_matches(['=', '<', '>', '!', '~']).trim();
            let version = if version == "*" { "" } else { version };
            Dependency::new(name.as_str(), version, extras)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn names(deps: &[Dependency]) -> Vec<String> {
        deps.iter()
            .map(|d| format!("{}=={}", d.name, d.version))
            .collect()
    }

    #[test]
    fn test_parse_requirements() {
        let content = r#"
# pinned
requests==2.31.0
-r base.txt
celery[redis,msgpack]>=5.3
flask
numpy ; python_version > "3.8"
"#;
        let deps = parse_dependencies("requirements.txt", content).unwrap();
        assert_eq!(
            names(&deps),
            ["requests==2.31.0", "celery==5.3", "flask==", "numpy=="]
        );
        assert_eq!(deps[1].extras, ["redis", "msgpack"]);
    }

    #[test]
    fn test_parse_setup_py() {
        let content = r#"
from setuptools import setup
setup(
    name="demo",
    install_requires=[
        "click>=8.0",
        'rich',
    ],
    extras_require={
        "test": ["pytest>=7"],
    },
)
"#;
        let deps = parse_dependencies("pkg/setup.py", content).unwrap();
        assert_eq!(names(&deps), ["click==8.0", "rich==", "pytest==7"]);
        assert_eq!(deps[2].extras, ["test"]);
    }

    #[test]
    fn test_parse_pipfile() {
        let content = r#"
[packages]
requests = "*"
django = { version = "==4.2", extras = ["bcrypt"] }

[dev-packages]
pytest = "*"
"#;
        let deps = parse_dependencies("Pipfile", content).unwrap();
        assert_eq!(names(&deps), ["requests==", "django==4.2", "pytest=="]);
        assert_eq!(deps[1].extras, ["bcrypt"]);
        assert_eq!(deps[2].extras, [DEV_EXTRA]);
    }

    #[test]
    fn test_parse_pyproject() {
        let content = r#"
[project]
dependencies = ["httpx>=0.27"]

[tool.poetry.dependencies]
python = "^3.10"
pydantic = "^2.0"

[tool.poetry.dev-dependencies]
ruff = "^0.4"
"#;
        let deps = parse_dependencies("pyproject.toml", content).unwrap();
        assert_eq!(names(&deps), ["pydantic==^2.0", "ruff==^0.4", "httpx==0.27"]);
        assert_eq!(deps[1].extras, [DEV_EXTRA]);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_dependencies("Pipfile", "[packages\nbroken").unwrap_err();
        assert!(matches!(err, CntxtError::Parse { .. }));
    }

    #[test]
    fn test_project_build_tool() {
        let dir = TempDir::new().unwrap();
        assert_eq!(project_build_tool(dir.path()), BuildTool::Unknown);
        std::fs::write(dir.path().join("setup.py"), "").unwrap();
        assert_eq!(project_build_tool(dir.path()), BuildTool::Setuptools);
        std::fs::write(dir.path().join("pyproject.toml"), "").unwrap();
        assert_eq!(project_build_tool(dir.path()), BuildTool::Poetry);
    }
}
