//! Module-level variable extraction.

use regex::Regex;

/// `name[: hint] = value`, where the value does not start another `=`.
const ASSIGNMENT_PATTERN: &str = r"^(\w+)\s*(?::\s*([^=]+?))?\s*=\s*([^=#\s][^#]*)";

/// Names that can start a line with `word ... =` without being an assignment.
const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda",
    "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

/// A module-level assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableInfo {
    pub name: String,
    pub type_hint: Option<String>,
    pub value: String,
    pub is_constant: bool,
}

/// Extract assignments made at column zero.
pub fn extract_variables(content: &str) -> Vec<VariableInfo> {
    let mut variables = Vec::new();
    let Ok(re) = Regex::new(ASSIGNMENT_PATTERN) else {
        return variables;
    };

    for line in content.lines() {
        let Some(cap) = re.captures(line) else {
            continue;
        };

        let name = &cap[1];
        if PYTHON_KEYWORDS.contains(&name) {
            continue;
        }
        let value = cap[3].trim();
        if value.is_empty() {
            continue;
        }

        variables.push(VariableInfo {
            name: name.to_string(),
            type_hint: cap.get(2).map(|m| m.as_str().trim().to_string()),
            value: value.to_string(),
            is_constant: is_constant_name(name),
        });
    }

    variables
}

/// `MAX_RETRIES` style names.
fn is_constant_name(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_alphabetic()) && !name.chars().any(|c| c.is_lowercase())
}
