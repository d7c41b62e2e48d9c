//! Line-oriented source scanners.
//!
//! Structure is recovered from raw text with line patterns and a small amount
//! of state, not a grammar. The scanners are deterministic and never fail:
//! a line they do not recognize simply yields no fact.
//!
//! Scanning sits behind [`SourceScanner`] so a grammar-based implementation
//! can replace [`HeuristicScanner`] without touching the graph assembler.
//!
//! Known limitation: a signature split across several lines is not matched.

pub mod comments;
pub mod patterns;
pub mod signature;

use crate::ontology::{CommentKind, ParameterEntity};

/// A parameter as written in a signature. Type and default are raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    pub name: String,
    pub type_hint: Option<String>,
    pub default_value: Option<String>,
}

impl From<&ParameterInfo> for ParameterEntity {
    fn from(p: &ParameterInfo) -> Self {
        ParameterEntity {
            name: p.name.clone(),
            type_hint: p.type_hint.clone(),
            default: p.default_value.clone(),
        }
    }
}

/// A `def` recognized by the signature scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: String,
    pub parameters: Vec<ParameterInfo>,
    pub return_type: Option<String>,
    pub decorators: Vec<String>,
    pub is_async: bool,
    pub is_generator: bool,
    pub docstring: Option<String>,
    /// 1-based line of the header
    pub line: usize,
}

/// A `class` recognized by the signature scanner, with the methods in its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: String,
    pub bases: Vec<String>,
    pub decorators: Vec<String>,
    pub methods: Vec<FunctionInfo>,
    pub docstring: Option<String>,
    /// 1-based line of the header
    pub line: usize,
}

/// A comment or docstring recognized by the comment scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentInfo {
    pub content: String,
    /// 1-based line; the opening line for docstrings
    pub line_number: usize,
    pub kind: CommentKind,
    /// The `def`/`class` on the line right before a docstring
    pub associated_element: Option<String>,
    pub tags: Vec<String>,
}

/// Everything a scanner recovered from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub classes: Vec<ClassInfo>,
    /// Top-level functions only; methods live on their class
    pub functions: Vec<FunctionInfo>,
    pub comments: Vec<CommentInfo>,
}

/// Turns source text into structural facts.
pub trait SourceScanner: Send + Sync {
    /// Scan one file's text.
    fn scan(&self, text: &str) -> ScanResult;

    /// Human-readable scanner name, for logs.
    fn name(&self) -> &'static str;
}

/// Regex and line-state scanner for Python sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScanner;

impl HeuristicScanner {
    pub fn new() -> Self {
        Self
    }
}

impl SourceScanner for HeuristicScanner {
    fn scan(&self, text: &str) -> ScanResult {
        ScanResult {
            classes: signature::extract_classes(text),
            functions: signature::extract_functions(text),
            comments: comments::extract_comments(text),
        }
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_combines_both_scanners() {
        let code = r#"
# TODO: localize greetings
class Greeter:
    """Says hello."""

    def greet(self, name: str) -> str:
        return f"hi {name}"

def main():
    Greeter().greet("x")
"#;
        let result = HeuristicScanner::new().scan(code);
        assert_eq!(result.classes.len(), 1);
        assert_eq!(result.classes[0].methods.len(), 1);
        assert_eq!(result.functions.len(), 1);
        assert_eq!(result.functions[0].name, "main");
        assert!(result.comments.iter().any(|c| c.kind == CommentKind::Todo));
        assert!(result.comments.iter().any(|c| c.kind == CommentKind::Docstring));
    }
}
