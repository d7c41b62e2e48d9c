//! Signature scanner: decorators, class headers and function headers.
//!
//! A class body is the run of lines after the header that are blank or start
//! with a space or tab. Irregular indentation therefore mis-scopes bodies;
//! that is accepted behavior.

use regex::Regex;

use super::patterns::{
    CLASS_PATTERN, DECORATOR_PATTERN, DOCSTRING_DELIMITERS, FUNCTION_PATTERN, YIELD_PATTERN,
};
use super::{ClassInfo, FunctionInfo, ParameterInfo};

/// Extract class definitions and the methods in their bodies.
pub fn extract_classes(content: &str) -> Vec<ClassInfo> {
    let mut classes = Vec::new();
    let Some(patterns) = compile() else {
        return classes;
    };

    let lines: Vec<&str> = content.lines().collect();
    let mut i = 0;
    while i < lines.len() {
        let (decorators, next) = collect_decorators(&lines, i, &patterns.decorator);
        i = next;
        if i >= lines.len() {
            break;
        }

        let Some(cap) = patterns.class.captures(lines[i].trim()) else {
            i += 1;
            continue;
        };

        let name = cap[1].to_string();
        let bases = cap
            .get(2)
            .map(|m| {
                split_top_level(m.as_str())
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let header = i;
        i += 1;
        while i < lines.len() && is_body_line(lines[i]) {
            i += 1;
        }
        let body = &lines[header + 1..i];

        classes.push(ClassInfo {
            name,
            bases,
            decorators,
            methods: extract_methods(body, header + 2, &patterns),
            docstring: leading_docstring(body),
            line: header + 1,
        });
    }

    classes
}

/// Extract function definitions declared at column zero.
pub fn extract_functions(content: &str) -> Vec<FunctionInfo> {
    let mut functions = Vec::new();
    let Some(patterns) = compile() else {
        return functions;
    };

    let lines: Vec<&str> = content.lines().collect();
    let mut i = 0;
    while i < lines.len() {
        let (decorators, next) = collect_decorators(&lines, i, &patterns.decorator);
        i = next;
        if i >= lines.len() {
            break;
        }

        let line = lines[i];
        if !line.starts_with([' ', '\t']) {
            if let Some(func) = match_function(&lines, i, 1, decorators, &patterns) {
                functions.push(func);
            }
        }
        i += 1;
    }

    functions
}

/// Extract method definitions from a class body.
///
/// `first_line` is the 1-based line number of `body[0]` in the file.
fn extract_methods(body: &[&str], first_line: usize, patterns: &Patterns) -> Vec<FunctionInfo> {
    let mut methods = Vec::new();
    let mut i = 0;
    while i < body.len() {
        let (decorators, next) = collect_decorators(body, i, &patterns.decorator);
        i = next;
        if i >= body.len() {
            break;
        }
        if let Some(method) = match_function(body, i, first_line, decorators, patterns) {
            methods.push(method);
        }
        i += 1;
    }
    methods
}

/// Parse a parameter list into its parameters.
///
/// Commas nested inside `()`, `[]` or `{}` do not split. Each segment is split
/// on its first `:` into name and the rest, and the rest on its first `=` into
/// type hint and default. Without a `:`, the segment splits on `=` alone.
pub fn parse_parameters(params: &str) -> Vec<ParameterInfo> {
    split_top_level(params)
        .into_iter()
        .map(|segment| match segment.split_once(':') {
            Some((name, rest)) => {
                let (type_hint, default) = match rest.split_once('=') {
                    Some((hint, default)) => (hint.trim(), Some(default.trim())),
                    None => (rest.trim(), None),
                };
                ParameterInfo {
                    name: name.trim().to_string(),
                    type_hint: Some(type_hint.to_string()),
                    default_value: default.map(str::to_string),
                }
            }
            None => match segment.split_once('=') {
                Some((name, default)) => ParameterInfo {
                    name: name.trim().to_string(),
                    type_hint: None,
                    default_value: Some(default.trim().to_string()),
                },
                None => ParameterInfo {
                    name: segment.to_string(),
                    type_hint: None,
                    default_value: None,
                },
            },
        })
        .collect()
}

/// Split on commas at bracket depth zero, dropping empty segments.
pub fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    for (idx, ch) in s.char_indices() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(s[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());

    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

// --- Helper functions ---

/// Regexes compiled once per scan.
struct Patterns {
    class: Regex,
    function: Regex,
    decorator: Regex,
    yield_stmt: Regex,
}

fn compile() -> Option<Patterns> {
    Some(Patterns {
        class: Regex::new(CLASS_PATTERN).ok()?,
        function: Regex::new(FUNCTION_PATTERN).ok()?,
        decorator: Regex::new(DECORATOR_PATTERN).ok()?,
        yield_stmt: Regex::new(YIELD_PATTERN).ok()?,
    })
}

/// Gather consecutive decorator lines starting at `i`.
///
/// Returns the decorators and the index of the first non-decorator line.
fn collect_decorators(lines: &[&str], mut i: usize, decorator_re: &Regex) -> (Vec<String>, usize) {
    let mut decorators = Vec::new();
    while i < lines.len() {
        let stripped = lines[i].trim();
        if !stripped.starts_with('@') {
            break;
        }
        if let Some(cap) = decorator_re.captures(stripped) {
            decorators.push(cap[1].to_string());
        }
        i += 1;
    }
    (decorators, i)
}

fn match_function(
    lines: &[&str],
    i: usize,
    first_line: usize,
    decorators: Vec<String>,
    patterns: &Patterns,
) -> Option<FunctionInfo> {
    let stripped = lines[i].trim();
    let cap = patterns.function.captures(stripped)?;

    let block = indented_block(lines, i);
    Some(FunctionInfo {
        name: cap[1].to_string(),
        parameters: cap.get(2).map(|m| parse_parameters(m.as_str())).unwrap_or_default(),
        return_type: cap.get(3).map(|m| m.as_str().trim().to_string()),
        decorators,
        is_async: stripped.starts_with("async"),
        is_generator: contains_yield(block, &patterns.yield_stmt),
        docstring: leading_docstring(block),
        line: first_line + i,
    })
}

fn is_body_line(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with([' ', '\t'])
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Lines after `header` that are blank or indented deeper than it.
fn indented_block<'a, 'b>(lines: &'b [&'a str], header: usize) -> &'b [&'a str] {
    let indent = indent_width(lines[header]);
    let mut end = header + 1;
    while end < lines.len() {
        let line = lines[end];
        if !line.trim().is_empty() && indent_width(line) <= indent {
            break;
        }
        end += 1;
    }
    &lines[header + 1..end]
}

fn contains_yield(block: &[&str], yield_re: &Regex) -> bool {
    block.iter().any(|line| {
        let code = line.split('#').next().unwrap_or("");
        yield_re.is_match(code)
    })
}

/// Text of a triple-quoted string opening the block, without delimiters.
fn leading_docstring(block: &[&str]) -> Option<String> {
    let start = block.iter().position(|l| !l.trim().is_empty())?;
    let first = block[start].trim();
    let delimiter = DOCSTRING_DELIMITERS.iter().find(|d| first.starts_with(**d))?;

    let rest = &first[delimiter.len()..];
    let text = match rest.find(delimiter) {
        Some(end) => rest[..end].to_string(),
        None => {
            let mut parts = vec![rest];
            for line in &block[start + 1..] {
                match line.find(delimiter) {
                    Some(end) => {
                        parts.push(&line[..end]);
                        break;
                    }
                    None => parts.push(line),
                }
            }
            parts.join("\n")
        }
    };

    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parameters_respects_bracket_depth() {
        let params = parse_parameters(r#"x: Dict[str, int] = {"a": 1}, y: int = 2"#);
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "x");
        assert_eq!(params[0].type_hint.as_deref(), Some("Dict[str, int]"));
        assert_eq!(params[0].default_value.as_deref(), Some(r#"{"a": 1}"#));
        assert_eq!(params[1].name, "y");
        assert_eq!(params[1].type_hint.as_deref(), Some("int"));
        assert_eq!(params[1].default_value.as_deref(), Some("2"));
    }

    #[test]
    fn test_parse_parameters_without_hints() {
        let params = parse_parameters("self, retries=3, *args, **kwargs");
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["self", "retries", "*args", "**kwargs"]);
        assert_eq!(params[1].default_value.as_deref(), Some("3"));
        assert!(params[0].type_hint.is_none());
        assert!(parse_parameters("  ").is_empty());
    }

    #[test]
    fn test_default_keeps_later_equals() {
        let params = parse_parameters(r#"sep: str = "a=b""#);
        assert_eq!(params[0].default_value.as_deref(), Some(r#""a=b""#));
    }

    #[test]
    fn test_extract_classes_with_methods_and_decorators() {
        let code = r#"
@dataclass
class Point(Base, Generic[K, V]):
    """A point."""

    @property
    def norm(self) -> float:
        return 0.0

    async def fetch(self, url: str = "http://x"):
        pass

def helper():
    pass
"#;
        let classes = extract_classes(code);
        assert_eq!(classes.len(), 1);
        let point = &classes[0];
        assert_eq!(point.name, "Point");
        assert_eq!(point.bases, ["Base", "Generic[K, V]"]);
        assert_eq!(point.decorators, ["dataclass"]);
        assert_eq!(point.docstring.as_deref(), Some("A point."));
        assert_eq!(point.line, 3);

        assert_eq!(point.methods.len(), 2);
        assert_eq!(point.methods[0].name, "norm");
        assert_eq!(point.methods[0].decorators, ["property"]);
        assert_eq!(point.methods[0].return_type.as_deref(), Some("float"));
        assert_eq!(point.methods[0].line, 7);
        assert!(point.methods[1].is_async);
        assert_eq!(point.methods[1].parameters[1].default_value.as_deref(), Some("\"http://x\""));
    }

    #[test]
    fn test_consecutive_classes_are_both_found() {
        let code = "class A:\n    pass\nclass B:\n    pass\n";
        let names: Vec<String> = extract_classes(code).into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn test_extract_functions_top_level_only() {
        let code = r#"
import os

@app.route("/")
def index():
    def inner():
        yield 1
    return inner

class C:
    def method(self):
        pass

def gen(n):
    """Counts."""
    for i in range(n):
        yield i
"#;
        let functions = extract_functions(code);
        let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["index", "gen"]);
        assert_eq!(functions[0].decorators, [r#"app.route("/")"#]);
        assert!(functions[1].is_generator);
        assert_eq!(functions[1].docstring.as_deref(), Some("Counts."));
    }

    #[test]
    fn test_method_generator_flag_ignores_comments() {
        let code = "class Feed:\n    def items(self):\n        yield from self.raw\n\n    def size(self):\n        # yield nothing here\n        return 0\n";
        let methods = &extract_classes(code)[0].methods;
        assert_eq!(methods.len(), 2);
        assert!(methods[0].is_generator);
        assert!(!methods[1].is_generator);
    }

    #[test]
    fn test_multiline_signature_is_not_matched() {
        let code = "def long(\n    a,\n    b,\n):\n    pass\n";
        assert!(extract_functions(code).is_empty());
    }
}
