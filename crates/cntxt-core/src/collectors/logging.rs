//! Logging statement extraction.
//!
//! Two independent strategies sit behind [`LogExtractor`]. The syntax-tree
//! strategy is the one the analyzer uses; it needs the file to parse cleanly
//! and reports nothing otherwise. The regex strategy works on raw text and is
//! only used when a caller picks it explicitly. Their results are never merged.

use regex::Regex;
use tree_sitter::{Node, Parser as TSParser, Tree};

use crate::ontology::LogLevel;

/// One `logging.<level>(...)` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// 1-based line of the call
    pub line: usize,
}

/// Which strategy produced a set of log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStrategy {
    SyntaxTree,
    Regex,
}

/// Finds logging calls in Python source.
pub trait LogExtractor: Send + Sync {
    /// Extract log statements in source order.
    fn extract(&self, content: &str) -> Vec<LogEntry>;

    /// The strategy this extractor implements.
    fn strategy(&self) -> LogStrategy;
}

// =============================================================================
// SYNTAX TREE STRATEGY
// =============================================================================

/// Walks a tree-sitter parse of the file for `logging.<level>(...)` calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxTreeLogExtractor;

impl SyntaxTreeLogExtractor {
    pub fn new() -> Self {
        Self
    }

    fn parse_tree(content: &str) -> Result<Tree, String> {
        let mut parser = TSParser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| format!("Failed to set language: {}", e))?;

        parser
            .parse(content, None)
            .ok_or_else(|| "Failed to parse content".to_string())
    }

    fn node_text<'a>(node: &Node, content: &'a str) -> &'a str {
        &content[node.byte_range()]
    }

    fn match_call(node: &Node, content: &str) -> Option<LogEntry> {
        let function = node.child_by_field_name("function")?;
        if function.kind() != "attribute" {
            return None;
        }
        let object = function.child_by_field_name("object")?;
        if object.kind() != "identifier" || Self::node_text(&object, content) != "logging" {
            return None;
        }
        let attribute = function.child_by_field_name("attribute")?;
        let level = LogLevel::from_method(Self::node_text(&attribute, content))?;

        let message = node
            .child_by_field_name("arguments")
            .map(|args| Self::first_argument_message(&args, content))
            .unwrap_or_default();

        Some(LogEntry {
            level,
            message,
            line: node.start_position().row + 1,
        })
    }

    /// Literal value of a plain string argument, including implicit
    /// concatenation of plain strings; source text of anything else.
    fn first_argument_message(args: &Node, content: &str) -> String {
        let mut cursor = args.walk();
        let first = args
            .named_children(&mut cursor)
            .find(|n| n.kind() != "comment");

        match first {
            None => String::new(),
            Some(arg) if arg.kind() == "keyword_argument" => String::new(),
            Some(arg) => Self::literal_value(&arg, content)
                .unwrap_or_else(|| Self::node_text(&arg, content).to_string()),
        }
    }

    /// Value of a `string` or `concatenated_string` node without interpolation.
    fn literal_value(node: &Node, content: &str) -> Option<String> {
        match node.kind() {
            "string" if !Self::has_interpolation(node) => {
                string_literal_value(Self::node_text(node, content))
            }
            "concatenated_string" => {
                let mut cursor = node.walk();
                let parts: Vec<Node> = node
                    .named_children(&mut cursor)
                    .filter(|n| n.kind() != "comment")
                    .collect();
                parts
                    .iter()
                    .map(|part| match part.kind() {
                        "string" => Self::literal_value(part, content),
                        _ => None,
                    })
                    .collect()
            }
            _ => None,
        }
    }

    fn has_interpolation(node: &Node) -> bool {
        let mut cursor = node.walk();
        let found = node
            .children(&mut cursor)
            .any(|c| c.kind() == "interpolation");
        found
    }
}

impl LogExtractor for SyntaxTreeLogExtractor {
    fn extract(&self, content: &str) -> Vec<LogEntry> {
        let tree = match Self::parse_tree(content) {
            Ok(tree) => tree,
            Err(e) => {
                log::error!("Error parsing code for logging statements: {}", e);
                return Vec::new();
            }
        };
        let root = tree.root_node();
        if root.has_error() {
            log::warn!("Skipping logging extraction: source does not parse cleanly");
            return Vec::new();
        }

        // Pre-order walk keeps entries in source order.
        let mut logs = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.kind() == "call" {
                if let Some(entry) = Self::match_call(&node, content) {
                    logs.push(entry);
                }
            }
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
        logs
    }

    fn strategy(&self) -> LogStrategy {
        LogStrategy::SyntaxTree
    }
}

/// Value of a Python string literal: prefix and quotes removed, escapes
/// decoded unless the literal is raw.
fn string_literal_value(raw: &str) -> Option<String> {
    let quote_at = raw.find(['"', '\''])?;
    let is_raw = raw[..quote_at].contains(['r', 'R']);
    let body = &raw[quote_at..];
    for delimiter in [r#"""""#, "'''", "\"", "'"] {
        if body.len() >= 2 * delimiter.len()
            && body.starts_with(delimiter)
            && body.ends_with(delimiter)
        {
            let inner = &body[delimiter.len()..body.len() - delimiter.len()];
            return Some(if is_raw {
                inner.to_string()
            } else {
                decode_escapes(inner)
            });
        }
    }
    None
}

/// Decode backslash escapes. Unknown escapes stay as written.
fn decode_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            '0'..='7' => {
                let mut digits = String::from(next);
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(d @ '0'..='7') => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let hex: String = chars.clone().take(width).collect();
                let decoded = (hex.len() == width && hex.chars().all(|h| h.is_ascii_hexdigit()))
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(decoded) => {
                        out.push(decoded);
                        for _ in 0..width {
                            chars.next();
                        }
                    }
                    None => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

// =============================================================================
// REGEX STRATEGY
// =============================================================================

const LOG_CALL_PATTERN: &str = r"(?s)logging\.(debug|info|warning|error|critical)\s*\(\s*(.*?)\s*\)";

/// Text-only fallback. Messages are the raw argument text, outer quotes stripped.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexLogExtractor;

impl RegexLogExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl LogExtractor for RegexLogExtractor {
    fn extract(&self, content: &str) -> Vec<LogEntry> {
        let mut logs = Vec::new();
        let Ok(re) = Regex::new(LOG_CALL_PATTERN) else {
            return logs;
        };

        for cap in re.captures_iter(content) {
            let Some(level) = LogLevel::from_method(&cap[1]) else {
                continue;
            };
            let start = cap.get(0).map(|m| m.start()).unwrap_or(0);
            logs.push(LogEntry {
                level,
                message: cap[2].trim_matches(['"', '\'']).to_string(),
                line: count_lines_before(content, start),
            });
        }
        logs
    }

    fn strategy(&self) -> LogStrategy {
        LogStrategy::Regex
    }
}

/// 1-based line number of a byte offset.
fn count_lines_before(content: &str, pos: usize) -> usize {
    content[..pos].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"import logging

def run(user):
    logging.info("Starting run")
    logging.warning(f"user {user} missing")
    logging.error('Failed: %s', user)
    logging.exception("not a level")
    logger.info("not the module")
    logging.debug(msg="keyword only")
"#;

    #[test]
    fn test_syntax_tree_extraction() {
        let logs = SyntaxTreeLogExtractor::new().extract(SAMPLE);
        assert_eq!(logs.len(), 4);

        assert_eq!(logs[0].level, LogLevel::Info);
        assert_eq!(logs[0].message, "Starting run");
        assert_eq!(logs[0].line, 4);

        assert_eq!(logs[1].level, LogLevel::Warning);
        assert_eq!(logs[1].message, r#"f"user {user} missing""#);

        assert_eq!(logs[2].level, LogLevel::Error);
        assert_eq!(logs[2].message, "Failed: %s");

        assert_eq!(logs[3].level, LogLevel::Debug);
        assert_eq!(logs[3].message, "");
    }

    #[test]
    fn test_syntax_tree_needs_clean_parse() {
        let broken = "def oops(:\n    logging.info(\"x\")\n";
        assert!(SyntaxTreeLogExtractor::new().extract(broken).is_empty());
    }

    #[test]
    fn test_regex_strategy_is_independent() {
        let broken = "def oops(:\n    logging.info(\"x\")\n";
        let logs = RegexLogExtractor::new().extract(broken);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message, "x");
        assert_eq!(logs[0].line, 2);
        assert_eq!(RegexLogExtractor::new().strategy(), LogStrategy::Regex);
    }

    #[test]
    fn test_string_literal_value() {
        assert_eq!(string_literal_value("\"a\"").as_deref(), Some("a"));
        assert_eq!(string_literal_value("r'a\\d'").as_deref(), Some("a\\d"));
        assert_eq!(string_literal_value("\"\"\"doc\"\"\"").as_deref(), Some("doc"));
        assert_eq!(string_literal_value("name"), None);
    }

    #[test]
    fn test_string_literal_escapes_are_decoded() {
        assert_eq!(string_literal_value(r#""a\tb""#).as_deref(), Some("a\tb"));
        assert_eq!(string_literal_value(r#"'it\'s'"#).as_deref(), Some("it's"));
        assert_eq!(string_literal_value(r#""\x41\u00e9\101""#).as_deref(), Some("A\u{e9}A"));
        assert_eq!(string_literal_value(r#""keep \d""#).as_deref(), Some("keep \\d"));
        assert_eq!(string_literal_value(r#"R"a\tb""#).as_deref(), Some("a\\tb"));
    }

    #[test]
    fn test_syntax_tree_decodes_message_literals() {
        let source = "import logging\nlogging.info(\"a\\tb\")\nlogging.error(\"part one, \" 'part two')\nlogging.debug(\"x\" f\"{y}\")\n";
        let logs = SyntaxTreeLogExtractor::new().extract(source);
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].message, "a\tb");
        assert_eq!(logs[1].message, "part one, part two");
        // Interpolated parts keep the whole argument as source text.
        assert_eq!(logs[2].message, "\"x\" f\"{y}\"");
    }
}
