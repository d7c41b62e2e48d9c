//! Regex patterns for the line scanners.
//!
//! Signature patterns are matched against a whitespace-stripped line, so each
//! is anchored at the start.

/// `class Name(bases):`
pub const CLASS_PATTERN: &str = r"^class\s+(\w+)\s*(?:\((.*?)\))?:";

/// `[async] def name(params) [-> ret]:`
pub const FUNCTION_PATTERN: &str = r"^(?:async\s+)?def\s+(\w+)\s*\((.*?)\)\s*(?:->\s*([^:]+))?:";

/// `@name`, `@pkg.name`, `@name(args)`
pub const DECORATOR_PATTERN: &str = r"^@(\w+(?:\.\w+)*(?:\(.*?\))?)";

/// A line that opens a docstring.
pub const DOCSTRING_OPEN_PATTERN: &str = r#"^[ \t]*("""|''')"#;

/// The declaration a docstring line may belong to.
pub const DEF_CLASS_PATTERN: &str = r"^[ \t]*(def|class)\s+(\w+)\s*[\(:]?";

/// Trailing `#` comment.
pub const INLINE_COMMENT_PATTERN: &str = r"#.*";

/// A comment carrying a work marker.
pub const TODO_FIXME_PATTERN: &str = r"(?i)#.*\b(TODO|FIXME)\b";

/// A `yield` anywhere in a body line.
pub const YIELD_PATTERN: &str = r"\byield\b";

/// Triple-quote delimiters, in the order they are tried.
pub const DOCSTRING_DELIMITERS: &[&str] = &[r#"""""#, "'''"];
