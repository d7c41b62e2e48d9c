//! Comment and docstring scanner.
//!
//! Tracks at most one open docstring. The opening line never closes it, even
//! when the delimiter appears twice there: lines are collected until a later
//! one contains the delimiter, and no inline comments are read in between.

use regex::Regex;

use super::patterns::{
    DEF_CLASS_PATTERN, DOCSTRING_OPEN_PATTERN, INLINE_COMMENT_PATTERN, TODO_FIXME_PATTERN,
};
use super::CommentInfo;
use crate::ontology::CommentKind;

struct OpenDocstring {
    delimiter: String,
    start_line: usize,
    text: String,
    associated_element: Option<String>,
}

impl OpenDocstring {
    fn finish(self) -> CommentInfo {
        CommentInfo {
            content: self.text.trim().to_string(),
            line_number: self.start_line,
            kind: CommentKind::Docstring,
            associated_element: self.associated_element,
            tags: Vec::new(),
        }
    }
}

/// Extract inline comments and docstrings in line order.
pub fn extract_comments(content: &str) -> Vec<CommentInfo> {
    let mut comments = Vec::new();

    let (Ok(open_re), Ok(def_re), Ok(inline_re), Ok(marker_re)) = (
        Regex::new(DOCSTRING_OPEN_PATTERN),
        Regex::new(DEF_CLASS_PATTERN),
        Regex::new(INLINE_COMMENT_PATTERN),
        Regex::new(TODO_FIXME_PATTERN),
    ) else {
        return comments;
    };

    let lines: Vec<&str> = content.split('\n').collect();
    let mut open: Option<OpenDocstring> = None;

    for (idx, line) in lines.iter().enumerate() {
        let line_number = idx + 1;

        if let Some(mut doc) = open.take() {
            doc.text.push('\n');
            doc.text.push_str(line);
            if line.trim().contains(doc.delimiter.as_str()) {
                comments.push(doc.finish());
            } else {
                open = Some(doc);
            }
            continue;
        }

        if let Some(cap) = open_re.captures(line) {
            let delimiter = cap[1].to_string();
            let associated_element = idx
                .checked_sub(1)
                .and_then(|prev| def_re.captures(lines[prev]))
                .map(|c| c[2].to_string());

            open = Some(OpenDocstring {
                delimiter,
                start_line: line_number,
                text: line.to_string(),
                associated_element,
            });
            continue;
        }

        if let Some(m) = inline_re.find(line) {
            let text = m.as_str().trim().to_string();
            let (kind, tags) = classify(&text, marker_re.is_match(line));
            comments.push(CommentInfo {
                content: text,
                line_number,
                kind,
                associated_element: None,
                tags,
            });
        }
    }

    // An unterminated docstring still counts, with whatever it gathered.
    if let Some(doc) = open {
        comments.push(doc.finish());
    }

    comments
}

/// `TODO` is checked before `FIXME`.
fn classify(text: &str, has_marker: bool) -> (CommentKind, Vec<String>) {
    if has_marker {
        let upper = text.to_uppercase();
        if upper.contains("TODO") {
            return (CommentKind::Todo, vec!["TODO".to_string()]);
        }
        if upper.contains("FIXME") {
            return (CommentKind::Fixme, vec!["FIXME".to_string()]);
        }
    }
    (CommentKind::Inline, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docstring_after_class_is_associated() {
        let code = "class Foo:\n    \"\"\"does foo\"\"\"\n";
        let comments = extract_comments(code);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].kind, CommentKind::Docstring);
        assert_eq!(comments[0].associated_element.as_deref(), Some("Foo"));
        assert_eq!(comments[0].content, "\"\"\"does foo\"\"\"");
        assert_eq!(comments[0].line_number, 2);
    }

    #[test]
    fn test_one_line_docstring_stays_open_until_next_delimiter() {
        let code = "class Foo:\n    \"\"\"does foo\"\"\"\n    x = 1  # note\n    def bar(self):\n        \"\"\"bar doc\"\"\"\n";
        let comments = extract_comments(code);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].kind, CommentKind::Docstring);
        assert_eq!(comments[0].line_number, 2);
        assert_eq!(comments[0].associated_element.as_deref(), Some("Foo"));
        assert!(comments[0].content.contains("# note"));
        assert!(comments[0].content.ends_with("\"\"\"bar doc\"\"\""));
    }

    #[test]
    fn test_multiline_docstring() {
        let code = r#"def run(x):
    '''
    Runs things.
    # not a comment
    '''
    return x  # done
"#;
        let comments = extract_comments(code);
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].kind, CommentKind::Docstring);
        assert_eq!(comments[0].associated_element.as_deref(), Some("run"));
        assert!(comments[0].content.contains("Runs things."));
        assert_eq!(comments[0].line_number, 2);
        assert_eq!(comments[1].kind, CommentKind::Inline);
        assert_eq!(comments[1].content, "# done");
        assert_eq!(comments[1].line_number, 6);
    }

    #[test]
    fn test_todo_checked_before_fixme() {
        let code = "x = 1  # fixme and todo later\ny = 2  # FIXME: broken\nz = 3  # todos\n";
        let comments = extract_comments(code);
        assert_eq!(comments[0].kind, CommentKind::Todo);
        assert_eq!(comments[0].tags, ["TODO"]);
        assert_eq!(comments[1].kind, CommentKind::Fixme);
        assert_eq!(comments[1].tags, ["FIXME"]);
        assert_eq!(comments[2].kind, CommentKind::Inline);
        assert!(comments[2].tags.is_empty());
    }

    #[test]
    fn test_docstring_without_declaration() {
        let code = "\"\"\"Module docs.\"\"\"\nimport os  # std\n";
        let comments = extract_comments(code);
        // Nothing closes the docstring, so it runs to the end of the file.
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].associated_element, None);
        assert!(comments[0].content.contains("import os  # std"));
    }

    #[test]
    fn test_unterminated_docstring_is_kept() {
        let code = "def f():\n    \"\"\"never closed\n    body\n";
        let comments = extract_comments(code);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].kind, CommentKind::Docstring);
        assert!(comments[0].content.starts_with("\"\"\"never closed"));
    }
}
