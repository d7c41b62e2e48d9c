//! Documentation files: Markdown and reStructuredText section outlines.

use regex::Regex;
use std::path::Path;

const MARKDOWN_HEADING_PATTERN: &str = r"^(#{1,6})\s+(.*)";
const RST_UNDERLINE_PATTERN: &str = r#"^[=~\-`:'^".#*]{2,}$"#;

/// File names (lowercased) treated as project documentation.
pub const DOCUMENTATION_FILES: &[&str] = &["readme.md", "readme.rst", "api.md", "docs.md"];

/// A titled section of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    /// Body text up to the next heading, trimmed
    pub content: String,
}

/// Whether a file name is one of the recognized documentation files.
pub fn is_documentation_file(file_name: &str) -> bool {
    DOCUMENTATION_FILES.contains(&file_name.to_lowercase().as_str())
}

/// Split a document into sections, picking the format from the extension.
pub fn parse_sections(rel_path: &str, content: &str) -> Vec<Section> {
    let is_rst = Path::new(rel_path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("rst"));
    if is_rst {
        parse_rst(content)
    } else {
        parse_markdown(content)
    }
}

/// `#`-style headings. Text before the first heading is dropped.
pub fn parse_markdown(content: &str) -> Vec<Section> {
    let Ok(heading) = Regex::new(MARKDOWN_HEADING_PATTERN) else {
        return Vec::new();
    };

    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;
    for line in content.lines() {
        if let Some(cap) = heading.captures(line) {
            if let Some((title, body)) = current.take() {
                sections.push(finish(title, &body));
            }
            current = Some((cap[2].trim().to_string(), Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((title, body)) = current {
        sections.push(finish(title, &body));
    }
    sections
}

/// Titles underlined with a run of punctuation.
pub fn parse_rst(content: &str) -> Vec<Section> {
    let Ok(underline) = Regex::new(RST_UNDERLINE_PATTERN) else {
        return Vec::new();
    };

    let lines: Vec<&str> = content.lines().collect();
    let is_title = |i: usize| {
        let title = lines[i].trim();
        !title.is_empty()
            && !underline.is_match(title)
            && lines.get(i + 1).is_some_and(|next| underline.is_match(next.trim()))
    };

    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;
    let mut i = 0;
    while i < lines.len() {
        if is_title(i) {
            if let Some((title, body)) = current.take() {
                sections.push(finish(title, &body));
            }
            current = Some((lines[i].trim().to_string(), Vec::new()));
            i += 2;
            continue;
        }
        if let Some((_, body)) = current.as_mut() {
            body.push(lines[i]);
        }
        i += 1;
    }
    if let Some((title, body)) = current {
        sections.push(finish(title, &body));
    }
    sections
}

fn finish(title: String, body: &[&str]) -> Section {
    Section {
        title,
        content: body.join("\n").trim().to_string(),
    }
}

/// Running line and section totals across all documentation files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocCoverage {
    pub total_lines: usize,
    pub total_sections: usize,
}

impl DocCoverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one parsed document.
    pub fn record(&mut self, content: &str, sections: &[Section]) {
        self.total_lines += content.lines().count();
        self.total_sections += sections.len();
    }

    /// Sections per hundred lines of documentation.
    pub fn coverage(&self) -> f64 {
        if self.total_lines == 0 {
            return 0.0;
        }
        self.total_sections as f64 / self.total_lines as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_markdown() {
        let md = r#"preamble
# Project
Intro text.

## Install
pip install demo
"#;
        let sections = parse_markdown(md);
        assert_eq!(
            sections,
            [
                Section { title: "Project".into(), content: "Intro text.".into() },
                Section { title: "Install".into(), content: "pip install demo".into() },
            ]
        );
    }

    #[test]
    fn test_parse_rst() {
        let rst = r#"Demo
====

Overview of demo.

Usage
-----
Run it.
"#;
        let sections = parse_sections("README.rst", rst);
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Demo", "Usage"]);
        assert_eq!(sections[0].content, "Overview of demo.");
        assert_eq!(sections[1].content, "Run it.");
    }

    #[test]
    fn test_coverage() {
        let mut coverage = DocCoverage::new();
        assert_eq!(coverage.coverage(), 0.0);

        let md = "# A\nx\n# B\ny\n";
        coverage.record(md, &parse_markdown(md));
        assert_eq!(coverage.total_lines, 4);
        assert_eq!(coverage.total_sections, 2);
        assert_eq!(coverage.coverage(), 50.0);
    }

    #[test]
    fn test_is_documentation_file() {
        assert!(is_documentation_file("README.md"));
        assert!(is_documentation_file("Docs.md"));
        assert!(!is_documentation_file("CHANGELOG.md"));
    }
}
