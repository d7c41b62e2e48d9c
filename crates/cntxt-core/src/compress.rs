//! Codebook compression of the graph into a line-oriented text format.
//!
//! Every distinct term in the graph (ids, keys, scalar values, relations) is
//! replaced by a surrogate `T<n>`, numbered in sorted term order. The output
//! is an instruction header, the codebook, one `N|` line per node and one
//! `L|` line per link:
//!
//! ```text
//! # T1:File: a.py
//! N|T1|T4=T3;T2=T5
//! L|T1|T6|T7
//! ```
//!
//! Lists render as `[a,b]` and objects as `{k:v,...}`. [`decompress`] reverses
//! the substitution and is used to check round trips.

use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use crate::error::{CntxtError, Result};
use crate::export::{read_graph_json, GraphSection};

/// Instructions written ahead of the codebook, one entry per line.
pub const HEADER_LINES: &[&str] = &[
    "# Compressed Knowledge Graph",
    "# Instructions for LLM:",
    "# - Data is compressed using abbreviations.",
    "# - Use the codebook to map abbreviations back to terms.",
    "# - Each line represents a node or link.",
    "# - Node lines start with 'N' and are in the format:",
    "#   N|ID|ATTR1=VAL1;ATTR2=VAL2;...",
    "# - Link lines start with 'L' and are in the format:",
    "#   L|SOURCE|RELATION|TARGET",
    "# - Attributes and values are abbreviated using the codebook.",
    "# - Nested structures are represented with brackets:",
    "#   - Lists: [VAL1,VAL2,...]",
    "#   - Dicts: {KEY1:VAL1,KEY2:VAL2,...}",
    "# Codebook:",
];

const SURROGATE_PREFIX: char = 'T';

// =============================================================================
// CODEBOOK
// =============================================================================

/// Sorted term table with `T1..Tn` surrogates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Codebook {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl Codebook {
    /// Harvest every term of a graph section.
    pub fn build(section: &GraphSection) -> Self {
        let mut terms = BTreeSet::new();
        for node in &section.nodes {
            if let Some(id) = node.get("id") {
                terms.insert(scalar_text(id));
            }
            for (key, value) in node {
                terms.insert(key.clone());
                collect_terms(value, &mut terms);
            }
        }
        for link in &section.links {
            terms.insert(link.source.clone());
            terms.insert(link.relation.clone());
            terms.insert(link.target.clone());
        }
        Self::from_terms(terms)
    }

    /// Number terms in sorted order.
    pub fn from_terms(terms: impl IntoIterator<Item = String>) -> Self {
        let sorted: BTreeSet<String> = terms.into_iter().collect();
        let terms: Vec<String> = sorted.into_iter().collect();
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self { terms, index }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Surrogate of a term, if the term is in the codebook.
    pub fn surrogate(&self, term: &str) -> Option<String> {
        self.index.get(term).map(|&i| surrogate_for(i))
    }

    /// Surrogate of a term, or the term itself when it is not in the codebook.
    pub fn abbreviate(&self, term: &str) -> String {
        self.surrogate(term).unwrap_or_else(|| term.to_string())
    }

    /// `(surrogate, term)` pairs in surrogate number order.
    pub fn entries(&self) -> impl Iterator<Item = (String, &str)> {
        self.terms
            .iter()
            .enumerate()
            .map(|(i, t)| (surrogate_for(i), t.as_str()))
    }
}

fn surrogate_for(index: usize) -> String {
    format!("{}{}", SURROGATE_PREFIX, index + 1)
}

/// Text a JSON scalar contributes to the codebook.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn collect_terms(value: &Value, terms: &mut BTreeSet<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_terms(item, terms);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                terms.insert(key.clone());
                collect_terms(item, terms);
            }
        }
        scalar => {
            terms.insert(scalar_text(scalar));
        }
    }
}

// =============================================================================
// COMPRESSION
// =============================================================================

/// Compressed text together with the codebook it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedGraph {
    pub codebook: Codebook,
    pub text: String,
}

/// Compress a graph section.
pub fn compress(section: &GraphSection) -> CompressedGraph {
    let codebook = Codebook::build(section);
    let mut lines: Vec<String> = HEADER_LINES.iter().map(|l| l.to_string()).collect();

    for (surrogate, term) in codebook.entries() {
        lines.push(format!("# {}:{}", surrogate, term));
    }

    for node in &section.nodes {
        let id = node.get("id").map(scalar_text).unwrap_or_default();
        let attributes: Vec<String> = node
            .iter()
            .filter(|(key, _)| key.as_str() != "id")
            .map(|(key, value)| {
                format!("{}={}", codebook.abbreviate(key), abbreviate_value(value, &codebook))
            })
            .collect();
        lines.push(format!(
            "N|{}|{}",
            codebook.abbreviate(&id),
            attributes.join(";")
        ));
    }

    for link in &section.links {
        lines.push(format!(
            "L|{}|{}|{}",
            codebook.abbreviate(&link.source),
            codebook.abbreviate(&link.relation),
            codebook.abbreviate(&link.target)
        ));
    }

    CompressedGraph {
        codebook,
        text: lines.join("\n"),
    }
}

fn abbreviate_value(value: &Value, codebook: &Codebook) -> String {
    match value {
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(|v| abbreviate_value(v, codebook)).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let items: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}:{}", codebook.abbreviate(k), abbreviate_value(v, codebook)))
                .collect();
            format!("{{{}}}", items.join(","))
        }
        scalar => codebook.abbreviate(&scalar_text(scalar)),
    }
}

/// Compress a graph JSON file into a text file, creating the output directory.
pub fn compress_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<CompressedGraph> {
    let output = output.as_ref();
    let document = read_graph_json(input)?;
    let compressed = compress(&document.graph);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CntxtError::io(parent, e))?;
    }
    fs::write(output, &compressed.text).map_err(|e| CntxtError::io(output, e))?;
    log::info!(
        "Compressed {} terms into {}",
        compressed.codebook.len(),
        output.display()
    );
    Ok(compressed)
}

// =============================================================================
// DECOMPRESSION
// =============================================================================

/// A decoded attribute value. Scalars come back as their codebook text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    Scalar(String),
    List(Vec<DecodedValue>),
    Map(Vec<(String, DecodedValue)>),
}

impl DecodedValue {
    /// The decoded form a JSON value is expected to come back as.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
            scalar => Self::Scalar(scalar_text(scalar)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedNode {
    pub id: String,
    pub attributes: Vec<(String, DecodedValue)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLink {
    pub source: String,
    pub relation: String,
    pub target: String,
}

/// A compressed graph with every surrogate expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedGraph {
    pub nodes: Vec<DecodedNode>,
    pub links: Vec<DecodedLink>,
}

impl DecodedGraph {
    /// The decoded form a section is expected to round-trip to.
    pub fn from_section(section: &GraphSection) -> Self {
        let nodes = section
            .nodes
            .iter()
            .map(|node| DecodedNode {
                id: node.get("id").map(scalar_text).unwrap_or_default(),
                attributes: attributes_of(node),
            })
            .collect();
        let links = section
            .links
            .iter()
            .map(|l| DecodedLink {
                source: l.source.clone(),
                relation: l.relation.clone(),
                target: l.target.clone(),
            })
            .collect();
        Self { nodes, links }
    }
}

fn attributes_of(node: &Map<String, Value>) -> Vec<(String, DecodedValue)> {
    node.iter()
        .filter(|(key, _)| key.as_str() != "id")
        .map(|(key, value)| (key.clone(), DecodedValue::from_json(value)))
        .collect()
}

/// Parse compressed text back into terms.
///
/// Codebook entries are expected in surrogate order. A line that neither
/// starts the next entry nor is a well-formed body line (every field a known
/// surrogate) continues the previous term, so terms containing newlines
/// survive, including lines that happen to start with `N|` or `L|`.
pub fn decompress(text: &str) -> Result<DecodedGraph> {
    let mut terms: HashMap<String, String> = HashMap::new();
    let mut last: Option<String> = None;
    let mut graph = DecodedGraph::default();
    let mut in_body = false;

    for (line_no, line) in text.split('\n').enumerate() {
        if !in_body {
            if is_body_line(line, terms.len()) {
                in_body = true;
            } else {
                let next = surrogate_for(terms.len());
                let prefix = format!("# {}:", next);
                if let Some(term) = line.strip_prefix(&prefix) {
                    terms.insert(next.clone(), term.to_string());
                    last = Some(next);
                } else if let Some(term) = last.as_ref().and_then(|s| terms.get_mut(s)) {
                    term.push('\n');
                    term.push_str(line);
                }
                continue;
            }
        }

        let expand = |token: &str| terms.get(token).cloned().unwrap_or_else(|| token.to_string());
        if let Some(rest) = line.strip_prefix("N|") {
            let (id, attrs) = rest.split_once('|').ok_or_else(|| malformed(line_no, line))?;
            let attributes = if attrs.is_empty() {
                Vec::new()
            } else {
                split_top_level(attrs, ';')
                    .into_iter()
                    .map(|pair| -> Result<(String, DecodedValue)> {
                        let (key, value) = pair.split_once('=').ok_or_else(|| malformed(line_no, line))?;
                        let mut parser = ValueParser::new(value, &terms);
                        let decoded = parser.parse().ok_or_else(|| malformed(line_no, line))?;
                        Ok((expand(key), decoded))
                    })
                    .collect::<Result<Vec<_>>>()?
            };
            graph.nodes.push(DecodedNode {
                id: expand(id),
                attributes,
            });
        } else if let Some(rest) = line.strip_prefix("L|") {
            let parts: Vec<&str> = rest.split('|').collect();
            let [source, relation, target] = parts.as_slice() else {
                return Err(malformed(line_no, line));
            };
            graph.links.push(DecodedLink {
                source: expand(*source),
                relation: expand(*relation),
                target: expand(*target),
            });
        } else if !line.is_empty() {
            return Err(malformed(line_no, line));
        }
    }

    Ok(graph)
}

/// `T<k>` with `1 <= k <= known`.
fn is_surrogate(token: &str, known: usize) -> bool {
    token
        .strip_prefix(SURROGATE_PREFIX)
        .and_then(|n| n.parse::<usize>().ok())
        .is_some_and(|n| (1..=known).contains(&n))
}

/// Whether a line is an `N|` or `L|` line written against the first `known` terms.
fn is_body_line(line: &str, known: usize) -> bool {
    if let Some(rest) = line.strip_prefix("N|") {
        let Some((id, attrs)) = rest.split_once('|') else {
            return false;
        };
        is_surrogate(id, known)
            && attrs
                .split(['=', ';', ',', ':', '[', ']', '{', '}'])
                .filter(|t| !t.is_empty())
                .all(|t| is_surrogate(t, known))
    } else if let Some(rest) = line.strip_prefix("L|") {
        let fields: Vec<&str> = rest.split('|').collect();
        fields.len() == 3 && fields.iter().all(|f| is_surrogate(f, known))
    } else {
        false
    }
}

fn malformed(line_no: usize, line: &str) -> CntxtError {
    CntxtError::MalformedGraph(format!("line {}: {}", line_no + 1, line))
}

/// Split on `sep` outside brackets.
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '[' | '{' => depth += 1,
            ']' | '}' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Recursive parser for `[..]`, `{k:v,..}` and surrogate tokens.
struct ValueParser<'a> {
    input: &'a str,
    pos: usize,
    terms: &'a HashMap<String, String>,
}

impl<'a> ValueParser<'a> {
    fn new(input: &'a str, terms: &'a HashMap<String, String>) -> Self {
        Self {
            input,
            pos: 0,
            terms,
        }
    }

    /// Parse the whole input as one value.
    fn parse(&mut self) -> Option<DecodedValue> {
        let value = self.value()?;
        (self.pos == self.input.len()).then_some(value)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn value(&mut self) -> Option<DecodedValue> {
        if self.eat('[') {
            let mut items = Vec::new();
            if self.eat(']') {
                return Some(DecodedValue::List(items));
            }
            loop {
                items.push(self.value()?);
                if self.eat(']') {
                    return Some(DecodedValue::List(items));
                }
                if !self.eat(',') {
                    return None;
                }
            }
        }
        if self.eat('{') {
            let mut entries = Vec::new();
            if self.eat('}') {
                return Some(DecodedValue::Map(entries));
            }
            loop {
                let key = self.token(&[':'])?;
                if !self.eat(':') {
                    return None;
                }
                entries.push((key, self.value()?));
                if self.eat('}') {
                    return Some(DecodedValue::Map(entries));
                }
                if !self.eat(',') {
                    return None;
                }
            }
        }
        self.token(&[',', ']', '}']).map(DecodedValue::Scalar)
    }

    /// A bare token up to one of `stops`, expanded through the codebook.
    fn token(&mut self, stops: &[char]) -> Option<String> {
        let rest = &self.input[self.pos..];
        let end = rest.find(|c: char| stops.contains(&c)).unwrap_or(rest.len());
        let raw = &rest[..end];
        self.pos += end;
        Some(
            self.terms
                .get(raw)
                .cloned()
                .unwrap_or_else(|| raw.to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::LinkRecord;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn section() -> GraphSection {
        let nodes = vec![
            json!({"id": "File: a.py", "type": "file", "path": "a.py"}),
            json!({
                "id": "Function: run",
                "type": "function",
                "return_type": null,
                "parameters": [{"name": "x", "type": "int", "default": "1"}],
                "decorators": [],
                "is_async": true
            }),
            json!({"id": "Log: 1", "type": "log_statement", "level": "INFO", "message": "a\nb"}),
        ];
        GraphSection {
            directed: true,
            multigraph: false,
            nodes: nodes
                .into_iter()
                .filter_map(|v| v.as_object().cloned())
                .collect(),
            links: vec![LinkRecord {
                source: "File: a.py".into(),
                target: "Function: run".into(),
                relation: "DEFINES".into(),
            }],
        }
    }

    #[test]
    fn test_codebook_numbers_sorted_terms() {
        let codebook = Codebook::from_terms(["b".to_string(), "a".to_string(), "a".to_string()]);
        assert_eq!(codebook.len(), 2);
        assert_eq!(codebook.surrogate("a").as_deref(), Some("T1"));
        assert_eq!(codebook.surrogate("b").as_deref(), Some("T2"));
        assert_eq!(codebook.abbreviate("missing"), "missing");
    }

    #[test]
    fn test_compress_layout() {
        let compressed = compress(&section());
        let lines: Vec<&str> = compressed.text.lines().collect();

        assert_eq!(&lines[..HEADER_LINES.len()], HEADER_LINES);
        // Digits sort before upper case, which sorts before lower case.
        assert_eq!(lines[HEADER_LINES.len()], "# T1:1");
        assert_eq!(lines[HEADER_LINES.len() + 1], "# T2:DEFINES");
        assert!(!compressed.text.ends_with('\n'));

        let codebook = &compressed.codebook;
        let link = format!(
            "L|{}|{}|{}",
            codebook.abbreviate("File: a.py"),
            codebook.abbreviate("DEFINES"),
            codebook.abbreviate("Function: run")
        );
        assert!(lines.contains(&link.as_str()));

        let first_node = format!(
            "N|{}|{}={};{}={}",
            codebook.abbreviate("File: a.py"),
            codebook.abbreviate("type"),
            codebook.abbreviate("file"),
            codebook.abbreviate("path"),
            codebook.abbreviate("a.py")
        );
        assert!(lines.contains(&first_node.as_str()));
        assert!(codebook.surrogate("null").is_some());
        assert!(codebook.surrogate("true").is_some());
        assert!(codebook.surrogate("id").is_some());
    }

    #[test]
    fn test_round_trip() {
        let section = section();
        let compressed = compress(&section);
        let decoded = decompress(&compressed.text).unwrap();
        assert_eq!(decoded, DecodedGraph::from_section(&section));
    }

    #[test]
    fn test_decompress_rejects_garbage() {
        let text = format!("{}\n# T1:x\nN|T1|\nN|T1", HEADER_LINES.join("\n"));
        assert!(matches!(decompress(&text), Err(CntxtError::MalformedGraph(_))));
    }

    #[test]
    fn test_term_with_body_like_lines_round_trips() {
        let node = json!({
            "id": "Comment: 3_abc",
            "type": "comment",
            "content": "\"\"\"Table\nN|x|y\nL|a|b|c\n\"\"\""
        });
        let section = GraphSection {
            directed: true,
            multigraph: false,
            nodes: node.as_object().cloned().into_iter().collect(),
            links: Vec::new(),
        };

        let compressed = compress(&section);
        assert!(compressed.text.lines().any(|l| l == "N|x|y"));
        let decoded = decompress(&compressed.text).unwrap();
        assert_eq!(decoded, DecodedGraph::from_section(&section));
    }
}
