use std::fs;

use cntxt_core::compress::{DecodedValue, HEADER_LINES};
use cntxt_core::config::ScanConfig;
use cntxt_core::{
    compress, compress_file, decompress, write_graph_json, CntxtError, CodebaseAnalyzer,
    DecodedGraph,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn analyzed_document(root: &std::path::Path) -> cntxt_core::GraphDocument {
    fs::write(
        root.join("app.py"),
        r#"import os

TIMEOUT: int = 30


@staticmethod
def handler(event: dict, retries: int = 3) -> None:
    """Handle one event."""
    # TODO: batch events
    print(os.getenv("API_KEY"))
"#,
    )
    .unwrap();
    fs::write(root.join("Pipfile"), "[packages]\nrequests = \"*\"\n").unwrap();

    CodebaseAnalyzer::new(root, &ScanConfig::default())
        .with_timestamp("2024-01-01T00:00:00+00:00")
        .analyze()
        .unwrap()
        .document()
        .unwrap()
}

#[test]
fn test_analyzed_graph_round_trips() {
    let dir = TempDir::new().unwrap();
    let document = analyzed_document(dir.path());

    let compressed = compress(&document.graph);
    let decoded = decompress(&compressed.text).unwrap();
    assert_eq!(decoded, DecodedGraph::from_section(&document.graph));

    // Parameters are a list of objects.
    let handler = decoded
        .nodes
        .iter()
        .find(|n| n.id == "Function: handler")
        .unwrap();
    let parameters = handler
        .attributes
        .iter()
        .find(|(k, _)| k == "parameters")
        .map(|(_, v)| v)
        .unwrap();
    assert!(matches!(parameters, DecodedValue::List(items) if items.len() == 2));
}

#[test]
fn test_compress_file_writes_header_and_codebook() {
    let dir = TempDir::new().unwrap();
    let document = analyzed_document(dir.path());
    let json = dir.path().join("out/graph.json");
    let text = dir.path().join("out/nested/graph.txt");
    write_graph_json(&json, &document).unwrap();

    let compressed = compress_file(&json, &text).unwrap();
    let written = fs::read_to_string(&text).unwrap();
    assert_eq!(written, compressed.text);

    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(&lines[..HEADER_LINES.len()], HEADER_LINES);
    assert!(lines[HEADER_LINES.len()].starts_with("# T1:"));
    assert!(lines.iter().any(|l| l.starts_with("N|")));
    assert!(lines.iter().any(|l| l.starts_with("L|")));
    assert!(compressed.codebook.surrogate("Function: handler").is_some());
}

#[test]
fn test_compress_file_missing_input() {
    let dir = TempDir::new().unwrap();
    let err = compress_file(dir.path().join("none.json"), dir.path().join("out.txt")).unwrap_err();
    assert!(matches!(err, CntxtError::Io { .. }));
}

#[test]
fn test_compress_file_rejects_non_graph_json() {
    let dir = TempDir::new().unwrap();
    let json = dir.path().join("graph.json");
    fs::write(&json, r#"{"nodes": []}"#).unwrap();
    let err = compress_file(&json, dir.path().join("out.txt")).unwrap_err();
    assert!(matches!(err, CntxtError::Json(_)));
}
