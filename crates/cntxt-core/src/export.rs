//! Graph JSON document: node-link graph plus analysis metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{CntxtError, Result};
use crate::graph::KnowledgeGraph;
use crate::ontology::BuildTool;
use crate::stats::StatsReport;

/// Interval between existence checks in [`wait_for_file`].
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// The complete JSON artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub graph: GraphSection,
    pub metadata: Metadata,
}

/// Node-link form of a directed graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSection {
    pub directed: bool,
    pub multigraph: bool,
    /// One JSON object per node; `id` first, then `type`, then record fields
    pub nodes: Vec<Map<String, Value>>,
    pub links: Vec<LinkRecord>,
}

/// One directed, labelled edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub source: String,
    pub target: String,
    pub relation: String,
}

/// Run-level facts written alongside the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub stats: StatsReport,
    pub build_info: BuildInfo,
    pub documentation: DocumentationInfo,
    pub analysis_timestamp: String,
    pub analyzed_directory: String,
    pub modules: Vec<String>,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub python_version: Option<String>,
    pub build_tool: BuildTool,
    /// Dotted name of the first module with a `__main__` guard
    pub main_module: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentationInfo {
    pub readme_path: String,
    pub api_docs: String,
    /// Documentation sections per hundred lines
    pub coverage_threshold: f64,
}

impl GraphSection {
    /// Snapshot a graph. Node and link order follow the store's iteration order.
    pub fn from_graph(graph: &KnowledgeGraph) -> Result<Self> {
        let mut nodes = Vec::with_capacity(graph.node_count());
        for node in graph.nodes() {
            match serde_json::to_value(node)? {
                Value::Object(map) => nodes.push(map),
                other => {
                    return Err(CntxtError::MalformedGraph(format!(
                        "node {} serialized to {}",
                        node.id, other
                    )))
                }
            }
        }

        let links = graph
            .edges()
            .map(|edge| LinkRecord {
                source: edge.source.to_string(),
                target: edge.target.to_string(),
                relation: edge.relation.to_string(),
            })
            .collect();

        Ok(Self {
            directed: true,
            multigraph: false,
            nodes,
            links,
        })
    }
}

/// Write the document as pretty-printed JSON, creating parent directories.
pub fn write_graph_json(path: impl AsRef<Path>, document: &GraphDocument) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CntxtError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(document)?;
    fs::write(path, json).map_err(|e| CntxtError::io(path, e))?;
    log::info!("Knowledge graph saved to {}", path.display());
    Ok(())
}

/// Read a graph document back.
pub fn read_graph_json(path: impl AsRef<Path>) -> Result<GraphDocument> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| CntxtError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Poll until `path` exists, checking once per second.
pub fn wait_for_file(path: impl AsRef<Path>, timeout: Duration) -> Result<()> {
    let path = path.as_ref();
    let started = Instant::now();
    loop {
        if path.exists() {
            return Ok(());
        }
        if started.elapsed() >= timeout {
            return Err(CntxtError::OutputTimeout {
                path: path.to_path_buf(),
                seconds: timeout.as_secs(),
            });
        }
        log::debug!("Waiting for {} to be created", path.display());
        thread::sleep(POLL_INTERVAL.min(timeout.saturating_sub(started.elapsed())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{NamedEntity, NodeId, NodePayload, Relation};
    use tempfile::TempDir;

    #[test]
    fn test_from_graph_keeps_order() {
        let mut graph = KnowledgeGraph::new();
        let file = NodeId::file("a.py");
        let import = NodeId::import("os");
        graph.add_edge(&file, &import, Relation::Imports);
        graph.add_node(import.clone(), NodePayload::Import(NamedEntity { name: "os".into() }));

        let section = GraphSection::from_graph(&graph).unwrap();
        assert_eq!(section.nodes.len(), 2);
        assert_eq!(section.nodes[0].keys().collect::<Vec<_>>(), ["id"]);
        assert_eq!(
            section.nodes[1].keys().collect::<Vec<_>>(),
            ["id", "type", "name"]
        );
        assert_eq!(
            section.links,
            [LinkRecord {
                source: "File: a.py".into(),
                target: "Import: os".into(),
                relation: "IMPORTS".into(),
            }]
        );
    }

    #[test]
    fn test_wait_for_file_times_out() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("never.json");
        let err = wait_for_file(&missing, Duration::ZERO).unwrap_err();
        assert!(matches!(err, CntxtError::OutputTimeout { seconds: 0, .. }));

        fs::write(&missing, "{}").unwrap();
        assert!(wait_for_file(&missing, Duration::ZERO).is_ok());
    }
}
