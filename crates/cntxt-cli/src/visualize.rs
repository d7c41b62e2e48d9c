//! Graphviz export of the knowledge graph.
//!
//! Nodes are filled by kind; implicit endpoints get the default color.
//! Rendering is left to `dot` or any other Graphviz consumer.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use cntxt_core::ontology::NodeKind;
use cntxt_core::KnowledgeGraph;
use color_eyre::eyre::{Result, WrapErr};

const DEFAULT_COLOR: &str = "#FFFFFF";

/// Fill color for a node kind.
fn color_for(kind: Option<NodeKind>) -> &'static str {
    match kind {
        Some(NodeKind::File) => "#ADD8E6",
        Some(NodeKind::Class) => "#FFE5B4",
        Some(NodeKind::Function) => "#FFD700",
        Some(NodeKind::Variable) => "#FFB6C1",
        Some(NodeKind::Method) => "#E6E6FA",
        Some(NodeKind::Import) => "#DDA0DD",
        Some(NodeKind::Dependency) => "#8A2BE2",
        Some(NodeKind::Decorator) => "#FFA07A",
        Some(NodeKind::Comment) => "#C0C0C0",
        Some(NodeKind::LogStatement) => "#808080",
        Some(NodeKind::Integration) => "#FFDAB9",
        Some(NodeKind::Version) => "#00CED1",
        Some(NodeKind::Localization) => "#40E0D0",
        Some(NodeKind::BuildScript) => "#B0E0E6",
        Some(NodeKind::Documentation) => "#F5DEB3",
        Some(NodeKind::Project) => "#98FB98",
        Some(NodeKind::Config) => "#FFE4B5",
        None => DEFAULT_COLOR,
    }
}

fn escape(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Render the graph as a DOT digraph.
pub fn render_dot(graph: &KnowledgeGraph) -> String {
    let mut out = String::from("digraph knowledge_graph {\n");
    out.push_str("    rankdir=LR;\n");
    out.push_str("    node [shape=box, style=filled, fontsize=10];\n");
    out.push_str("    edge [fontsize=8];\n");

    for node in graph.nodes() {
        let _ = writeln!(
            out,
            "    \"{}\" [fillcolor=\"{}\"];",
            escape(node.id.as_str()),
            color_for(node.kind())
        );
    }
    for edge in graph.edges() {
        let _ = writeln!(
            out,
            "    \"{}\" -> \"{}\" [label=\"{}\"];",
            escape(edge.source.as_str()),
            escape(edge.target.as_str()),
            edge.relation
        );
    }

    out.push_str("}\n");
    out
}

/// Write the DOT export, creating parent directories.
pub fn write_dot(graph: &KnowledgeGraph, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, render_dot(graph))
        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    log::info!("Visualization saved to {}", path.display());
    Ok(())
}
