//! Knowledge graph store and assembler.
//!
//! ## Modules
//!
//! - `assembler` - `GraphAssembler`, one typed operation per extracted fact
//!
//! [`KnowledgeGraph`] is a directed graph with at most one edge per ordered
//! pair of nodes. Node and link iteration are deterministic: nodes come out
//! in insertion order, links grouped by source in node order and then by the
//! order each target was first linked.

mod assembler;

pub use assembler::GraphAssembler;

use std::collections::HashMap;

use crate::ontology::{GraphNode, NodeId, NodePayload, Relation};

/// Outcome of [`KnowledgeGraph::add_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// A new node was recorded, or an implicit endpoint received its payload.
    Inserted,
    /// A node with this id already carries a payload; nothing changed.
    Existing,
}

/// Outcome of [`KnowledgeGraph::add_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeUpsert {
    Inserted,
    /// The pair was already linked with the same relation.
    Unchanged,
    /// The pair was linked with another relation, which was overwritten.
    Replaced(Relation),
}

/// A borrowed view of one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef<'a> {
    pub source: &'a NodeId,
    pub target: &'a NodeId,
    pub relation: Relation,
}

/// Deduplicating directed property graph.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<NodeId, usize>,
    /// Outgoing edges per node slot, in first-insertion order
    adjacency: Vec<Vec<(usize, Relation)>>,
    /// `(source, target)` slot pair to position in `adjacency[source]`
    edge_index: HashMap<(usize, usize), usize>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node. The first payload stored under an id wins.
    pub fn add_node(&mut self, id: NodeId, payload: NodePayload) -> Upsert {
        match self.index.get(&id) {
            Some(&slot) => {
                let node = &mut self.nodes[slot];
                if node.payload.is_some() {
                    Upsert::Existing
                } else {
                    node.payload = Some(payload);
                    Upsert::Inserted
                }
            }
            None => {
                self.push_node(id, Some(payload));
                Upsert::Inserted
            }
        }
    }

    /// Link two nodes. Endpoints that do not exist yet are created without
    /// a payload; re-linking a pair replaces its relation.
    pub fn add_edge(&mut self, source: &NodeId, target: &NodeId, relation: Relation) -> EdgeUpsert {
        let from = self.slot_or_insert(source);
        let to = self.slot_or_insert(target);

        match self.edge_index.get(&(from, to)) {
            Some(&pos) => {
                let existing = &mut self.adjacency[from][pos].1;
                if *existing == relation {
                    EdgeUpsert::Unchanged
                } else {
                    let previous = *existing;
                    *existing = relation;
                    EdgeUpsert::Replaced(previous)
                }
            }
            None => {
                self.edge_index.insert((from, to), self.adjacency[from].len());
                self.adjacency[from].push((to, relation));
                EdgeUpsert::Inserted
            }
        }
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.index.get(id).map(|&slot| &self.nodes[slot])
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }

    /// Edges grouped by source in node order, then by target first-insertion order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_>> {
        self.adjacency.iter().enumerate().flat_map(move |(from, targets)| {
            targets.iter().map(move |&(to, relation)| EdgeRef {
                source: &self.nodes[from].id,
                target: &self.nodes[to].id,
                relation,
            })
        })
    }

    /// Outgoing edges of one node.
    pub fn edges_from(&self, id: &NodeId) -> Vec<EdgeRef<'_>> {
        let Some(&from) = self.index.get(id) else {
            return Vec::new();
        };
        self.adjacency[from]
            .iter()
            .map(|&(to, relation)| EdgeRef {
                source: &self.nodes[from].id,
                target: &self.nodes[to].id,
                relation,
            })
            .collect()
    }

    /// Relation currently labelling `source -> target`.
    pub fn relation(&self, source: &NodeId, target: &NodeId) -> Option<Relation> {
        let from = *self.index.get(source)?;
        let to = *self.index.get(target)?;
        let pos = *self.edge_index.get(&(from, to))?;
        Some(self.adjacency[from][pos].1)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn slot_or_insert(&mut self, id: &NodeId) -> usize {
        match self.index.get(id) {
            Some(&slot) => slot,
            None => self.push_node(id.clone(), None),
        }
    }

    fn push_node(&mut self, id: NodeId, payload: Option<NodePayload>) -> usize {
        let slot = self.nodes.len();
        self.index.insert(id.clone(), slot);
        self.nodes.push(GraphNode { id, payload });
        self.adjacency.push(Vec::new());
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{NamedEntity, NodeKind};

    fn import(name: &str) -> NodePayload {
        NodePayload::Import(NamedEntity { name: name.into() })
    }

    #[test]
    fn test_add_node_first_payload_wins() {
        let mut graph = KnowledgeGraph::new();
        let id = NodeId::import("os");

        assert_eq!(graph.add_node(id.clone(), import("os")), Upsert::Inserted);
        assert_eq!(graph.add_node(id.clone(), import("other")), Upsert::Existing);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node(&id).unwrap().payload, Some(import("os")));
    }

    #[test]
    fn test_edge_creates_implicit_endpoints() {
        let mut graph = KnowledgeGraph::new();
        let file = NodeId::file("a.py");
        let target = NodeId::import("os");

        graph.add_edge(&file, &target, Relation::Imports);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node(&target).unwrap().kind(), None);

        // Filling the placeholder counts as an insert.
        assert_eq!(graph.add_node(target.clone(), import("os")), Upsert::Inserted);
        assert_eq!(graph.node(&target).unwrap().kind(), Some(NodeKind::Import));
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_last_relation_wins() {
        let mut graph = KnowledgeGraph::new();
        let a = NodeId::file("a.py");
        let b = NodeId::class("Foo");

        assert_eq!(graph.add_edge(&a, &b, Relation::Defines), EdgeUpsert::Inserted);
        assert_eq!(graph.add_edge(&a, &b, Relation::Defines), EdgeUpsert::Unchanged);
        assert_eq!(
            graph.add_edge(&a, &b, Relation::Uses),
            EdgeUpsert::Replaced(Relation::Defines)
        );
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.relation(&a, &b), Some(Relation::Uses));
        assert_eq!(graph.relation(&b, &a), None);
    }

    #[test]
    fn test_edge_order_is_stable() {
        let mut graph = KnowledgeGraph::new();
        let a = NodeId::file("a.py");
        let b = NodeId::file("b.py");
        let x = NodeId::import("x");
        let y = NodeId::import("y");

        graph.add_edge(&b, &y, Relation::Imports);
        graph.add_edge(&a, &y, Relation::Imports);
        graph.add_edge(&b, &x, Relation::Imports);
        graph.add_edge(&a, &x, Relation::Imports);
        graph.add_edge(&b, &y, Relation::Uses);

        let order: Vec<(String, String)> = graph
            .edges()
            .map(|e| (e.source.to_string(), e.target.to_string()))
            .collect();
        assert_eq!(
            order,
            [
                ("File: b.py".to_string(), "Import: y".to_string()),
                ("File: b.py".to_string(), "Import: x".to_string()),
                ("File: a.py".to_string(), "Import: y".to_string()),
                ("File: a.py".to_string(), "Import: x".to_string()),
            ]
        );
        assert_eq!(graph.edges_from(&a).len(), 2);
        assert_eq!(graph.edges_from(&NodeId::file("missing.py")).len(), 0);
    }
}
