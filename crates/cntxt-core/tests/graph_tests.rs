use cntxt_core::export::GraphSection;
use cntxt_core::graph::EdgeUpsert;
use cntxt_core::ontology::{NodeId, Relation};
use cntxt_core::scanner::ClassInfo;
use cntxt_core::GraphAssembler;

fn class(name: &str) -> ClassInfo {
    ClassInfo {
        name: name.to_string(),
        bases: Vec::new(),
        decorators: Vec::new(),
        methods: Vec::new(),
        docstring: None,
        line: 1,
    }
}

#[test]
fn test_repeated_facts_are_idempotent() {
    let mut assembler = GraphAssembler::new();
    let file = assembler.add_source_file("pkg/mod.py");
    assembler.add_import(&file, "os");
    assembler.add_import(&file, "os");
    assembler.add_class(&file, &class("Foo"));
    assembler.add_class(&file, &class("Foo"));
    assembler.add_decorator(&file, "@dataclass");
    assembler.add_decorator(&file, "@dataclass");

    let graph = assembler.graph();
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(assembler.stats().total_imports, 1);
    assert_eq!(assembler.stats().total_classes, 1);
    assert_eq!(assembler.stats().report().total_annotations, 1);
}

#[test]
fn test_last_relation_wins_in_export() {
    let mut assembler = GraphAssembler::new();
    let file = assembler.add_source_file("a.py");
    assembler.add_localization_usage(&file, "Hello");

    let mut graph = assembler.into_parts().0;
    let message = NodeId::localization_message("Hello");
    assert_eq!(
        graph.add_edge(&file, &message, Relation::Contains),
        EdgeUpsert::Replaced(Relation::Uses)
    );

    let section = GraphSection::from_graph(&graph).unwrap();
    assert_eq!(section.links.len(), 1);
    assert_eq!(section.links[0].relation, "CONTAINS");
}

#[test]
fn test_implicit_file_node_serializes_bare() {
    let mut assembler = GraphAssembler::new();
    let record = cntxt_core::collectors::parse_config("settings.ini", "[server]\nport = 80\n")
        .unwrap()
        .unwrap();
    assembler.add_config("settings.ini", &record);

    let section = GraphSection::from_graph(assembler.graph()).unwrap();
    let file = section
        .nodes
        .iter()
        .find(|n| n["id"] == "File: settings.ini")
        .unwrap();
    assert_eq!(file.len(), 1);

    let config = section
        .nodes
        .iter()
        .find(|n| n["id"] == "Config: settings.ini")
        .unwrap();
    assert_eq!(config["type"], "config");
    assert_eq!(config["keys"], serde_json::json!(["server"]));
}
