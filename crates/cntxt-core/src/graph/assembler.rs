//! Turns extracted facts into graph nodes and edges.
//!
//! The assembler is the only writer to its [`KnowledgeGraph`]. Every
//! operation inserts at most one node of its kind (bumping that kind's
//! counter only when the node is new) and links it from its owner.

use crate::collectors::{
    ConfigRecord, Dependency, FileInfo, Integration, LogEntry, Section, VariableInfo,
    VersionInfo, UNKNOWN_LOCALE,
};
use crate::ontology::{
    dependency_key, BuildScriptEntity, BuildTool, CallableEntity, ClassEntity, CommentEntity,
    ConfigEntity, DependencyEntity, DocumentationEntity, FileEntity, IntegrationEntity,
    LocalizationEntity, LogStatementEntity, NamedEntity, NodeId, NodePayload, Relation,
    VariableEntity, VersionEntity,
};
use crate::scanner::{ClassInfo, CommentInfo, FunctionInfo};
use crate::stats::AnalysisStats;

use super::{EdgeUpsert, KnowledgeGraph, Upsert};

/// `fileType` of Python sources.
pub const SOURCE_CODE_FILE_TYPE: &str = "SOURCE_CODE";

/// Name of the single project node.
pub const PROJECT_NAME: &str = "Main Project";

/// Builds a knowledge graph and its statistics from extracted facts.
#[derive(Debug, Default)]
pub struct GraphAssembler {
    graph: KnowledgeGraph,
    stats: AnalysisStats,
}

impl GraphAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }

    pub fn stats(&self) -> &AnalysisStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut AnalysisStats {
        &mut self.stats
    }

    pub fn into_parts(self) -> (KnowledgeGraph, AnalysisStats) {
        (self.graph, self.stats)
    }

    /// Count a file that could not be read or parsed.
    pub fn record_file_error(&mut self) {
        self.stats.files_with_errors += 1;
    }

    // =========================================================================
    // PYTHON SOURCES
    // =========================================================================

    /// Record a Python source file and return its node id.
    pub fn add_source_file(&mut self, rel_path: &str) -> NodeId {
        let id = NodeId::file(rel_path);
        self.insert(
            &id,
            NodePayload::File(FileEntity {
                path: rel_path.to_string(),
                encoding: "UTF-8".to_string(),
                file_type: SOURCE_CODE_FILE_TYPE.to_string(),
                category: None,
                purpose: None,
            }),
        );
        id
    }

    pub fn add_import(&mut self, file: &NodeId, name: &str) {
        let id = NodeId::import(name);
        let payload = NodePayload::Import(NamedEntity {
            name: name.to_string(),
        });
        if self.insert(&id, payload) {
            self.stats.total_imports += 1;
        }
        self.link(file, &id, Relation::Imports);
    }

    /// Record a class and its `DEFINES` edge. Methods and decorators are
    /// recorded separately.
    pub fn add_class(&mut self, file: &NodeId, class: &ClassInfo) -> NodeId {
        let id = NodeId::class(&class.name);
        let payload = NodePayload::Class(ClassEntity {
            name: class.name.clone(),
            bases: class.bases.clone(),
            docstring: class.docstring.clone(),
        });
        if self.insert(&id, payload) {
            self.stats.total_classes += 1;
        }
        self.link(file, &id, Relation::Defines);
        id
    }

    /// Record a method. The `HAS_METHOD` edge needs the class node to exist.
    pub fn add_method(&mut self, class_name: &str, method: &FunctionInfo) {
        let id = NodeId::method(&method.name);
        if self.insert(&id, NodePayload::Method(callable(method))) {
            self.stats.total_functions += 1;
        }

        let class = NodeId::class(class_name);
        if self.graph.contains(&class) {
            self.link(&class, &id, Relation::HasMethod);
        } else {
            log::warn!(
                "{} does not exist; cannot attach method {}",
                class,
                method.name
            );
        }
    }

    pub fn add_function(&mut self, file: &NodeId, function: &FunctionInfo) {
        let id = NodeId::function(&function.name);
        if self.insert(&id, NodePayload::Function(callable(function))) {
            self.stats.total_functions += 1;
        }
        self.link(file, &id, Relation::Defines);
    }

    pub fn add_variable(&mut self, file: &NodeId, variable: &VariableInfo) {
        let id = NodeId::variable(&variable.name);
        let payload = NodePayload::Variable(VariableEntity {
            name: variable.name.clone(),
            value: variable.value.clone(),
            type_hint: variable.type_hint.clone(),
            is_constant: variable.is_constant,
        });
        if self.insert(&id, payload) {
            self.stats.total_variables += 1;
        }
        self.link(file, &id, Relation::HasVariable);
    }

    /// Decorators hang off the file they appear in, not the decorated item.
    pub fn add_decorator(&mut self, file: &NodeId, text: &str) {
        let id = NodeId::decorator(text);
        let payload = NodePayload::Decorator(NamedEntity {
            name: text.to_string(),
        });
        if self.insert(&id, payload) {
            self.stats.annotations.insert(text.to_string());
        }
        self.link(file, &id, Relation::DecoratedWith);
    }

    pub fn add_comment(&mut self, file: &NodeId, comment: &CommentInfo) {
        let id = NodeId::comment(comment.line_number, &comment.content);
        let payload = NodePayload::Comment(CommentEntity {
            comment_type: comment.kind,
            content: comment.content.clone(),
            line_number: comment.line_number,
            associated_element: comment.associated_element.clone(),
            tags: comment.tags.clone(),
        });
        if self.insert(&id, payload) {
            self.stats.total_comments += 1;
        }
        self.link(file, &id, Relation::HasComment);
    }

    pub fn add_log_statement(&mut self, file: &NodeId, entry: &LogEntry) {
        let id = NodeId::log_statement(&entry.message);
        let payload = NodePayload::LogStatement(LogStatementEntity {
            level: entry.level,
            message: entry.message.clone(),
        });
        if self.insert(&id, payload) {
            self.stats.total_logging_statements += 1;
        }
        self.link(file, &id, Relation::Uses);
    }

    pub fn add_integration(&mut self, file: &NodeId, integration: &Integration) {
        let id = NodeId::integration(&integration.name);
        let payload = NodePayload::Integration(IntegrationEntity {
            name: integration.name.clone(),
            url: integration.url.clone(),
            kind: integration.kind,
        });
        if self.insert(&id, payload) {
            self.stats.total_integrations += 1;
        }
        self.link(file, &id, Relation::IntegratesWith);
    }

    /// One node per version kind, shared across files; the first file to
    /// state a kind fixes its constraints.
    pub fn add_version_info(&mut self, file: &NodeId, versions: &[VersionInfo]) {
        for info in versions {
            let id = NodeId::version(info.kind.as_str());
            let payload = NodePayload::Version(VersionEntity {
                version_type: info.kind,
                constraints: info.constraints.clone(),
            });
            if self.insert(&id, payload) {
                self.stats.total_version_constraints += 1;
            }
            self.link(file, &id, Relation::HasVersion);
        }
    }

    /// A message passed to `_()` in source code.
    pub fn add_localization_usage(&mut self, file: &NodeId, message: &str) {
        let id = NodeId::localization_message(message);
        let payload = NodePayload::Localization(LocalizationEntity {
            path: None,
            locale: UNKNOWN_LOCALE.to_string(),
            messages: vec![message.to_string()],
        });
        if self.insert(&id, payload) {
            self.stats.total_localizations += 1;
        }
        self.link(file, &id, Relation::Uses);
    }

    // =========================================================================
    // PROJECT FILES
    // =========================================================================

    /// A `.po`/`.mo` catalog, linked from its (possibly implicit) file node.
    pub fn add_localization_file(&mut self, rel_path: &str, locale: &str, messages: Vec<String>) {
        let id = NodeId::localization_file(rel_path);
        let payload = NodePayload::Localization(LocalizationEntity {
            path: Some(rel_path.to_string()),
            locale: locale.to_string(),
            messages,
        });
        if self.insert(&id, payload) {
            self.stats.total_localizations += 1;
        }
        self.link(&NodeId::file(rel_path), &id, Relation::Contains);
    }

    pub fn add_build_script(&mut self, rel_path: &str, build_tool: BuildTool) -> NodeId {
        let id = NodeId::build_script(rel_path);
        let payload = NodePayload::BuildScript(BuildScriptEntity {
            path: rel_path.to_string(),
            build_tool,
        });
        if self.insert(&id, payload) {
            self.stats.total_build_scripts += 1;
        }
        id
    }

    pub fn add_dependency(&mut self, build: &NodeId, dependency: &Dependency) {
        let id = NodeId::dependency(&dependency.name, &dependency.version);
        let payload = NodePayload::Dependency(DependencyEntity {
            name: dependency.name.clone(),
            version: dependency.version.clone(),
            extras: dependency.extras.clone(),
        });
        if self.insert(&id, payload) {
            self.stats
                .dependencies
                .insert(dependency_key(&dependency.name, &dependency.version));
        }
        self.link(build, &id, Relation::DependsOn);
    }

    /// A config file, linked from its (possibly implicit) file node.
    pub fn add_config(&mut self, rel_path: &str, record: &ConfigRecord) {
        let id = NodeId::config(rel_path);
        let payload = NodePayload::Config(ConfigEntity {
            path: rel_path.to_string(),
            config_type: record.config_type,
            keys: record.keys.clone(),
        });
        if self.insert(&id, payload) {
            self.stats.total_configs += 1;
        }
        self.link(&NodeId::file(rel_path), &id, Relation::ConfiguredBy);
    }

    /// A documentation file, hung off the project node.
    pub fn add_documentation(&mut self, rel_path: &str, sections: &[Section]) {
        let id = NodeId::documentation(rel_path);
        self.insert(
            &id,
            NodePayload::Documentation(DocumentationEntity {
                path: rel_path.to_string(),
                sections: sections.iter().map(|s| s.title.clone()).collect(),
            }),
        );

        let project = NodeId::project();
        self.insert(
            &project,
            NodePayload::Project(NamedEntity {
                name: PROJECT_NAME.to_string(),
            }),
        );
        self.link(&project, &id, Relation::HasDocumentation);
    }

    /// Any other file. Never replaces an existing file node.
    pub fn add_generic_file(&mut self, rel_path: &str, info: &FileInfo) {
        let id = NodeId::file(rel_path);
        self.insert(
            &id,
            NodePayload::File(FileEntity {
                path: rel_path.to_string(),
                encoding: info.encoding.clone(),
                file_type: info.extension.clone(),
                category: Some(info.category),
                purpose: Some(info.purpose),
            }),
        );
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    /// Insert a node; `true` when it is new.
    fn insert(&mut self, id: &NodeId, payload: NodePayload) -> bool {
        let kind = payload.kind();
        match self.graph.add_node(id.clone(), payload) {
            Upsert::Inserted => {
                log::debug!("{} node added: {}", kind, id);
                true
            }
            Upsert::Existing => {
                log::debug!("{} node already exists: {}", kind, id);
                false
            }
        }
    }

    fn link(&mut self, source: &NodeId, target: &NodeId, relation: Relation) {
        match self.graph.add_edge(source, target, relation) {
            EdgeUpsert::Inserted => {
                log::debug!("Edge added: {} -> {} ({})", source, target, relation)
            }
            EdgeUpsert::Unchanged => {}
            EdgeUpsert::Replaced(previous) => log::debug!(
                "Edge relabelled: {} -> {} ({} -> {})",
                source,
                target,
                previous,
                relation
            ),
        }
    }
}

fn callable(function: &FunctionInfo) -> CallableEntity {
    CallableEntity {
        name: function.name.clone(),
        return_type: function.return_type.clone(),
        parameters: function.parameters.iter().map(Into::into).collect(),
        decorators: function.decorators.clone(),
        is_async: function.is_async,
        is_generator: function.is_generator,
        docstring: function.docstring.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{CommentKind, NodeKind};
    use crate::scanner::{HeuristicScanner, SourceScanner};

    fn method(name: &str) -> FunctionInfo {
        FunctionInfo {
            name: name.to_string(),
            parameters: Vec::new(),
            return_type: None,
            decorators: Vec::new(),
            is_async: false,
            is_generator: false,
            docstring: None,
            line: 1,
        }
    }

    #[test]
    fn test_method_needs_class() {
        let mut assembler = GraphAssembler::new();
        assembler.add_method("Ghost", &method("run"));

        let graph = assembler.graph();
        assert!(graph.contains(&NodeId::method("run")));
        assert!(!graph.contains(&NodeId::class("Ghost")));
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(assembler.stats().total_functions, 1);
    }

    #[test]
    fn test_counters_only_count_new_nodes() {
        let mut assembler = GraphAssembler::new();
        let a = assembler.add_source_file("a.py");
        let b = assembler.add_source_file("b.py");

        assembler.add_import(&a, "os");
        assembler.add_import(&b, "os");
        assembler.add_decorator(&a, "staticmethod");
        assembler.add_decorator(&b, "staticmethod");

        assert_eq!(assembler.stats().total_imports, 1);
        assert_eq!(assembler.stats().annotations.len(), 1);
        assert_eq!(assembler.graph().edge_count(), 4);
    }

    #[test]
    fn test_scanned_file_assembles() {
        let code = r#"class Greeter:
    """Greets."""

    @staticmethod
    def hello(name: str = "x") -> str:
        return name
"#;
        let scan = HeuristicScanner::new().scan(code);
        let mut assembler = GraphAssembler::new();
        let file = assembler.add_source_file("greet.py");
        for class in &scan.classes {
            assembler.add_class(&file, class);
            for m in &class.methods {
                assembler.add_method(&class.name, m);
                for d in &m.decorators {
                    assembler.add_decorator(&file, d);
                }
            }
        }
        for comment in &scan.comments {
            assembler.add_comment(&file, comment);
        }

        let graph = assembler.graph();
        let class = NodeId::class("Greeter");
        assert_eq!(graph.relation(&file, &class), Some(Relation::Defines));
        assert_eq!(
            graph.relation(&class, &NodeId::method("hello")),
            Some(Relation::HasMethod)
        );
        assert_eq!(
            graph.relation(&file, &NodeId::decorator("staticmethod")),
            Some(Relation::DecoratedWith)
        );

        let docstring = graph
            .nodes()
            .find_map(|n| match &n.payload {
                Some(NodePayload::Comment(c)) if c.comment_type == CommentKind::Docstring => {
                    Some(c)
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(docstring.associated_element.as_deref(), Some("Greeter"));
    }

    #[test]
    fn test_documentation_shares_project_node() {
        let mut assembler = GraphAssembler::new();
        let sections = vec![Section {
            title: "Intro".into(),
            content: String::new(),
        }];
        assembler.add_documentation("README.md", &sections);
        assembler.add_documentation("docs/api.md", &sections);

        let graph = assembler.graph();
        let project = NodeId::project();
        assert_eq!(graph.node(&project).unwrap().kind(), Some(NodeKind::Project));
        assert_eq!(graph.edges_from(&project).len(), 2);
    }

    #[test]
    fn test_config_links_from_implicit_file() {
        let mut assembler = GraphAssembler::new();
        let record = ConfigRecord {
            config_type: crate::ontology::ConfigKind::Yaml,
            keys: vec!["a".into()],
        };
        assembler.add_config("conf.yaml", &record);

        let graph = assembler.graph();
        let file = NodeId::file("conf.yaml");
        assert_eq!(graph.node(&file).unwrap().payload, None);
        assert_eq!(
            graph.relation(&file, &NodeId::config("conf.yaml")),
            Some(Relation::ConfiguredBy)
        );
        assert_eq!(assembler.stats().total_configs, 1);
    }
}
