//! Directory walk and per-file dispatch.
//!
//! [`CodebaseAnalyzer`] walks a project, routes each file to the collectors
//! for its kind and feeds the results to a [`GraphAssembler`]. A file that
//! cannot be read or parsed is logged and counted; the walk carries on.

use chrono::Local;
use ignore::WalkBuilder;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::collectors::{
    build_tool_for, classify_file, config_kind_for, extract_gettext_messages, extract_imports,
    extract_integrations, extract_variables, extract_version_constraints, is_documentation_file,
    is_mo, locale_from_path, parse_config, parse_dependencies, parse_po, parse_sections,
    project_build_tool, project_python_version, DocCoverage, LogExtractor,
    SyntaxTreeLogExtractor,
};
use crate::config::{ScanConfig, DEFAULT_API_DOCS_PATH, DEFAULT_README_PATH};
use crate::error::{CntxtError, Result};
use crate::export::{BuildInfo, DocumentationInfo, GraphDocument, GraphSection, Metadata};
use crate::graph::{GraphAssembler, KnowledgeGraph};
use crate::ontology::{BuildTool, NodeId};
use crate::scanner::{HeuristicScanner, SourceScanner};
use crate::stats::AnalysisStats;

const MAIN_GUARD_PATTERN: &str = r#"if\s+__name__\s*==\s*['"]__main__['"]"#;

/// How a file is processed, decided by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Dependency manifest; `setup.py` is also scanned as Python.
    Build(BuildTool),
    Python,
    Config,
    Localization,
    Documentation,
    Generic,
}

impl FileKind {
    /// Classify a path. The first matching rule wins.
    pub fn of(path: &Path) -> Self {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if let Some(tool) = build_tool_for(file_name) {
            FileKind::Build(tool)
        } else if ext == "py" {
            FileKind::Python
        } else if config_kind_for(path).is_some() {
            FileKind::Config
        } else if ext == "po" || ext == "mo" {
            FileKind::Localization
        } else if is_documentation_file(file_name) {
            FileKind::Documentation
        } else {
            FileKind::Generic
        }
    }
}

/// The result of one analysis run.
#[derive(Debug)]
pub struct Analysis {
    pub graph: KnowledgeGraph,
    pub stats: AnalysisStats,
    pub metadata: Metadata,
}

impl Analysis {
    /// The JSON artifact for this run.
    pub fn document(&self) -> Result<GraphDocument> {
        Ok(GraphDocument {
            graph: GraphSection::from_graph(&self.graph)?,
            metadata: self.metadata.clone(),
        })
    }
}

/// Discovered paths and accumulators that end up in the metadata.
#[derive(Debug, Default)]
struct RunState {
    analyzed: HashSet<PathBuf>,
    main_module: Option<String>,
    readme_path: Option<String>,
    api_docs: Option<String>,
    coverage: DocCoverage,
}

/// Analyzes a Python codebase into a knowledge graph.
pub struct CodebaseAnalyzer {
    root: PathBuf,
    scan: ScanConfig,
    scanner: Box<dyn SourceScanner>,
    log_extractor: Box<dyn LogExtractor>,
    timestamp: Option<String>,
}

impl CodebaseAnalyzer {
    pub fn new(root: impl Into<PathBuf>, scan: &ScanConfig) -> Self {
        Self {
            root: root.into(),
            scan: scan.clone(),
            scanner: Box::new(HeuristicScanner::new()),
            log_extractor: Box::new(SyntaxTreeLogExtractor::new()),
            timestamp: None,
        }
    }

    /// Use another source scanner.
    pub fn with_scanner(mut self, scanner: impl SourceScanner + 'static) -> Self {
        self.scanner = Box::new(scanner);
        self
    }

    /// Use another logging extraction strategy.
    pub fn with_log_extractor(mut self, extractor: impl LogExtractor + 'static) -> Self {
        self.log_extractor = Box::new(extractor);
        self
    }

    /// Fix the reported analysis timestamp.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Analyze the codebase.
    pub fn analyze(&self) -> Result<Analysis> {
        self.analyze_with_progress(|_, _, _| {})
    }

    /// Analyze the codebase, reporting `(index, total, relative_path)` before each file.
    pub fn analyze_with_progress<F>(&self, mut progress: F) -> Result<Analysis>
    where
        F: FnMut(usize, usize, &str),
    {
        if !self.root.is_dir() {
            return Err(CntxtError::DirectoryNotFound(self.root.clone()));
        }
        log::info!("Starting codebase analysis of {}", self.root.display());

        let files = self.collect_files();
        let mut assembler = GraphAssembler::new();
        assembler.stats_mut().total_files = files
            .iter()
            .filter(|p| FileKind::of(p) != FileKind::Generic)
            .count();
        log::info!("Found {} files to process", assembler.stats().total_files);

        let mut state = RunState::default();
        let total = files.len();
        for (index, path) in files.iter().enumerate() {
            let rel = self.relative(path);
            progress(index, total, &rel);
            if let Err(e) = self.process_file(&mut assembler, &mut state, path, &rel) {
                log::error!("Error processing {}: {}", rel, e);
                assembler.record_file_error();
            }
        }

        let (graph, stats) = assembler.into_parts();
        log::info!("Completed analysis of {} files", stats.files_processed);
        if stats.files_with_errors > 0 {
            log::warn!("Encountered errors in {} files", stats.files_with_errors);
        }
        stats.log_summary();

        let metadata = self.metadata(&stats, state);
        Ok(Analysis {
            graph,
            stats,
            metadata,
        })
    }

    // =========================================================================
    // WALK
    // =========================================================================

    /// Files under the root, sorted by name within each directory.
    fn collect_files(&self) -> Vec<PathBuf> {
        let ignored_dirs: HashSet<String> = self.scan.ignored_dirs.iter().cloned().collect();
        let respect = self.scan.respect_gitignore;

        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .parents(respect)
            .ignore(respect)
            .git_ignore(respect)
            .git_global(respect)
            .git_exclude(respect)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir
                    && entry.depth() > 0
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| ignored_dirs.contains(name)))
            })
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let ignored = entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.scan.ignored_files.iter().any(|f| f == name));
            if !ignored {
                files.push(entry.into_path());
            }
        }
        files
    }

    /// `/`-separated path relative to the root.
    fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    fn process_file(
        &self,
        assembler: &mut GraphAssembler,
        state: &mut RunState,
        path: &Path,
        rel: &str,
    ) -> Result<()> {
        match FileKind::of(path) {
            FileKind::Build(tool) => {
                self.process_build_file(assembler, path, rel, tool)?;
                if tool == BuildTool::Setuptools {
                    self.process_python_file(assembler, state, path, rel)?;
                }
                Ok(())
            }
            FileKind::Python => self.process_python_file(assembler, state, path, rel),
            FileKind::Config => {
                let content = read_text(path)?;
                if let Some(record) = parse_config(rel, &content)? {
                    assembler.add_config(rel, &record);
                }
                Ok(())
            }
            FileKind::Localization => self.process_localization_file(assembler, path, rel),
            FileKind::Documentation => {
                let content = read_text(path)?;
                let sections = parse_sections(rel, &content);
                state.coverage.record(&content, &sections);
                assembler.add_documentation(rel, &sections);

                let lowered = rel.rsplit('/').next().unwrap_or(rel).to_lowercase();
                if lowered.starts_with("readme") && state.readme_path.is_none() {
                    state.readme_path = Some(rel.to_string());
                } else if lowered == "api.md" && state.api_docs.is_none() {
                    state.api_docs = Some(rel.to_string());
                }
                Ok(())
            }
            FileKind::Generic => {
                let bytes = fs::read(path).map_err(|e| CntxtError::io(path, e))?;
                assembler.add_generic_file(rel, &classify_file(rel, &bytes));
                Ok(())
            }
        }
    }

    fn process_python_file(
        &self,
        assembler: &mut GraphAssembler,
        state: &mut RunState,
        path: &Path,
        rel: &str,
    ) -> Result<()> {
        if !state.analyzed.insert(path.to_path_buf()) {
            return Ok(());
        }
        let stats = assembler.stats_mut();
        stats.files_processed += 1;
        stats.modules.insert(module_name(rel));
        log::debug!(
            "Processing file [{}/{}]: {}",
            stats.files_processed,
            stats.total_files,
            rel
        );

        let content = read_text(path)?;
        let file = assembler.add_source_file(rel);
        self.process_source(assembler, &file, &content);

        if state.main_module.is_none() && has_main_guard(&content) {
            state.main_module = Some(module_name(rel));
        }
        Ok(())
    }

    /// Run every source collector over one file's text.
    fn process_source(&self, assembler: &mut GraphAssembler, file: &NodeId, content: &str) {
        for import in extract_imports(content) {
            assembler.add_import(file, &import);
        }

        let scan = self.scanner.scan(content);
        for class in &scan.classes {
            assembler.add_class(file, class);
            for decorator in &class.decorators {
                assembler.add_decorator(file, decorator);
            }
            for method in &class.methods {
                assembler.add_method(&class.name, method);
                for decorator in &method.decorators {
                    assembler.add_decorator(file, decorator);
                }
            }
        }
        for function in &scan.functions {
            assembler.add_function(file, function);
            for decorator in &function.decorators {
                assembler.add_decorator(file, decorator);
            }
        }

        for variable in extract_variables(content) {
            assembler.add_variable(file, &variable);
        }
        for comment in &scan.comments {
            assembler.add_comment(file, comment);
        }
        for entry in self.log_extractor.extract(content) {
            assembler.add_log_statement(file, &entry);
        }
        for integration in extract_integrations(content) {
            assembler.add_integration(file, &integration);
        }

        let versions = extract_version_constraints(content);
        if !versions.is_empty() {
            assembler.add_version_info(file, &versions);
        }

        for message in extract_gettext_messages(content) {
            assembler.add_localization_usage(file, &message);
        }
    }

    fn process_build_file(
        &self,
        assembler: &mut GraphAssembler,
        path: &Path,
        rel: &str,
        tool: BuildTool,
    ) -> Result<()> {
        let content = read_text(path)?;
        let build = assembler.add_build_script(rel, tool);
        for dependency in parse_dependencies(rel, &content)? {
            assembler.add_dependency(&build, &dependency);
        }
        Ok(())
    }

    fn process_localization_file(
        &self,
        assembler: &mut GraphAssembler,
        path: &Path,
        rel: &str,
    ) -> Result<()> {
        let locale = locale_from_path(rel);
        let is_po = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("po"));

        let messages = if is_po {
            let content = read_text(path)?;
            parse_po(&content).into_iter().map(|e| e.msgid).collect()
        } else {
            let bytes = fs::read(path).map_err(|e| CntxtError::io(path, e))?;
            if !is_mo(&bytes) {
                log::warn!("{} does not look like a compiled catalog", rel);
            }
            Vec::new()
        };

        assembler.add_localization_file(rel, &locale, messages);
        Ok(())
    }

    // =========================================================================
    // METADATA
    // =========================================================================

    fn metadata(&self, stats: &AnalysisStats, state: RunState) -> Metadata {
        Metadata {
            stats: stats.report(),
            build_info: BuildInfo {
                python_version: project_python_version(&self.root),
                build_tool: project_build_tool(&self.root),
                main_module: state.main_module,
            },
            documentation: DocumentationInfo {
                readme_path: state
                    .readme_path
                    .unwrap_or_else(|| DEFAULT_README_PATH.to_string()),
                api_docs: state
                    .api_docs
                    .unwrap_or_else(|| DEFAULT_API_DOCS_PATH.to_string()),
                coverage_threshold: state.coverage.coverage(),
            },
            analysis_timestamp: self
                .timestamp
                .clone()
                .unwrap_or_else(|| Local::now().to_rfc3339()),
            analyzed_directory: self.root.display().to_string(),
            modules: stats.modules.iter().cloned().collect(),
            dependencies: stats.dependencies.iter().cloned().collect(),
        }
    }
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| CntxtError::io(path, e))?;
    String::from_utf8(bytes)
        .map_err(|e| CntxtError::parse(path.display().to_string(), format!("not valid UTF-8: {}", e)))
}

/// `pkg/sub/mod.py` becomes `pkg.sub.mod`.
fn module_name(rel: &str) -> String {
    rel.strip_suffix(".py").unwrap_or(rel).replace('/', ".")
}

fn has_main_guard(content: &str) -> bool {
    Regex::new(MAIN_GUARD_PATTERN).is_ok_and(|re| re.is_match(content))
}
