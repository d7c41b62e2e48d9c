//! Heuristic Python codebase scanner.
//!
//! Walks a project, extracts structural and operational facts from its files,
//! assembles them into a deduplicated knowledge graph, writes the graph as
//! node-link JSON and compresses it into a codebook-abbreviated text form.
//!
//! ## Modules
//!
//! - `analyzer` - directory walk and per-file dispatch
//! - `collectors` - per-file-kind fact extractors
//! - `compress` - codebook compression of the graph JSON
//! - `config` - layered configuration
//! - `export` - JSON document and file helpers
//! - `graph` - graph store and assembler
//! - `ontology` - node kinds, relations, identifiers and payloads
//! - `scanner` - line-oriented Python source scanners
//! - `stats` - per-run counters

pub mod analyzer;
pub mod collectors;
pub mod compress;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod ontology;
pub mod scanner;
pub mod stats;

pub use analyzer::{Analysis, CodebaseAnalyzer, FileKind};
pub use compress::{compress, compress_file, decompress, Codebook, CompressedGraph, DecodedGraph};
pub use config::Config;
pub use error::{CntxtError, Result};
pub use export::{read_graph_json, wait_for_file, write_graph_json, GraphDocument};
pub use graph::{GraphAssembler, KnowledgeGraph};
pub use stats::{AnalysisStats, StatsReport};
