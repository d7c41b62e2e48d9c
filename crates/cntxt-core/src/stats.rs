//! Analysis statistics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Counters and name sets accumulated while a codebase is analyzed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    pub total_files: usize,
    pub files_processed: usize,
    pub files_with_errors: usize,
    pub total_classes: usize,
    /// Methods and top-level functions together
    pub total_functions: usize,
    pub total_variables: usize,
    pub total_imports: usize,
    pub total_logging_statements: usize,
    pub total_comments: usize,
    pub total_configs: usize,
    pub total_integrations: usize,
    pub total_localizations: usize,
    pub total_build_scripts: usize,
    pub total_version_constraints: usize,

    /// Dotted module names of Python files
    pub modules: BTreeSet<String>,
    /// `name==version` of every declared dependency
    pub dependencies: BTreeSet<String>,
    /// Decorator text seen anywhere
    pub annotations: BTreeSet<String>,
}

impl AnalysisStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten into the serialized report.
    pub fn report(&self) -> StatsReport {
        StatsReport {
            total_files: self.total_files,
            files_processed: self.files_processed,
            files_with_errors: self.files_with_errors,
            total_classes: self.total_classes,
            total_functions: self.total_functions,
            total_variables: self.total_variables,
            total_modules: self.modules.len(),
            total_imports: self.total_imports,
            total_dependencies: self.dependencies.len(),
            total_annotations: self.annotations.len(),
            total_logging_statements: self.total_logging_statements,
            total_comments: self.total_comments,
            total_configs: self.total_configs,
            total_integrations: self.total_integrations,
            total_localizations: self.total_localizations,
            total_build_scripts: self.total_build_scripts,
            total_version_constraints: self.total_version_constraints,
        }
    }

    /// Log each statistic at info level.
    pub fn log_summary(&self) {
        log::info!("Analysis statistics:");
        for (name, value) in self.report().entries() {
            log::info!("  {}: {}", name, value);
        }
    }
}

/// Flat statistics as written to the graph metadata. Field order is the output order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsReport {
    pub total_files: usize,
    pub files_processed: usize,
    pub files_with_errors: usize,
    pub total_classes: usize,
    pub total_functions: usize,
    pub total_variables: usize,
    pub total_modules: usize,
    pub total_imports: usize,
    pub total_dependencies: usize,
    pub total_annotations: usize,
    pub total_logging_statements: usize,
    pub total_comments: usize,
    pub total_configs: usize,
    pub total_integrations: usize,
    pub total_localizations: usize,
    pub total_build_scripts: usize,
    pub total_version_constraints: usize,
}

impl StatsReport {
    /// `(name, value)` pairs in output order.
    pub fn entries(&self) -> [(&'static str, usize); 17] {
        [
            ("total_files", self.total_files),
            ("files_processed", self.files_processed),
            ("files_with_errors", self.files_with_errors),
            ("total_classes", self.total_classes),
            ("total_functions", self.total_functions),
            ("total_variables", self.total_variables),
            ("total_modules", self.total_modules),
            ("total_imports", self.total_imports),
            ("total_dependencies", self.total_dependencies),
            ("total_annotations", self.total_annotations),
            ("total_logging_statements", self.total_logging_statements),
            ("total_comments", self.total_comments),
            ("total_configs", self.total_configs),
            ("total_integrations", self.total_integrations),
            ("total_localizations", self.total_localizations),
            ("total_build_scripts", self.total_build_scripts),
            ("total_version_constraints", self.total_version_constraints),
        ]
    }
}

impl std::fmt::Display for StatsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, value) in self.entries() {
            writeln!(f, "{:<26} {}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_in_order() {
        let mut stats = AnalysisStats::new();
        stats.total_files = 3;
        stats.modules.insert("pkg.mod".into());
        stats.dependencies.insert("requests==2.31".into());
        stats.dependencies.insert("requests==2.31".into());

        let report = stats.report();
        assert_eq!(report.total_modules, 1);
        assert_eq!(report.total_dependencies, 1);

        let json = serde_json::to_value(report).unwrap();
        let keys: Vec<&str> = json
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        let expected: Vec<&str> = report.entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, expected);
        assert_eq!(keys.len(), 17);
    }
}
