//! Configuration management for cntxt.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `cntxt.toml` file
//! 3. User config `~/.config/cntxt/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory walk configuration.
    pub scan: ScanConfig,

    /// Artifact locations.
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./cntxt.toml` (project local)
    /// 2. `~/.config/cntxt/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new("cntxt.toml").exists() {
            return Self::from_file("cntxt.toml");
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("cntxt").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("CNTXT_OUTPUT_DIR") {
            self.output.dir = dir;
        }
        if let Ok(flag) = std::env::var("CNTXT_RESPECT_GITIGNORE") {
            if let Ok(b) = flag.parse() {
                self.scan.respect_gitignore = b;
            }
        }
        if let Ok(secs) = std::env::var("CNTXT_WAIT_SECS") {
            if let Ok(n) = secs.parse() {
                self.output.wait_secs = n;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.output.graph_file.trim().is_empty() {
            return Err(ConfigError::Invalid("output.graph_file must not be empty".into()));
        }
        if self.output.compressed_file.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "output.compressed_file must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Directory walk configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory names pruned from the walk.
    pub ignored_dirs: Vec<String>,

    /// File names skipped wherever they appear.
    pub ignored_files: Vec<String>,

    /// Honor `.gitignore` files while walking.
    pub respect_gitignore: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|s| s.to_string()).collect(),
            ignored_files: DEFAULT_IGNORED_FILES.iter().map(|s| s.to_string()).collect(),
            respect_gitignore: DEFAULT_RESPECT_GITIGNORE,
        }
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the artifacts are written to.
    pub dir: String,

    /// File name of the graph JSON.
    pub graph_file: String,

    /// File name of the compressed text.
    pub compressed_file: String,

    /// File name of the Graphviz export.
    pub dot_file: String,

    /// Seconds to wait for the graph JSON before compressing.
    pub wait_secs: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: DEFAULT_OUTPUT_DIR.to_string(),
            graph_file: DEFAULT_GRAPH_FILE.to_string(),
            compressed_file: DEFAULT_COMPRESSED_FILE.to_string(),
            dot_file: DEFAULT_DOT_FILE.to_string(),
            wait_secs: DEFAULT_WAIT_SECS,
        }
    }
}

impl OutputConfig {
    /// Full path of the graph JSON.
    pub fn graph_path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.graph_file)
    }

    /// Full path of the compressed text.
    pub fn compressed_path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.compressed_file)
    }

    /// Full path of the Graphviz export.
    pub fn dot_path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.dot_file)
    }
}
