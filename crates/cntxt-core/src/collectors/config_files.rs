//! Configuration files: `.env`, `.ini`, `.cfg`, YAML and JSON.

use regex::Regex;
use std::path::Path;

use crate::error::{CntxtError, Result};
use crate::ontology::ConfigKind;

const ENV_LINE_PATTERN: &str = r"^([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*)$";
const INI_SECTION_PATTERN: &str = r"^\[([^\]]+)\]$";
const INI_VALUE_PATTERN: &str = r"^([^=\s]+)\s*=\s*(.*)$";

/// What a configuration file declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRecord {
    pub config_type: ConfigKind,
    /// Top-level keys, or section names for INI-style files, in file order
    pub keys: Vec<String>,
}

/// Config format for a path, judged by file name and extension.
pub fn config_kind_for(path: &Path) -> Option<ConfigKind> {
    let file_name = path.file_name()?.to_str()?;
    if file_name == ".env" || file_name.starts_with(".env.") {
        return Some(ConfigKind::Env);
    }
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "env" => Some(ConfigKind::Env),
        "ini" => Some(ConfigKind::Ini),
        "cfg" => Some(ConfigKind::Cfg),
        "yaml" | "yml" => Some(ConfigKind::Yaml),
        "json" => Some(ConfigKind::Json),
        _ => None,
    }
}

/// Parse a config file. `Ok(None)` when the path is not a config format.
pub fn parse_config(rel_path: &str, content: &str) -> Result<Option<ConfigRecord>> {
    let Some(config_type) = config_kind_for(Path::new(rel_path)) else {
        return Ok(None);
    };

    let keys = match config_type {
        ConfigKind::Env => env_keys(content),
        ConfigKind::Ini | ConfigKind::Cfg => ini_keys(content),
        ConfigKind::Yaml => {
            let value: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| CntxtError::parse(rel_path, e))?;
            match value {
                serde_yaml::Value::Mapping(map) => map
                    .keys()
                    .map(|k| match k {
                        serde_yaml::Value::String(s) => s.clone(),
                        other => serde_yaml::to_string(other)
                            .map(|s| s.trim().to_string())
                            .unwrap_or_default(),
                    })
                    .collect(),
                _ => Vec::new(),
            }
        }
        ConfigKind::Json => {
            let value: serde_json::Value =
                serde_json::from_str(content).map_err(|e| CntxtError::parse(rel_path, e))?;
            match value {
                serde_json::Value::Object(map) => map.keys().cloned().collect(),
                _ => Vec::new(),
            }
        }
    };

    Ok(Some(ConfigRecord { config_type, keys }))
}

fn env_keys(content: &str) -> Vec<String> {
    let Ok(re) = Regex::new(ENV_LINE_PATTERN) else {
        return Vec::new();
    };
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| re.captures(line).map(|cap| cap[1].to_string()))
        .collect()
}

/// Section names, plus any keys that appear before the first section.
fn ini_keys(content: &str) -> Vec<String> {
    let (Ok(section), Ok(value)) = (
        Regex::new(INI_SECTION_PATTERN),
        Regex::new(INI_VALUE_PATTERN),
    ) else {
        return Vec::new();
    };

    let mut keys = Vec::new();
    let mut in_section = false;
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(cap) = section.captures(line) {
            keys.push(cap[1].trim().to_string());
            in_section = true;
        } else if !in_section {
            if let Some(cap) = value.captures(line) {
                keys.push(cap[1].to_string());
            }
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_kind_for() {
        assert_eq!(config_kind_for(Path::new(".env")), Some(ConfigKind::Env));
        assert_eq!(config_kind_for(Path::new("conf/app.YML")), Some(ConfigKind::Yaml));
        assert_eq!(config_kind_for(Path::new("setup.cfg")), Some(ConfigKind::Cfg));
        assert_eq!(config_kind_for(Path::new("main.py")), None);
    }

    #[test]
    fn test_env_and_ini_keys() {
        let env = "# secrets\nDATABASE_URL=postgres://x\nDEBUG = true\nnot a line\n";
        let record = parse_config("deploy/.env", env).unwrap().unwrap();
        assert_eq!(record.config_type, ConfigKind::Env);
        assert_eq!(record.keys, ["DATABASE_URL", "DEBUG"]);

        let ini = "root = 1\n[server]\nport = 8080\n\n; note\n[client]\nretries=3\n";
        let record = parse_config("app.ini", ini).unwrap().unwrap();
        assert_eq!(record.keys, ["root", "server", "client"]);
    }

    #[test]
    fn test_structured_keys_keep_file_order() {
        let yaml = "zeta: 1\nalpha:\n  nested: true\n";
        let record = parse_config("settings.yaml", yaml).unwrap().unwrap();
        assert_eq!(record.keys, ["zeta", "alpha"]);

        let json = r#"{"zeta": 1, "alpha": {"nested": true}}"#;
        let record = parse_config("settings.json", json).unwrap().unwrap();
        assert_eq!(record.config_type, ConfigKind::Json);
        assert_eq!(record.keys, ["zeta", "alpha"]);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = parse_config("broken.json", "{nope").unwrap_err();
        assert!(matches!(err, CntxtError::Parse { .. }));
        assert_eq!(parse_config("notes.txt", "x").unwrap(), None);
    }
}
