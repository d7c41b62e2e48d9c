//! External integration detection: URLs, SDKs, service connections, secrets.
//!
//! API keys and credentials are detected but their values never leave this
//! module; an integration records only which field held a secret.

use regex::Regex;
use std::collections::HashSet;

use crate::ontology::IntegrationKind;

const URL_PATTERN: &str = r#"(?i)\b(?:https?://|ftp://|file://|mailto:|tel:|data:)[^\s'"]+"#;
const API_KEY_PATTERN: &str =
    r#"(?i)\b(api_key|apikey)\s*[:=]\s*['"]([A-Za-z0-9_\-]{20,})['"]"#;
const IMPORT_PATTERN: &str =
    r"(?m)^\s*import\s+([a-zA-Z0-9_.]+)|^\s*from\s+([a-zA-Z0-9_.]+)\s+import\s+";
const SDK_INIT_PATTERN: &str =
    r#"(?:initialize|init|setup)\s*\(\s*['"]([a-zA-Z0-9_.]+)['"]\s*,"#;
const SERVICE_CONNECTION_PATTERN: &str =
    r#"(?:connect|setup_connection|configure)\s*\(\s*['"]([a-zA-Z0-9_.]+)['"]\s*,\s*['"]([a-zA-Z0-9_.:/\-]+)['"]"#;
const CREDENTIAL_PATTERN: &str =
    r#"(?i)\b(username|user|password|pwd|secret|token)\s*[:=]\s*['"][^'"]+['"]"#;

/// Top-level packages that indicate an external service or heavy framework.
pub const EXTERNAL_LIBRARIES: &[&str] = &[
    "requests", "boto3", "django", "flask", "sqlalchemy", "celery", "stripe", "twilio",
    "firebase", "pandas", "numpy", "torch", "tensorflow", "google", "aws", "azure", "slack_sdk",
    "discord", "facebook", "twitter",
];

/// One detected integration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Integration {
    pub kind: IntegrationKind,
    pub name: String,
    /// Endpoint when known, empty otherwise
    pub url: String,
}

impl Integration {
    fn new(kind: IntegrationKind, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Detect integrations in Python source, deduplicated in first-seen order.
pub fn extract_integrations(content: &str) -> Vec<Integration> {
    let mut found = Vec::new();

    if let Ok(re) = Regex::new(URL_PATTERN) {
        for m in re.find_iter(content) {
            found.push(Integration::new(IntegrationKind::Url, m.as_str(), m.as_str()));
        }
    }

    if let Ok(re) = Regex::new(API_KEY_PATTERN) {
        for cap in re.captures_iter(content) {
            found.push(Integration::new(
                IntegrationKind::ApiKey,
                format!("api_key:{}", cap[1].to_lowercase()),
                "",
            ));
        }
    }

    if let Ok(re) = Regex::new(IMPORT_PATTERN) {
        for cap in re.captures_iter(content) {
            let Some(module) = cap.get(1).or_else(|| cap.get(2)) else {
                continue;
            };
            let module = module.as_str();
            let root = module.split('.').next().unwrap_or(module);
            if EXTERNAL_LIBRARIES.contains(&root) {
                found.push(Integration::new(IntegrationKind::ExternalLibrary, module, ""));
            }
        }
    }

    if let Ok(re) = Regex::new(SDK_INIT_PATTERN) {
        for cap in re.captures_iter(content) {
            found.push(Integration::new(IntegrationKind::SdkInitialization, &cap[1], ""));
        }
    }

    if let Ok(re) = Regex::new(SERVICE_CONNECTION_PATTERN) {
        for cap in re.captures_iter(content) {
            found.push(Integration::new(
                IntegrationKind::ServiceConnection,
                &cap[1],
                &cap[2],
            ));
        }
    }

    if let Ok(re) = Regex::new(CREDENTIAL_PATTERN) {
        for cap in re.captures_iter(content) {
            found.push(Integration::new(
                IntegrationKind::Credential,
                format!("credential:{}", cap[1].to_lowercase()),
                "",
            ));
        }
    }

    let mut seen = HashSet::new();
    found.retain(|i| seen.insert(i.clone()));
    found
}
