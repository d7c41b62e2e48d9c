//! Import statement extraction.

use regex::Regex;
use std::collections::BTreeSet;

const IMPORT_PATTERN: &str = r"^(?:from\s+(\S+)\s+)?import\s+(.+)$";

/// Collect imported names from Python source.
///
/// `from a import b, c` yields `a`, `b` and `c`. Aliases are kept as written
/// (`numpy as np`). The result is sorted and deduplicated.
pub fn extract_imports(content: &str) -> BTreeSet<String> {
    let mut imports = BTreeSet::new();
    let Ok(re) = Regex::new(IMPORT_PATTERN) else {
        return imports;
    };

    for line in content.lines() {
        let Some(cap) = re.captures(line.trim()) else {
            continue;
        };
        if let Some(module) = cap.get(1) {
            imports.insert(module.as_str().to_string());
        }
        for name in cap[2].split(',') {
            let name = name.trim();
            if !name.is_empty() {
                imports.insert(name.to_string());
            }
        }
    }

    imports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_imports() {
        let code = r#"
import os, sys
from collections import OrderedDict, defaultdict
    import numpy as np
x = "import inside string"
"#;
        let imports: Vec<String> = extract_imports(code).into_iter().collect();
        assert_eq!(
            imports,
            ["OrderedDict", "collections", "defaultdict", "numpy as np", "os", "sys"]
        );
    }
}
