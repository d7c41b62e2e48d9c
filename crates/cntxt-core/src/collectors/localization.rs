//! Localization: gettext usages in code and `.po`/`.mo` catalogs on disk.

use regex::Regex;

const GETTEXT_PATTERN: &str = r#"_\(\s*['"](.+?)['"]\s*\)"#;
const LOCALE_PATTERN: &str = r"[a-z]{2}_[A-Z]{2}";
const PO_ENTRY_PATTERN: &str = r#"(?m)^msgid\s+['"](.+?)['"]\s*\nmsgstr\s+['"](.+?)['"]"#;

/// Locale reported when the path names none.
pub const UNKNOWN_LOCALE: &str = "unknown_locale";

/// GNU `.mo` magic number.
const MO_MAGIC: u32 = 0x9504_12de;

/// One translated entry of a `.po` catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoEntry {
    pub msgid: String,
    pub msgstr: String,
}

/// Messages passed to `_()`, in source order, duplicates removed.
pub fn extract_gettext_messages(content: &str) -> Vec<String> {
    let mut messages: Vec<String> = Vec::new();
    let Ok(re) = Regex::new(GETTEXT_PATTERN) else {
        return messages;
    };
    for cap in re.captures_iter(content) {
        let message = cap[1].to_string();
        if !messages.contains(&message) {
            messages.push(message);
        }
    }
    messages
}

/// Locale code such as `fr_FR` named somewhere in the path.
pub fn locale_from_path(path: &str) -> String {
    Regex::new(LOCALE_PATTERN)
        .ok()
        .and_then(|re| re.find(path).map(|m| m.as_str().to_string()))
        .unwrap_or_else(|| UNKNOWN_LOCALE.to_string())
}

/// Single-line `msgid`/`msgstr` pairs. The empty header entry is skipped.
pub fn parse_po(content: &str) -> Vec<PoEntry> {
    let Ok(re) = Regex::new(PO_ENTRY_PATTERN) else {
        return Vec::new();
    };
    re.captures_iter(content)
        .map(|cap| PoEntry {
            msgid: cap[1].to_string(),
            msgstr: cap[2].to_string(),
        })
        .collect()
}

/// Whether the bytes start with the `.mo` magic number in either byte order.
pub fn is_mo(bytes: &[u8]) -> bool {
    let Some(head) = bytes.get(..4) else {
        return false;
    };
    let head = [head[0], head[1], head[2], head[3]];
    u32::from_le_bytes(head) == MO_MAGIC || u32::from_be_bytes(head) == MO_MAGIC
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_gettext_messages() {
        let code = r#"
print(_("Hello"))
title = _( 'Welcome back' )
again = _("Hello")
other = gettext("ignored")
"#;
        assert_eq!(extract_gettext_messages(code), ["Hello", "Welcome back"]);
    }

    #[test]
    fn test_locale_from_path() {
        assert_eq!(locale_from_path("locale/fr_FR/LC_MESSAGES/app.po"), "fr_FR");
        assert_eq!(locale_from_path("translations/app.po"), UNKNOWN_LOCALE);
    }

    #[test]
    fn test_parse_po() {
        let po = r#"msgid ""
msgstr ""
"Content-Type: text/plain; charset=UTF-8\n"

msgid "Hello"
msgstr "Bonjour"

msgid "Bye"
msgstr "Au revoir"
"#;
        let entries = parse_po(po);
        assert_eq!(
            entries,
            [
                PoEntry { msgid: "Hello".into(), msgstr: "Bonjour".into() },
                PoEntry { msgid: "Bye".into(), msgstr: "Au revoir".into() },
            ]
        );
    }

    #[test]
    fn test_is_mo() {
        assert!(is_mo(&[0xde, 0x12, 0x04, 0x95, 0, 0]));
        assert!(is_mo(&[0x95, 0x04, 0x12, 0xde]));
        assert!(!is_mo(b"msgid"));
        assert!(!is_mo(&[0xde]));
    }
}
