//! Category, encoding and purpose sniffing for files outside the Python pipeline.

use std::path::Path;

use chardetng::EncodingDetector;

use crate::ontology::{FileCategory, FilePurpose};

/// Bytes inspected when deciding whether a file is binary.
const BINARY_SNIFF_LEN: usize = 10 * 1024;

/// What is known about a generic file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub category: FileCategory,
    /// `UTF-8` when the content decodes, the detected legacy encoding for
    /// other text, `unknown` for binary content
    pub encoding: String,
    /// Lowercased extension without the dot, empty when there is none
    pub extension: String,
    pub purpose: FilePurpose,
}

/// Category implied by an extension alone.
pub fn category_for_extension(ext: &str) -> FileCategory {
    match ext {
        "py" => FileCategory::SourceCode,
        "txt" => FileCategory::Text,
        "md" | "rst" => FileCategory::Documentation,
        "cfg" | "ini" | "json" | "yaml" | "yml" => FileCategory::Config,
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" => FileCategory::Image,
        "mp4" | "avi" => FileCategory::Video,
        "mp3" | "wav" => FileCategory::Audio,
        "zip" | "tar" | "gz" => FileCategory::Archive,
        "csv" | "tsv" | "xls" | "xlsx" | "pickle" | "pkl" => FileCategory::Data,
        _ => FileCategory::Other,
    }
}

/// Classify a file from its relative path and raw content.
pub fn classify_file(rel_path: &str, bytes: &[u8]) -> FileInfo {
    let extension = Path::new(rel_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let mut category = category_for_extension(&extension);
    if category == FileCategory::Other && is_binary(bytes) {
        category = FileCategory::Binary;
    }

    let text = std::str::from_utf8(bytes).ok();
    let encoding = detect_encoding(bytes, text.is_some());

    let mut purpose = purpose_for(rel_path, category);
    let scriptable = matches!(
        category,
        FileCategory::Text | FileCategory::SourceCode | FileCategory::Other
    );
    if scriptable && text.is_some_and(|t| t.starts_with("#!")) {
        purpose = FilePurpose::ExecutableScript;
    }

    FileInfo {
        category,
        encoding,
        extension,
        purpose,
    }
}

/// Name of the content's encoding.
fn detect_encoding(bytes: &[u8], is_utf8: bool) -> String {
    if is_utf8 {
        return "UTF-8".to_string();
    }
    if is_binary(bytes) {
        return "unknown".to_string();
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, false).name().to_string()
}

/// A NUL byte near the start marks a file binary.
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(BINARY_SNIFF_LEN).any(|&b| b == 0)
}

fn purpose_for(rel_path: &str, category: FileCategory) -> FilePurpose {
    let lowered = rel_path.to_lowercase();
    if lowered.contains("test") {
        return FilePurpose::TestCode;
    }
    if lowered.contains("doc") {
        return FilePurpose::Documentation;
    }
    if lowered.contains("example") {
        return FilePurpose::ExampleCode;
    }
    match category {
        FileCategory::Config => FilePurpose::Configuration,
        FileCategory::Data => FilePurpose::Data,
        FileCategory::Image => FilePurpose::Asset,
        FileCategory::SourceCode => FilePurpose::SourceCode,
        _ => FilePurpose::Other,
    }
}
