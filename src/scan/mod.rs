mod classify;
mod loader;
mod traverse;

pub use classify::Classifier;
pub use loader::{load_content, LoadLimits, ReadResult};
pub use traverse::{traverse, ScanOptions};

use std::path::PathBuf;

/// One selectable file discovered by traversal or picked manually.
///
/// `abs_path` is the underlying handle and is owned exclusively by the
/// selection entry; no other component keeps a copy of it.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Path segments joined by '/', unique within one selection generation
    pub path: String,
    /// Final path segment
    pub name: String,
    /// Absolute location on disk
    pub abs_path: PathBuf,
    /// Byte length, None if unknown
    pub size: Option<u64>,
    /// Best-effort media type, informational only
    pub mime_hint: Option<String>,
    /// Whether this file's content enters the next request
    pub included: bool,
    /// Lazily-populated text (None = not yet loaded)
    pub cached_content: Option<String>,
    /// True iff cached_content is a prefix of the real file
    pub truncated: bool,
}

/// Best-effort media type from a file name. Purely informational.
pub fn mime_hint_for(name: &str) -> Option<String> {
    let ext = name.rfind('.').map(|i| name[i..].to_lowercase())?;
    let mime = match ext.as_str() {
        ".py" => "text/x-python",
        ".js" => "text/javascript",
        ".ts" => "text/x-typescript",
        ".java" => "text/x-java-source",
        ".go" => "text/x-go",
        ".rs" => "text/x-rust",
        ".md" => "text/markdown",
        ".txt" => "text/plain",
        ".json" => "application/json",
        ".toml" => "text/x-toml",
        _ => return None,
    };
    Some(mime.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_hint_known_extension() {
        assert_eq!(mime_hint_for("main.py").as_deref(), Some("text/x-python"));
        assert_eq!(mime_hint_for("README.md").as_deref(), Some("text/markdown"));
    }

    #[test]
    fn mime_hint_unknown_or_missing_extension() {
        assert_eq!(mime_hint_for("Dockerfile"), None);
        assert_eq!(mime_hint_for("image.png"), None);
    }

    #[test]
    fn mime_hint_is_case_insensitive() {
        assert_eq!(mime_hint_for("NOTES.TXT").as_deref(), Some("text/plain"));
    }
}
