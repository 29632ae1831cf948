use super::{mime_hint_for, Classifier, FileEntry};
use std::collections::VecDeque;
use std::path::Path;

/// Options for one traversal run.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Prefix prepended to every discovered path ("" = root-relative)
    pub base_path: String,
    /// Descend into ignored directories and default every entry to included
    pub include_all: bool,
}

/// Walk a directory breadth-first, returning allowed files in discovery
/// order (root's direct children before grandchildren, never name-sorted).
///
/// Per-entry failures (an unreadable subdirectory, a file that cannot be
/// stat'ed) are logged and dropped; a single bad entry never aborts the
/// walk. The `include_all` flag doubles as the default `included` value of
/// every descriptor this traversal produces.
pub fn traverse(root: &Path, classifier: &Classifier, opts: &ScanOptions) -> Vec<FileEntry> {
    let mut queue: VecDeque<(std::path::PathBuf, String)> = VecDeque::new();
    queue.push_back((root.to_path_buf(), opts.base_path.clone()));
    let mut found = Vec::new();

    while let Some((dir, prefix)) = queue.pop_front() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(e) => {
                log::warn!("Cannot read directory {}: {}", dir.display(), e);
                continue;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("Cannot read entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().to_string();
            let entry_path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", prefix, name)
            };

            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(e) => {
                    log::warn!("Cannot determine type of {}: {}", entry_path, e);
                    continue;
                }
            };

            if file_type.is_dir() {
                if classifier.skip(&name, true, opts.include_all) {
                    continue;
                }
                queue.push_back((entry.path(), entry_path));
            } else if file_type.is_file() {
                if classifier.skip(&name, false, opts.include_all) {
                    continue;
                }
                match entry.metadata() {
                    Ok(meta) => found.push(FileEntry {
                        path: entry_path,
                        name: name.clone(),
                        abs_path: entry.path(),
                        size: Some(meta.len()),
                        mime_hint: mime_hint_for(&name),
                        included: opts.include_all,
                        cached_content: None,
                        truncated: false,
                    }),
                    Err(e) => {
                        log::warn!("Cannot stat {}: {}", entry_path, e);
                    }
                }
            }
            // Symlinks and special files are not selectable
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use std::fs;
    use tempfile::TempDir;

    fn classifier() -> Classifier {
        Classifier::from_config(&ScanConfig::default())
    }

    fn opts(include_all: bool) -> ScanOptions {
        ScanOptions {
            base_path: String::new(),
            include_all,
        }
    }

    #[test]
    fn scan_filters_ignored_dirs_and_disallowed_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/a.py"), "x".repeat(40)).unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/config"), "[core]").unwrap();
        fs::write(dir.path().join("image.png"), b"\x89PNG").unwrap();

        let entries = traverse(dir.path(), &classifier(), &opts(false));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "src/a.py");
        assert_eq!(entries[0].name, "a.py");
        assert_eq!(entries[0].size, Some(40));
        assert!(!entries[0].included);
        assert!(entries[0].cached_content.is_none());
    }

    #[test]
    fn ignored_dir_is_never_entered_when_excluded() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.js"), "x").unwrap();
        fs::write(dir.path().join("main.js"), "y").unwrap();

        let entries = traverse(dir.path(), &classifier(), &opts(false));
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["main.js"]);
    }

    #[test]
    fn include_all_descends_ignored_dirs_and_defaults_to_included() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/notes.txt"), "n").unwrap();
        fs::write(dir.path().join("main.py"), "m").unwrap();

        let entries = traverse(dir.path(), &classifier(), &opts(true));
        let mut paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        paths.sort();
        assert_eq!(paths, vec![".git/notes.txt", "main.py"]);
        assert!(entries.iter().all(|e| e.included));
    }

    #[test]
    fn all_discovered_files_satisfy_the_allow_list() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("keep.rs"), "k").unwrap();
        fs::write(dir.path().join("drop.bin"), "d").unwrap();
        fs::write(dir.path().join("sub/keep.md"), "k").unwrap();
        fs::write(dir.path().join("sub/drop.o"), "d").unwrap();
        fs::write(dir.path().join("Dockerfile"), "FROM x").unwrap();

        let c = classifier();
        let entries = traverse(dir.path(), &c, &opts(false));
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| !c.skip(&e.name, false, false)));
    }

    #[test]
    fn discovery_order_is_breadth_first() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("root.py"), "r").unwrap();
        fs::write(dir.path().join("a/mid.py"), "m").unwrap();
        fs::write(dir.path().join("a/b/deep.py"), "d").unwrap();

        let entries = traverse(dir.path(), &classifier(), &opts(false));
        let depth = |p: &str| p.matches('/').count();
        let depths: Vec<usize> = entries.iter().map(|e| depth(&e.path)).collect();
        let mut sorted = depths.clone();
        sorted.sort();
        assert_eq!(depths, sorted, "shallower entries must come first: {:?}", entries);
    }

    #[test]
    fn base_path_prefixes_every_entry() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "a").unwrap();
        let options = ScanOptions {
            base_path: "repo".into(),
            include_all: false,
        };
        let entries = traverse(dir.path(), &classifier(), &options);
        assert_eq!(entries[0].path, "repo/a.py");
    }

    #[test]
    fn unreadable_root_yields_empty_list_not_a_panic() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let entries = traverse(&missing, &classifier(), &opts(false));
        assert!(entries.is_empty());
    }

    #[test]
    fn mime_hint_populated_from_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "a").unwrap();
        let entries = traverse(dir.path(), &classifier(), &opts(false));
        assert_eq!(entries[0].mime_hint.as_deref(), Some("text/x-python"));
    }
}
