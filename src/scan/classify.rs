use crate::config::ScanConfig;
use std::collections::HashSet;

/// Decides whether a directory entry takes part in a scan.
///
/// Built once per scan from the `[scan]` config section; the sets are
/// plain data so users can substitute them without touching traversal.
#[derive(Debug, Clone)]
pub struct Classifier {
    ignored_dirs: HashSet<String>,
    allowed_extensions: HashSet<String>,
    allowed_filenames: HashSet<String>,
}

impl Classifier {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            ignored_dirs: config.ignored_dirs.iter().cloned().collect(),
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
            allowed_filenames: config.allowed_filenames.iter().cloned().collect(),
        }
    }

    /// Whether an entry should be skipped during traversal.
    ///
    /// Directories: skipped when the name is in the ignored set, unless
    /// `include_ignored` asks for them. Files: skipped when they fail the
    /// allow-list. Skipping is silent, not an error.
    pub fn skip(&self, name: &str, is_directory: bool, include_ignored: bool) -> bool {
        if is_directory {
            !include_ignored && self.ignored_dirs.contains(name)
        } else {
            !self.allows_file(name)
        }
    }

    /// Exact filename match takes priority over the extension key.
    fn allows_file(&self, name: &str) -> bool {
        if self.allowed_filenames.contains(name) {
            return true;
        }
        self.allowed_extensions.contains(&extension_key(name))
    }
}

/// Classification key for extension matching: the substring from the last
/// '.' lowercased, or empty if the name has no dot.
fn extension_key(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) => name[idx..].to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::from_config(&ScanConfig::default())
    }

    #[test]
    fn ignored_directory_is_skipped() {
        let c = classifier();
        assert!(c.skip(".git", true, false));
        assert!(c.skip("node_modules", true, false));
    }

    #[test]
    fn ignored_directory_kept_when_requested() {
        let c = classifier();
        assert!(!c.skip(".git", true, true));
    }

    #[test]
    fn ordinary_directory_is_descended() {
        let c = classifier();
        assert!(!c.skip("src", true, false));
    }

    #[test]
    fn allowed_extension_passes() {
        let c = classifier();
        assert!(!c.skip("main.py", false, false));
        assert!(!c.skip("lib.rs", false, false));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let c = classifier();
        assert!(!c.skip("README.MD", false, false));
    }

    #[test]
    fn exact_filename_passes_without_matching_extension() {
        let c = classifier();
        assert!(!c.skip("Dockerfile", false, false));
        assert!(!c.skip("package.json", false, false));
    }

    #[test]
    fn disallowed_file_is_skipped_silently() {
        let c = classifier();
        assert!(c.skip("image.png", false, false));
        assert!(c.skip("binary", false, false));
    }

    #[test]
    fn include_ignored_does_not_widen_the_file_allow_list() {
        let c = classifier();
        assert!(c.skip("image.png", false, true));
    }

    #[test]
    fn extension_key_is_last_dot_segment() {
        assert_eq!(extension_key("archive.tar.gz"), ".gz");
        assert_eq!(extension_key("Makefile"), "");
        assert_eq!(extension_key(".gitignore"), ".gitignore");
    }

    #[test]
    fn custom_config_substitutes_the_sets() {
        let config = ScanConfig {
            ignored_dirs: vec!["target".into()],
            allowed_extensions: vec![".c".into()],
            allowed_filenames: vec!["Makefile".into()],
        };
        let c = Classifier::from_config(&config);
        assert!(c.skip("target", true, false));
        assert!(!c.skip(".git", true, false));
        assert!(!c.skip("main.c", false, false));
        assert!(!c.skip("Makefile", false, false));
        assert!(c.skip("main.py", false, false));
    }
}
