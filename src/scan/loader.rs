use crate::config::LimitsConfig;
use std::io::Read;
use std::path::Path;

/// Caps applied while loading a file's content.
#[derive(Debug, Clone, Copy)]
pub struct LoadLimits {
    /// Maximum characters kept from the decoded text
    pub max_chars: usize,
    /// Bytes sniffed from the head for binary detection
    pub probe_bytes: usize,
}

impl Default for LoadLimits {
    fn default() -> Self {
        Self {
            max_chars: 50_000,
            probe_bytes: 1024,
        }
    }
}

impl From<&LimitsConfig> for LoadLimits {
    fn from(config: &LimitsConfig) -> Self {
        Self {
            max_chars: config.max_chars,
            probe_bytes: config.probe_bytes,
        }
    }
}

/// Outcome of one load attempt. Errors are reported in-band, never raised;
/// callers decide whether to cache the content.
#[derive(Debug, Clone, Default)]
pub struct ReadResult {
    pub content: Option<String>,
    pub truncated: bool,
    pub is_binary: bool,
    pub size: Option<u64>,
    pub error: Option<String>,
}

/// Load a file's text with binary detection and size-bounded truncation.
///
/// The binary probe runs first and short-circuits: a zero byte within the
/// probe window classifies the file binary and no decode is attempted. A
/// failing probe is not conclusive; the full read still runs.
pub fn load_content(path: &Path, limits: &LoadLimits) -> ReadResult {
    let size = std::fs::metadata(path).ok().map(|m| m.len());

    match probe_is_binary(path, limits.probe_bytes) {
        Ok(true) => {
            return ReadResult {
                content: None,
                truncated: false,
                is_binary: true,
                size,
                error: None,
            };
        }
        Ok(false) => {}
        Err(e) => {
            log::warn!("Binary probe failed for {}: {}", path.display(), e);
        }
    }

    match std::fs::read(path) {
        Ok(bytes) => {
            let mut text = String::from_utf8_lossy(&bytes).into_owned();
            let mut truncated = false;
            if let Some((byte_idx, _)) = text.char_indices().nth(limits.max_chars) {
                text.truncate(byte_idx);
                truncated = true;
            }
            ReadResult {
                content: Some(text),
                truncated,
                is_binary: false,
                size,
                error: None,
            }
        }
        Err(e) => {
            log::warn!("Read failed for {}: {}", path.display(), e);
            ReadResult {
                content: None,
                truncated: false,
                is_binary: false,
                size,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Read up to `probe_bytes` from the head of the file and look for a zero
/// byte. Short reads (file smaller than the window) are fine.
fn probe_is_binary(path: &Path, probe_bytes: usize) -> std::io::Result<bool> {
    let mut file = std::fs::File::open(path)?;
    let mut buf = vec![0u8; probe_bytes];
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(buf[..filled].contains(&0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn zero_byte_in_probe_window_classifies_binary() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "blob.py", b"abc\x00def");
        let res = load_content(&path, &LoadLimits::default());
        assert!(res.is_binary);
        assert!(res.content.is_none());
        assert!(!res.truncated);
        assert_eq!(res.size, Some(7));
        assert!(res.error.is_none());
    }

    #[test]
    fn zero_byte_beyond_probe_window_is_not_detected() {
        // Monotonicity cuts one way only: the probe never reads past its window
        let dir = TempDir::new().unwrap();
        let mut bytes = vec![b'a'; 2000];
        bytes.push(0);
        let path = write_file(&dir, "tail.txt", &bytes);
        let res = load_content(&path, &LoadLimits::default());
        assert!(!res.is_binary);
        assert!(res.content.is_some());
    }

    #[test]
    fn zero_byte_detected_regardless_of_remaining_content() {
        let dir = TempDir::new().unwrap();
        let mut bytes = vec![b'x'; 10];
        bytes[3] = 0;
        bytes.extend_from_slice(&[b'y'; 5000]);
        let path = write_file(&dir, "mixed.txt", &bytes);
        let res = load_content(&path, &LoadLimits::default());
        assert!(res.is_binary);
    }

    #[test]
    fn content_over_cap_is_truncated_to_exactly_max_chars() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "long.txt", "a".repeat(120).as_bytes());
        let limits = LoadLimits {
            max_chars: 100,
            probe_bytes: 1024,
        };
        let res = load_content(&path, &limits);
        assert_eq!(res.content.as_ref().unwrap().chars().count(), 100);
        assert!(res.truncated);
    }

    #[test]
    fn content_at_or_under_cap_is_kept_whole() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "short.txt", "a".repeat(100).as_bytes());
        let limits = LoadLimits {
            max_chars: 100,
            probe_bytes: 1024,
        };
        let res = load_content(&path, &limits);
        assert_eq!(res.content.as_ref().unwrap().len(), 100);
        assert!(!res.truncated);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "accents.txt", "é".repeat(60).as_bytes());
        let limits = LoadLimits {
            max_chars: 50,
            probe_bytes: 1024,
        };
        let res = load_content(&path, &limits);
        assert_eq!(res.content.as_ref().unwrap().chars().count(), 50);
        assert!(res.truncated);
    }

    #[test]
    fn missing_file_reports_error_in_band() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.txt");
        let res = load_content(&path, &LoadLimits::default());
        assert!(res.content.is_none());
        assert!(!res.is_binary);
        assert!(res.error.is_some());
    }

    #[test]
    fn empty_file_loads_as_empty_text() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty.txt", b"");
        let res = load_content(&path, &LoadLimits::default());
        assert_eq!(res.content.as_deref(), Some(""));
        assert!(!res.truncated);
        assert!(!res.is_binary);
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily_rather_than_failing() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "latin1.txt", &[b'c', b'a', b'f', 0xE9]);
        let res = load_content(&path, &LoadLimits::default());
        let text = res.content.unwrap();
        assert!(text.starts_with("caf"));
        assert!(res.error.is_none());
    }
}
