use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcConfig {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// [limits] section: content-loading caps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum characters of a file's text kept in memory / sent per file
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    /// Bytes sniffed from the head of a file for binary detection
    #[serde(default = "default_probe_bytes")]
    pub probe_bytes: usize,
}

/// [request] section: assistant endpoint options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default = "default_true")]
    pub allow_pseudocode: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// [scan] section: traversal filtering, kept as data so the sets can be
/// swapped in config without touching the traversal itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory names never descended into (unless include-all is on)
    #[serde(default = "default_ignored_dirs")]
    pub ignored_dirs: Vec<String>,
    /// File extensions accepted by the allow-list (with leading dot)
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    /// Exact filenames accepted regardless of extension
    #[serde(default = "default_allowed_filenames")]
    pub allowed_filenames: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub line_numbers: bool,
    #[serde(default = "default_true")]
    pub show_sizes: bool,
}

fn default_true() -> bool {
    true
}

fn default_max_chars() -> usize {
    50_000
}

fn default_probe_bytes() -> usize {
    1024
}

fn default_endpoint() -> String {
    "http://127.0.0.1:5000/api/query".into()
}

fn default_tone() -> String {
    "concise".into()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_ignored_dirs() -> Vec<String> {
    [".git", "node_modules", "dist", "build"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_allowed_extensions() -> Vec<String> {
    [".py", ".js", ".ts", ".java", ".go", ".rs", ".md", ".txt"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_allowed_filenames() -> Vec<String> {
    [
        "Dockerfile",
        "package.json",
        "pyproject.toml",
        "requirements.txt",
        "Cargo.toml",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Tones the settings overlay cycles through
pub const TONES: &[&str] = &["concise", "detailed", "friendly"];

impl Default for AcConfig {
    fn default() -> Self {
        Self {
            limits: LimitsConfig::default(),
            request: RequestConfig::default(),
            scan: ScanConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            probe_bytes: default_probe_bytes(),
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            tone: default_tone(),
            allow_pseudocode: true,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignored_dirs: default_ignored_dirs(),
            allowed_extensions: default_allowed_extensions(),
            allowed_filenames: default_allowed_filenames(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            line_numbers: true,
            show_sizes: true,
        }
    }
}

/// Load config by merging global defaults with per-tree overrides.
/// Priority: per-tree `.ac-config.toml` > global `~/.config/ac/config.toml` > built-in defaults.
/// Merging is deep: individual fields within sections (e.g. `[limits]`) override independently.
pub fn load_config(root: &str) -> AcConfig {
    let local_path = format!("{root}/.ac-config.toml");
    let global_path = dirs::config_dir()
        .map(|d| d.join("ac/config.toml").to_string_lossy().to_string());

    let global_table = global_path
        .and_then(|p| std::fs::read_to_string(p).ok())
        .and_then(|c| c.parse::<toml::Value>().ok())
        .and_then(|v| match v {
            toml::Value::Table(t) => Some(t),
            _ => None,
        });

    let local_table = std::fs::read_to_string(&local_path)
        .ok()
        .and_then(|c| c.parse::<toml::Value>().ok())
        .and_then(|v| match v {
            toml::Value::Table(t) => Some(t),
            _ => None,
        });

    let merged = match (global_table, local_table) {
        (Some(mut global), Some(local)) => {
            deep_merge(&mut global, local);
            toml::Value::Table(global)
        }
        (Some(global), None) => toml::Value::Table(global),
        (None, Some(local)) => toml::Value::Table(local),
        (None, None) => return AcConfig::default(),
    };

    merged.try_into().unwrap_or_default()
}

/// Recursively merge `overlay` into `base`. Overlay values win; nested tables are merged recursively.
fn deep_merge(
    base: &mut toml::map::Map<String, toml::Value>,
    overlay: toml::map::Map<String, toml::Value>,
) {
    for (key, value) in overlay {
        match (base.get_mut(&key), &value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table.clone());
            }
            _ => {
                base.insert(key, value);
            }
        }
    }
}

/// Save config to the global config dir (~/.config/ac/config.toml).
pub fn save_config(config: &AcConfig) -> Result<()> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("ac");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("config.toml");
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Settings item types for the settings overlay UI.
#[derive(Debug, Clone)]
pub enum SettingsItem {
    SectionHeader(String),
    BoolToggle {
        label: String,
        get: fn(&AcConfig) -> bool,
        set: fn(&mut AcConfig, bool),
    },
    /// Cycles through a fixed list of string values on toggle
    Cycle {
        label: String,
        options: &'static [&'static str],
        get: fn(&AcConfig) -> String,
        set: fn(&mut AcConfig, String),
    },
    StringDisplay {
        label: String,
        get: fn(&AcConfig) -> String,
    },
}

/// Build the list of settings items for the settings overlay.
pub fn settings_items() -> Vec<SettingsItem> {
    vec![
        SettingsItem::SectionHeader("Request".into()),
        SettingsItem::BoolToggle {
            label: "Allow pseudocode in answers".into(),
            get: |c| c.request.allow_pseudocode,
            set: |c, v| c.request.allow_pseudocode = v,
        },
        SettingsItem::Cycle {
            label: "Tone".into(),
            options: TONES,
            get: |c| c.request.tone.clone(),
            set: |c, v| c.request.tone = v,
        },
        SettingsItem::StringDisplay {
            label: "Endpoint".into(),
            get: |c| c.request.endpoint.clone(),
        },
        SettingsItem::SectionHeader("Display".into()),
        SettingsItem::BoolToggle {
            label: "Line numbers in preview".into(),
            get: |c| c.display.line_numbers,
            set: |c, v| c.display.line_numbers = v,
        },
        SettingsItem::BoolToggle {
            label: "File sizes in list".into(),
            get: |c| c.display.show_sizes,
            set: |c, v| c.display.show_sizes = v,
        },
        SettingsItem::SectionHeader("Limits".into()),
        SettingsItem::StringDisplay {
            label: "Max chars per file".into(),
            get: |c| c.limits.max_chars.to_string(),
        },
        SettingsItem::StringDisplay {
            label: "Binary probe bytes".into(),
            get: |c| c.limits.probe_bytes.to_string(),
        },
    ]
}
