use keylink_engine::{KeywordGroup, KeywordRule, ScanOptions};
use relative_path::RelativePath;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Everything keylink reads from `config.toml`.
///
/// ```toml
/// notes_path = "~/notes"
/// exclude = ["templates/**", "archive/*.md"]
///
/// [options]
/// first_occurrence_only = true
///
/// [[groups]]
/// id = "5c0e...."
/// name = "Languages"
/// defaults = { enable_tags = true }
///
/// [[keywords]]
/// keyword = "Rust"
/// target = "Rust Language"
/// variations = ["rustlang"]
/// group_id = "5c0e...."
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub notes_path: PathBuf,
    /// Glob patterns, relative to `notes_path`, of notes never scanned.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub options: ScanOptions,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<KeywordGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<KeywordRule>,
}

impl Config {
    pub fn new(notes_path: impl Into<PathBuf>) -> Self {
        Self {
            notes_path: notes_path.into(),
            exclude: Vec::new(),
            options: ScanOptions::default(),
            groups: Vec::new(),
            keywords: Vec::new(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded notes path
        config.notes_path = Self::expand_path(&config.notes_path).unwrap_or(config.notes_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/keylink");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Compiled `exclude` patterns. Invalid patterns are logged and skipped.
    pub fn exclude_patterns(&self) -> Vec<glob::Pattern> {
        self.exclude
            .iter()
            .filter_map(|raw| match glob::Pattern::new(raw) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    log::warn!("Ignoring invalid exclude pattern '{raw}': {e}");
                    None
                }
            })
            .collect()
    }

    /// Whether a vault-relative note path matches any `exclude` pattern.
    pub fn is_excluded(&self, path: &RelativePath) -> bool {
        self.exclude_patterns()
            .iter()
            .any(|pattern| pattern.matches(path.as_str()))
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
