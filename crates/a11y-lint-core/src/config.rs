//! Configuration types for a11y-lint.

use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File names looked up at a workspace root; the first present one wins.
pub const CONFIG_CANDIDATES: &[&str] = &["a11y-lint.toml", ".a11y-lint.toml"];

/// Top-level configuration for a11y-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use (e.g., "recommended", "strict", "minimal").
    #[serde(default)]
    pub preset: Option<String>,

    /// Minimum severity reported (default: "info").
    #[serde(default)]
    pub min_severity: Option<Severity>,

    /// Workspace indexing configuration.
    #[serde(default)]
    pub index: IndexConfig,

    /// Per-analyzer configurations.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Same as [`Config::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses one config file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] when the file is unreadable, [`ConfigError::Parse`] on bad TOML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses config text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] when `content` is not a valid config document.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Returns the first config file present at `root`.
    #[must_use]
    pub fn find_in(root: &Path) -> Option<PathBuf> {
        CONFIG_CANDIDATES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
    }

    /// Loads the config file at `root`, or defaults if there is none.
    ///
    /// A relative `index.root` is resolved against `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    pub fn load_from_root(root: &Path) -> Result<Self, ConfigError> {
        let mut config = match Self::find_in(root) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        if config.index.root.is_relative() {
            config.index.root = root.join(&config.index.root);
        }
        Ok(config)
    }

    /// False only when the analyzer's section sets `enabled = false`.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Severity set in the analyzer's section, if any.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// The `[rules.<name>]` section of an analyzer.
    #[must_use]
    pub fn rule_config(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.rules.get(rule_name)
    }

    /// Effective minimum severity.
    #[must_use]
    pub fn min_severity(&self) -> Severity {
        self.min_severity.unwrap_or(Severity::Info)
    }
}

/// Workspace discovery and indexing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Workspace root (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns of files to index.
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Glob patterns to skip.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Upper bound on files for project-scope analysis.
    #[serde(default = "default_max_project_files")]
    pub max_project_files: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            include: default_include(),
            exclude: default_exclude(),
            respect_gitignore: true,
            max_project_files: default_max_project_files(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_include() -> Vec<String> {
    [
        "**/*.html",
        "**/*.htm",
        "**/*.js",
        "**/*.mjs",
        "**/*.cjs",
        "**/*.jsx",
        "**/*.ts",
        "**/*.tsx",
        "**/*.css",
        "**/*.scss",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

fn default_exclude() -> Vec<String> {
    [
        "**/node_modules/**",
        "**/dist/**",
        "**/build/**",
        "**/.git/**",
        "**/vendor/**",
        "**/coverage/**",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

fn default_true() -> bool {
    true
}

fn default_max_project_files() -> usize {
    2000
}

/// Per-analyzer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// `Some(false)` turns the analyzer off.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Replaces the severity of every issue the analyzer reports.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Remaining keys of the section, read by the analyzer itself.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Deserializes option `key`, or `None` when absent or mistyped.
    #[must_use]
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| v.clone().try_into().ok())
    }

    /// Option `key` as a bool.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Option `key` as an integer.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.options
            .get(key)
            .and_then(toml::Value::as_integer)
            .unwrap_or(default)
    }

    /// Option `key` as a string.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }

    /// Option `key` as a list of strings; non-string entries are skipped.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Vec<String> {
        self.options
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Why a config file could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Cannot read {path}: {source}")]
    Io {
        /// The config file.
        path: PathBuf,
        /// The read error.
        source: std::io::Error,
    },

    /// The text is not a valid config document.
    #[error("Invalid config: {message}")]
    Parse {
        /// Message from the TOML parser.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.index.respect_gitignore);
        assert_eq!(config.index.max_project_files, 2000);
        assert!(config.index.include.iter().any(|p| p == "**/*.html"));
        assert!(config.rules.is_empty());
        assert_eq!(config.min_severity(), Severity::Info);
    }

    #[test]
    fn parse_config() {
        let toml = r#"
preset = "strict"
min_severity = "warning"

[index]
root = "./site"
exclude = ["**/generated/**"]
max_project_files = 50

[rules.focus-management]
severity = "error"
line_window = 8

[rules.positive-tabindex]
enabled = false
"#;

        let config = Config::parse(toml).expect("parse");
        assert_eq!(config.preset.as_deref(), Some("strict"));
        assert_eq!(config.min_severity(), Severity::Warning);
        assert_eq!(config.index.root, PathBuf::from("./site"));
        assert_eq!(config.index.max_project_files, 50);
        assert!(config.index.include.iter().any(|p| p == "**/*.css"));
        assert!(config.is_rule_enabled("focus-management"));
        assert!(!config.is_rule_enabled("positive-tabindex"));
        assert_eq!(config.rule_severity("focus-management"), Some(Severity::Error));

        let rule_config = config.rule_config("focus-management").expect("section");
        assert_eq!(rule_config.get_int("line_window", 5), 8);
        assert!(rule_config.get_bool("missing", true));
    }

    #[test]
    fn parse_error_is_reported() {
        assert!(matches!(
            Config::parse("preset = ["),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn load_from_root_finds_candidates() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(".a11y-lint.toml"), "preset = \"minimal\"\n")
            .expect("write");
        let config = Config::load_from_root(dir.path()).expect("load");
        assert_eq!(config.preset.as_deref(), Some("minimal"));
        assert_eq!(config.index.root, dir.path().join("."));
    }

    #[test]
    fn load_from_root_without_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_from_root(dir.path()).expect("load");
        assert!(config.preset.is_none());
    }
}
