//! Configuration file management.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use airwatch_core::FreshnessPolicy;
use airwatch_core::aggregate::DEFAULT_WINDOW_HOURS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Default JSON data file (demo fleet when unset)
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    /// Trailing summary window in hours
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,

    /// Report devices silent for longer than this as offline
    #[serde(default)]
    pub stale_after_minutes: Option<u64>,

    /// Default output format
    #[serde(default)]
    pub format: Option<String>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,

    /// Device aliases (friendly name -> device id)
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

fn default_window_hours() -> u32 {
    DEFAULT_WINDOW_HOURS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            window_hours: default_window_hours(),
            stale_after_minutes: None,
            format: None,
            no_color: false,
            aliases: HashMap::new(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("airwatch")
            .join("config.toml")
    }

    /// Load config from the default path, or return default if not found
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load config from `path`. Unreadable or malformed files fall back to
    /// defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        warn!("Failed to parse config {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Failed to read config {}: {}", path.display(), e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    /// Save config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Freshness policy, with an explicit `--stale-after` taking precedence.
    pub fn freshness_policy(&self, stale_after: Option<u64>) -> FreshnessPolicy {
        FreshnessPolicy::from_minutes(stale_after.or(self.stale_after_minutes))
    }

    /// Data file, with an explicit `--data` taking precedence.
    pub fn resolve_data_file(&self, data: Option<PathBuf>) -> Option<PathBuf> {
        data.or_else(|| self.data_file.clone())
    }
}

/// Resolve an alias to its device id, or return the original if not an alias.
pub fn resolve_alias(device: &str, config: &Config) -> String {
    config
        .aliases
        .get(device)
        .cloned()
        .unwrap_or_else(|| device.to_string())
}

/// Print alias resolution feedback if the user is not in quiet mode.
pub fn print_alias_feedback(original: &str, resolved: &str, quiet: bool) {
    if !quiet && original != resolved {
        eprintln!("Using device '{}' -> {}", original, resolved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.window_hours, 24);
        assert!(config.data_file.is_none());
        assert!(config.stale_after_minutes.is_none());
        assert!(!config.no_color);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("no_color = true\n").unwrap();
        assert!(config.no_color);
        assert_eq!(config.window_hours, 24);
        assert!(config.aliases.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config {
            data_file: Some(PathBuf::from("/tmp/fleet.json")),
            window_hours: 6,
            stale_after_minutes: Some(30),
            format: Some("json".to_string()),
            ..Default::default()
        };
        config
            .aliases
            .insert("kitchen".to_string(), "AQM-002".to_string());
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("missing.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "window_hours = \"many\"").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_freshness_policy_precedence() {
        let config = Config {
            stale_after_minutes: Some(60),
            ..Default::default()
        };
        assert_eq!(
            config.freshness_policy(None),
            FreshnessPolicy::StaleAfter(Duration::minutes(60))
        );
        assert_eq!(
            config.freshness_policy(Some(10)),
            FreshnessPolicy::StaleAfter(Duration::minutes(10))
        );
        assert_eq!(
            Config::default().freshness_policy(None),
            FreshnessPolicy::Passthrough
        );
    }

    #[test]
    fn test_resolve_data_file_prefers_flag() {
        let config = Config {
            data_file: Some(PathBuf::from("config.json")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_data_file(Some(PathBuf::from("flag.json"))),
            Some(PathBuf::from("flag.json"))
        );
        assert_eq!(
            config.resolve_data_file(None),
            Some(PathBuf::from("config.json"))
        );
        assert_eq!(Config::default().resolve_data_file(None), None);
    }

    #[test]
    fn test_resolve_alias_found() {
        let mut aliases = HashMap::new();
        aliases.insert("living-room".to_string(), "AQM-001".to_string());
        let config = Config {
            aliases,
            ..Default::default()
        };
        assert_eq!(resolve_alias("living-room", &config), "AQM-001");
    }

    #[test]
    fn test_resolve_alias_returns_id_unchanged() {
        let config = Config::default();
        assert_eq!(resolve_alias("AQM-003", &config), "AQM-003");
    }
}
