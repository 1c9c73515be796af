//! Configuration module for Rustform.
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - User configuration (~/.rustform.toml)
//! - Project configuration (./rustform.toml)
//! - Explicit `--config` file
//! - Environment variables

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stack::DEFAULT_REGION;

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default settings.
    pub defaults: Defaults,
    /// Colors and output settings.
    pub colors: ColorsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Configuration files that were applied, in precedence order. Recorded
    /// here so the binary can report them once the subscriber is up.
    #[serde(skip)]
    pub loaded_files: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: Defaults::default(),
            colors: ColorsConfig::default(),
            logging: LoggingConfig::default(),
            loaded_files: Vec::new(),
        }
    }
}

/// Default configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Provider region.
    pub region: String,
    /// Path of the state file.
    pub state_path: PathBuf,
    /// Wait for the instance to become running during apply.
    pub wait: bool,
    /// Timeout for wait operations in seconds.
    pub wait_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            state_path: PathBuf::from("rustform.state.json"),
            wait: true,
            wait_timeout: 300,
        }
    }
}

/// Colors and output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Enable colored terminal output.
    pub enabled: bool,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log filter overriding the verbosity-derived default, e.g. `debug`.
    pub level: Option<String>,
}

/// Overlay shape for partial configuration files.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    defaults: RawDefaults,
    colors: RawColors,
    logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawDefaults {
    region: Option<String>,
    state_path: Option<PathBuf>,
    wait: Option<bool>,
    wait_timeout: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawColors {
    enabled: Option<bool>,
}

impl Config {
    /// Loads configuration with the documented precedence. A missing file is
    /// skipped silently except for an explicitly requested one, which is an
    /// error.
    pub fn load(explicit: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::default();

        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".rustform.toml"));
        }
        candidates.push(PathBuf::from("rustform.toml"));

        for path in &candidates {
            if path.exists() {
                config.overlay_file(path)?;
            }
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "config file '{}' not found",
                    path.display()
                )));
            }
            config.overlay_file(path)?;
        }

        config.overlay_env();
        config.validate()?;
        Ok(config)
    }

    fn overlay_file(&mut self, path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(path)?;
        let raw: RawConfig = toml::from_str(&contents)?;

        if let Some(region) = raw.defaults.region {
            self.defaults.region = region;
        }
        if let Some(state_path) = raw.defaults.state_path {
            self.defaults.state_path = state_path;
        }
        if let Some(wait) = raw.defaults.wait {
            self.defaults.wait = wait;
        }
        if let Some(wait_timeout) = raw.defaults.wait_timeout {
            self.defaults.wait_timeout = wait_timeout;
        }
        if let Some(enabled) = raw.colors.enabled {
            self.colors.enabled = enabled;
        }
        if raw.logging.level.is_some() {
            self.logging.level = raw.logging.level;
        }

        self.loaded_files.push(path.to_path_buf());
        Ok(())
    }

    fn overlay_env(&mut self) {
        if let Ok(region) = std::env::var("RUSTFORM_REGION") {
            self.defaults.region = region;
        }
        if let Ok(state_path) = std::env::var("RUSTFORM_STATE_PATH") {
            self.defaults.state_path = PathBuf::from(state_path);
        }
        if let Ok(level) = std::env::var("RUSTFORM_LOG") {
            self.logging.level = Some(level);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.defaults.region.trim().is_empty() {
            return Err(Error::InvalidConfig {
                key: "defaults.region".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.defaults.wait_timeout == 0 {
            return Err(Error::InvalidConfig {
                key: "defaults.wait_timeout".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.defaults.region, "us-east-1");
        assert_eq!(
            config.defaults.state_path,
            PathBuf::from("rustform.state.json")
        );
        assert!(config.defaults.wait);
        assert_eq!(config.defaults.wait_timeout, 300);
        assert!(config.colors.enabled);
        assert_eq!(config.logging.level, None);
    }

    #[test]
    #[serial]
    fn explicit_file_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rustform.toml");
        std::fs::write(
            &path,
            r#"
[defaults]
region = "us-west-2"
wait_timeout = 120

[colors]
enabled = false
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.defaults.region, "us-west-2");
        assert_eq!(config.defaults.wait_timeout, 120);
        assert!(!config.colors.enabled);
        // Untouched keys keep their defaults.
        assert!(config.defaults.wait);
        assert!(config.loaded_files.contains(&path));
    }

    #[test]
    #[serial]
    fn env_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rustform.toml");
        std::fs::write(&path, "[defaults]\nregion = \"us-west-2\"\n").unwrap();

        std::env::set_var("RUSTFORM_REGION", "eu-central-1");
        let config = Config::load(Some(&path)).unwrap();
        std::env::remove_var("RUSTFORM_REGION");

        assert_eq!(config.defaults.region, "eu-central-1");
    }

    #[test]
    #[serial]
    fn missing_explicit_file_is_an_error() {
        let err = Config::load(Some(&PathBuf::from("/nonexistent/rustform.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    #[serial]
    fn zero_wait_timeout_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rustform.toml");
        std::fs::write(&path, "[defaults]\nwait_timeout = 0\n").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }
}
