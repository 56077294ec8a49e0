//! ppbind Configuration
//!
//! Handles parsing and management of ppbind.toml configuration files. Only the
//! command-line front end reads this; the library API takes the shared library
//! path directly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ffi::{CallPolicy, GameMode};

/// Name of the configuration file searched for.
pub const CONFIG_FILE_NAME: &str = "ppbind.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching ppbind.toml.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PpbindConfig {
    /// Native library location
    #[serde(default)]
    pub library: LibraryConfig,

    /// Default scoring arguments for the CLI
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Native call scheduling
    #[serde(default)]
    pub calls: CallsConfig,
}

impl PpbindConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: PpbindConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the current directory or parents.
    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
        Self::find_and_load(&cwd)
    }

    /// Find and load configuration by searching up from the given directory.
    ///
    /// Falls back to defaults when no file is found.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        match Self::find(start_dir) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Locate the nearest ppbind.toml at or above `start_dir`.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        start_dir
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.exists())
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Call policy selected by `[calls] serialize`.
    pub fn call_policy(&self) -> CallPolicy {
        if self.calls.serialize {
            CallPolicy::Serialized
        } else {
            CallPolicy::Concurrent
        }
    }
}

/// Native library location.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LibraryConfig {
    /// Path to the shared library (e.g. librosu_ffi.so)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Default scoring arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DefaultsConfig {
    /// Game mode (osu, taiko, catch, mania)
    #[serde(default)]
    pub mode: GameMode,

    /// Mods text, in any form `calculate_score` accepts
    #[serde(default)]
    pub mods: String,

    /// Use lazer scoring
    #[serde(default)]
    pub lazer: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Osu,
            mods: String::new(),
            lazer: false,
        }
    }
}

/// Native call scheduling.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CallsConfig {
    /// Run one native call at a time, for libraries not known to be reentrant
    #[serde(default)]
    pub serialize: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PpbindConfig::default();
        assert!(config.library.path.is_none());
        assert_eq!(config.defaults.mode, GameMode::Osu);
        assert!(config.defaults.mods.is_empty());
        assert_eq!(config.call_policy(), CallPolicy::Concurrent);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[library]
path = "/opt/rosu/librosu_ffi.so"

[defaults]
mode = "taiko"
mods = "HDHR"
lazer = true

[calls]
serialize = true
"#;

        let config: PpbindConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.library.path.as_deref(),
            Some(Path::new("/opt/rosu/librosu_ffi.so"))
        );
        assert_eq!(config.defaults.mode, GameMode::Taiko);
        assert_eq!(config.defaults.mods, "HDHR");
        assert!(config.defaults.lazer);
        assert_eq!(config.call_policy(), CallPolicy::Serialized);
    }

    #[test]
    fn test_partial_config() {
        let config: PpbindConfig = toml::from_str("[defaults]\nmods = \"DT\"\n").unwrap();
        assert!(config.library.path.is_none());
        assert_eq!(config.defaults.mode, GameMode::Osu);
        assert_eq!(config.defaults.mods, "DT");
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let result: Result<PpbindConfig, _> = toml::from_str("[defaults]\nmode = \"drums\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_find() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("maps").join("ranked");
        std::fs::create_dir_all(&nested).unwrap();

        let mut config = PpbindConfig::default();
        config.library.path = Some(PathBuf::from("librosu_ffi.so"));
        config.defaults.mode = GameMode::Mania;
        config.save(&dir.path().join(CONFIG_FILE_NAME)).unwrap();

        let loaded = PpbindConfig::find_and_load(&nested).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = PpbindConfig::load(&dir.path().join(CONFIG_FILE_NAME));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
