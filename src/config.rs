//! Toolchain configuration, persisted as TOML.
//!
//! The default location is `$XDG_CONFIG_HOME/ontc/config.toml`, falling back
//! to `~/.config/ontc/config.toml`. A missing file means all defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Settings shared by the interpreter and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Name of the function execution starts from.
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
    /// Maximum nesting of predecessor calls before execution aborts.
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
    /// Line written when `printsATestMessageWhenCalled` holds for a function.
    #[serde(default = "default_test_message")]
    pub test_message: String,
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Print recoverable notices to stderr after a run.
    #[serde(default = "default_echo_notices")]
    pub echo_notices: bool,
}

fn default_entry_point() -> String {
    "main".into()
}
fn default_max_call_depth() -> usize {
    256
}
fn default_test_message() -> String {
    "OXPL rocks!".into()
}
fn default_log_filter() -> String {
    "warn".into()
}
fn default_echo_notices() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entry_point: default_entry_point(),
            max_call_depth: default_max_call_depth(),
            test_message: default_test_message(),
            log_filter: default_log_filter(),
            echo_notices: default_echo_notices(),
        }
    }
}

impl Config {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Load from `path` if given, else from the default location if it exists,
    /// else return defaults.
    pub fn discover(path: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match default_path() {
            Ok(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// `$XDG_CONFIG_HOME/ontc/config.toml`, or `~/.config/ontc/config.toml`.
pub fn default_path() -> ConfigResult<PathBuf> {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".config"))
            .map_err(|_| ConfigError::NoConfigDir)?,
    };
    Ok(base.join("ontc").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.entry_point, "main");
        assert_eq!(config.max_call_depth, 256);
        assert_eq!(config.test_message, "OXPL rocks!");
        assert!(config.echo_notices);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = toml::from_str("entry_point = \"start\"").unwrap();
        assert_eq!(config.entry_point, "start");
        assert_eq!(config.max_call_depth, 256);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");
        let config = Config {
            max_call_depth: 8,
            ..Config::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_call_depth = \"lots\"").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn explicit_missing_path_is_a_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            Config::discover(Some(path.as_path())),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn default_path_ends_in_ontc_dir() {
        if let Ok(path) = default_path() {
            assert!(path.ends_with("ontc/config.toml"));
        }
    }
}
