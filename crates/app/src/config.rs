use automaton_core::DEFAULT_PORT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Port offered in the port dialog; the last one that opened successfully.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Open the listener on startup.
    #[serde(default)]
    pub autostart: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            autostart: false,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub relay: RelayConfig,
    /// Overrides `~/.automaton/fxs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx_directory: Option<PathBuf>,
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("automaton").join("config.toml"))
    }

    /// Read the config at `path`, falling back to defaults on any problem.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), %err, "ignoring malformed config");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: Option<&Path>) {
        let Some(path) = path else {
            return;
        };

        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        match toml::to_string_pretty(self) {
            Ok(contents) => {
                if let Err(err) = fs::write(path, contents) {
                    tracing::warn!(path = %path.display(), %err, "failed to save config");
                }
            }
            Err(err) => tracing::warn!(%err, "failed to encode config"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let config = Config::load(Some(&dir.path().join("config.toml")));
        assert_eq!(config, Config::default());
        assert_eq!(config.relay.port, 17490);
        assert!(!config.relay.autostart);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[relay]\nautostart = true\n").expect("write");

        let config = Config::load(Some(&path));
        assert!(config.relay.autostart);
        assert_eq!(config.relay.port, DEFAULT_PORT);
        assert_eq!(config.fx_directory, None);
    }

    #[test]
    fn test_malformed_config_uses_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "relay = [").expect("write");

        assert_eq!(Config::load(Some(&path)), Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            relay: RelayConfig {
                port: 9000,
                autostart: true,
            },
            fx_directory: Some(PathBuf::from("/opt/fxs")),
        };

        config.save(Some(&path));

        assert_eq!(Config::load(Some(&path)), config);
    }
}
