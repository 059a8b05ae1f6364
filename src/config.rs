//! Configuration loading and management

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

const APP_DIR: &str = "kb-layer-tray";
const CONFIG_FILE: &str = "config.json";
const STATE_FILE: &str = "state.json";
const LOG_FILE: &str = "kb-layer-tray.log";

const DEFAULT_MODS: &str = "ctrl-shift-win-alt";

/// Filesystem locations used by the app
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding `config.json` and user icons
    pub config_dir: PathBuf,

    /// Directory for the state snapshot and log file
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Locate the platform config and data directories
    pub fn discover() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);

        Self {
            config_dir,
            data_dir,
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    pub fn state_file(&self) -> PathBuf {
        self.data_dir.join(STATE_FILE)
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }

    /// Ensure config and data directories exist
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

/// One configured layer. Its position in `layers` is its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub key: String,
    pub mods: String,
    pub name: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_icon: Option<String>,
}

/// Whole configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub layers: Vec<LayerConfig>,

    #[serde(default)]
    pub info_mods: String,

    #[serde(default)]
    pub info_key: String,

    #[serde(default)]
    pub connect_mods: String,

    #[serde(default)]
    pub connect_key: String,

    #[serde(default = "default_disconnect_icon")]
    pub disconnect_icon: String,

    #[serde(default)]
    pub dark_mode: bool,
}

fn default_disconnect_icon() -> String {
    "disconnected".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layers: vec![LayerConfig {
                key: "1".to_string(),
                mods: DEFAULT_MODS.to_string(),
                name: "Gaming".to_string(),
                icon: "kb_light".to_string(),
                dark_icon: Some("kb_dark".to_string()),
            }],
            info_mods: DEFAULT_MODS.to_string(),
            info_key: "0".to_string(),
            connect_mods: DEFAULT_MODS.to_string(),
            connect_key: "9".to_string(),
            disconnect_icon: default_disconnect_icon(),
            dark_mode: false,
        }
    }
}

/// Startup-fatal configuration problems
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write default config {path}: {source}")]
    WriteDefault {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no layers defined in {0}")]
    NoLayers(PathBuf),
}

impl Config {
    /// Load the configuration, creating the default file if it is missing
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::write_default(path)?;
            info!(?path, "created default configuration");
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        let config: Config =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_owned(),
                source,
            })?;

        if config.layers.is_empty() {
            return Err(ConfigError::NoLayers(path.to_owned()));
        }

        Ok(config)
    }

    fn write_default(path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::WriteDefault {
            path: path.to_owned(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(&Config::default())
            .map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        std::fs::write(path, json).map_err(write_err)
    }
}

/// Open a file in the OS default handler without waiting for it
pub fn open_in_default_handler(path: &Path) -> io::Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut c = Command::new("open");
        c.arg(path);
        c
    };

    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]).arg(path);
        c
    };

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = {
        let mut c = Command::new("xdg-open");
        c.arg(path);
        c
    };

    command.spawn().map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_under_app_dir() {
        let paths = AppPaths::discover();
        assert!(paths.config_file().to_string_lossy().contains(APP_DIR));
        assert!(paths.state_file().ends_with("kb-layer-tray/state.json"));
        assert!(paths.log_file().starts_with(&paths.data_dir));
    }

    #[test]
    fn test_missing_file_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.json");

        let config = Config::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config, Config::default());
        assert_eq!(config.layers[0].name, "Gaming");
        assert_eq!(config.layers[0].mods, "ctrl-shift-win-alt");
    }

    #[test]
    fn test_parses_full_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "layers": [
                    {"key": "1", "mods": "ctrl-alt", "name": "Gaming", "icon": "kb_light", "dark_icon": "kb_dark"},
                    {"key": "2", "mods": "ctrl-alt", "name": "Office", "icon": "office.png"}
                ],
                "infoMods": "ctrl-alt", "infoKey": "0",
                "connectMods": "ctrl-alt", "connectKey": "9",
                "disconnectIcon": "disconnected_dark",
                "darkMode": true
            }"#,
        )
        .unwrap();

        let config = tokio_test::assert_ok!(Config::load_or_create(&path));
        assert_eq!(config.layers.len(), 2);
        assert_eq!(config.layers[1].dark_icon, None);
        assert_eq!(config.connect_key, "9");
        assert_eq!(config.disconnect_icon, "disconnected_dark");
        assert!(config.dark_mode);
    }

    #[test]
    fn test_optional_fields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"layers": [{"key": "1", "mods": "ctrl", "name": "A", "icon": "kb_light"}]}"#,
        )
        .unwrap();

        let config = Config::load_or_create(&path).unwrap();
        assert_eq!(config.info_key, "");
        assert_eq!(config.disconnect_icon, "disconnected");
        assert!(!config.dark_mode);
    }

    #[test]
    fn test_corrupt_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Config::load_or_create(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_zero_layers_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"layers": []}"#).unwrap();

        assert!(matches!(
            Config::load_or_create(&path),
            Err(ConfigError::NoLayers(_))
        ));
    }

    #[test]
    fn test_default_serializes_camel_case() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("\"infoMods\""));
        assert!(json.contains("\"disconnectIcon\""));
        assert!(json.contains("\"dark_icon\""));
    }
}
