//! Store configuration, persisted as JSON under the XDG config directory.

use crate::error::StoreError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use store_widgets::style::DEFAULT_ACCENT;

const APP_DIR: &str = "extension-store";

/// User-tunable settings. Missing fields fall back to defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Accent colour of the action button
    pub accent_color: String,
    /// Screen DPI factor applied to widget sizes and fonts
    pub dpi_scale: f32,
    pub font_family: String,
    pub font_size: u32,
    /// Folder holding the status icons, relative `icons/` when unset
    pub icon_dir: Option<String>,
    /// Registry of installed extensions, `<config dir>/registry.json` when unset
    pub registry_path: Option<PathBuf>,
    /// Where extensions are installed, `<config dir>/extensions` when unset
    pub install_root: Option<PathBuf>,
    /// How often the UI drains the event bus
    pub poll_interval_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            accent_color: DEFAULT_ACCENT.to_string(),
            dpi_scale: 1.0,
            font_family: "Arial".to_string(),
            font_size: 12,
            icon_dir: None,
            registry_path: None,
            install_root: None,
            poll_interval_ms: 50,
        }
    }
}

impl StoreConfig {
    /// Load from config file, or return defaults if missing or invalid.
    pub fn load(path: &Path) -> Self {
        let Ok(contents) = fs::read_to_string(path) else {
            return Self::default();
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!("Invalid config {:?}: {}. Using defaults.", path, e);
            Self::default()
        })
    }

    /// Save to config file
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn registry_path(&self) -> PathBuf {
        self.registry_path
            .clone()
            .unwrap_or_else(|| config_dir().join("registry.json"))
    }

    pub fn install_root(&self) -> PathBuf {
        self.install_root
            .clone()
            .unwrap_or_else(|| config_dir().join("extensions"))
    }
}

/// `$XDG_CONFIG_HOME/extension-store`, falling back to `~/.config`.
pub fn config_dir() -> PathBuf {
    let xdg_config = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_default();
        format!("{}/.config", home)
    });

    PathBuf::from(xdg_config).join(APP_DIR)
}

/// Default location of the config file.
pub fn default_path() -> PathBuf {
    config_dir().join("config.json")
}
