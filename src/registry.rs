//! Local registry of installed extensions, stored as JSON.

use crate::error::StoreError;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use store_widgets::{Extension, LocalRegistry};

/// An extension installed on this machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalExtension {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub files: Vec<String>,
}

#[derive(Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    extensions: BTreeMap<String, LocalExtension>,
}

/// JSON-backed `LocalRegistry`. Files are checked under
/// `<install_root>/<id>/`.
#[derive(Debug)]
pub struct JsonRegistry {
    path: PathBuf,
    install_root: PathBuf,
    extensions: BTreeMap<String, LocalExtension>,
}

impl JsonRegistry {
    /// Load the registry, starting empty if the file does not exist yet.
    pub fn load(path: &Path, install_root: &Path) -> Result<Self, StoreError> {
        let extensions = if path.exists() {
            let contents = fs::read_to_string(path)?;
            serde_json::from_str::<RegistryFile>(&contents)?.extensions
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            install_root: install_root.to_path_buf(),
            extensions,
        })
    }

    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = RegistryFile {
            extensions: self.extensions.clone(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    pub fn install_dir(&self, id: &str) -> PathBuf {
        self.install_root.join(id)
    }

    /// Record `extension` as installed at its catalog version.
    pub fn record_install(&mut self, extension: &Extension) {
        info!("Registry: {} v{} installed", extension.id, extension.version);
        self.extensions.insert(
            extension.id.clone(),
            LocalExtension {
                id: extension.id.clone(),
                version: extension.version.clone(),
                files: extension.files.clone(),
            },
        );
    }

    pub fn record_uninstall(&mut self, id: &str) -> Option<LocalExtension> {
        info!("Registry: {} uninstalled", id);
        self.extensions.remove(id)
    }
}

impl LocalRegistry for JsonRegistry {
    fn installed_version(&self, id: &str) -> Option<String> {
        self.extensions.get(id).map(|e| e.version.clone())
    }

    fn files_intact(&self, id: &str) -> bool {
        let Some(local) = self.extensions.get(id) else {
            return false;
        };
        let dir = self.install_dir(id);
        local.files.iter().all(|file| dir.join(file).is_file())
    }
}
