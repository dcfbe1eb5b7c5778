//! Store catalog: the extensions available for install.
//!
//! Catalog file layout:
//! ```json
//! { "extensions": [ { "id": "...", "name": "...", "version": "..." } ],
//!   "new_extensions": ["..."] }
//! ```
//! Extension sources live next to the catalog file, in a folder named
//! after the extension id.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use store_widgets::Extension;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub extensions: Vec<Extension>,
    /// Ids of extensions added since the last visit
    #[serde(default)]
    pub new_extensions: Vec<String>,
    #[serde(skip)]
    source_root: PathBuf,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path)?;
        let mut catalog: Catalog = serde_json::from_str(&contents)?;
        for extension in &catalog.extensions {
            check_paths(extension)?;
        }
        catalog.source_root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&Extension> {
        self.extensions.iter().find(|e| e.id == id)
    }

    /// Folder holding the files of extension `id`.
    pub fn source_dir(&self, id: &str) -> PathBuf {
        self.source_root.join(id)
    }
}

/// Reject ids and file entries that would resolve outside the extension
/// folder once joined: empty, absolute, or containing `.`/`..` segments.
pub fn check_paths(extension: &Extension) -> Result<(), StoreError> {
    let id = &extension.id;
    std::iter::once(id)
        .chain(&extension.files)
        .try_for_each(|path| {
            if is_plain_relative(path) {
                Ok(())
            } else {
                Err(StoreError::InvalidPath {
                    id: id.clone(),
                    path: path.clone(),
                })
            }
        })
}

fn is_plain_relative(path: &str) -> bool {
    let mut components = Path::new(path).components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}
