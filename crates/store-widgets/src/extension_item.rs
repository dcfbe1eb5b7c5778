//! List item representing a single extension in the store list.
//!
//! Column 0 shows the extension name and its icon, column 1 shows the
//! install status icon with an explanatory tooltip.

use crate::style::IconSet;
use crate::types::{Extension, InstallStatus, LocalRegistry};
use log::debug;

pub const NAME_COLUMN: usize = 0;
pub const STATUS_COLUMN: usize = 1;
const COLUMN_COUNT: usize = 2;

/// Custom item type id, distinguishes store items from plain tree items.
pub const ITEM_TYPE: i32 = 1024;

const NEW_BADGE: &str = " ★new!";

/// Where an item icon comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IconSource {
    /// Bundled icon resource path.
    Local(String),
    /// Icon fetched from the web by the view layer.
    Remote(String),
}

/// A row of the store list.
#[derive(Clone, Debug)]
pub struct ExtensionItem {
    extension_id: String,
    status: InstallStatus,
    texts: [String; COLUMN_COUNT],
    icons: [Option<IconSource>; COLUMN_COUNT],
    tooltips: [Option<String>; COLUMN_COUNT],
}

impl ExtensionItem {
    /// Build the item for `extension` given what is installed locally and
    /// which extension ids are flagged as new since the last visit.
    pub fn new<R: LocalRegistry + ?Sized>(
        extension: &Extension,
        registry: &R,
        new_extensions: &[String],
        icons: &IconSet,
    ) -> Self {
        let mut label = extension.name.clone();
        if new_extensions.iter().any(|id| id == &extension.id) {
            label.push_str(NEW_BADGE);
        }

        let status = InstallStatus::resolve(extension, registry);
        let (status_icon, status_tooltip) = match status {
            InstallStatus::NotInstalled => (&icons.not_installed, None),
            InstallStatus::Installed => (
                &icons.installed,
                Some("Extension is installed correctly.".to_string()),
            ),
            InstallStatus::UpdateAvailable => {
                let installed = registry
                    .installed_version(&extension.id)
                    .unwrap_or_default();
                (
                    &icons.update,
                    Some(format!(
                        "Update available:\ncurrently installed version : v{installed}"
                    )),
                )
            }
            InstallStatus::MissingFiles => (
                &icons.error,
                Some("Some files from this extension are missing.".to_string()),
            ),
        };

        let name_icon = match &extension.icon_url {
            Some(url) if !url.is_empty() => {
                debug!(
                    "adding icon to extension {} from url : {}",
                    extension.name, url
                );
                IconSource::Remote(url.clone())
            }
            _ => IconSource::Local(icons.default_extension.clone()),
        };

        Self {
            extension_id: extension.id.clone(),
            status,
            texts: [label, String::new()],
            icons: [Some(name_icon), Some(IconSource::Local(status_icon.clone()))],
            tooltips: [None, status_tooltip],
        }
    }

    /// The extension id stored in the item's user data.
    pub fn extension_id(&self) -> &str {
        &self.extension_id
    }

    pub fn status(&self) -> InstallStatus {
        self.status
    }

    /// Label shown in the name column.
    pub fn label(&self) -> &str {
        &self.texts[NAME_COLUMN]
    }

    pub fn text(&self, column: usize) -> Option<&str> {
        self.texts.get(column).map(String::as_str)
    }

    pub fn icon(&self, column: usize) -> Option<&IconSource> {
        self.icons.get(column).and_then(Option::as_ref)
    }

    pub fn tooltip(&self, column: usize) -> Option<&str> {
        self.tooltips.get(column).and_then(|t| t.as_deref())
    }

    pub fn item_type(&self) -> i32 {
        ITEM_TYPE
    }
}
