//! Core types shared by the store widgets.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// An extension as listed in the store catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    /// Unique id, e.g. "author/extension-name"
    pub id: String,
    pub name: String,
    /// Version available in the store
    pub version: String,
    /// Description HTML shown in the description pane
    #[serde(default)]
    pub description: String,
    /// Remote icon, falls back to the default extension icon when absent
    #[serde(default)]
    pub icon_url: Option<String>,
    /// Files shipped by the extension, relative to its folder
    #[serde(default)]
    pub files: Vec<String>,
}

/// What the local machine knows about installed extensions.
pub trait LocalRegistry {
    /// Installed version, None when the extension is not installed.
    fn installed_version(&self, id: &str) -> Option<String>;

    /// Whether every file of an installed extension is present.
    fn files_intact(&self, id: &str) -> bool;

    fn is_installed(&self, id: &str) -> bool {
        self.installed_version(id).is_some()
    }
}

/// Install state of an extension as shown in the status column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InstallStatus {
    #[default]
    NotInstalled,
    Installed,
    UpdateAvailable,
    MissingFiles,
}

impl InstallStatus {
    /// Derive the status of `extension` from the local registry.
    pub fn resolve<R: LocalRegistry + ?Sized>(extension: &Extension, registry: &R) -> Self {
        let Some(installed) = registry.installed_version(&extension.id) else {
            return InstallStatus::NotInstalled;
        };

        if version_is_older(&installed, &extension.version) {
            InstallStatus::UpdateAvailable
        } else if !registry.files_intact(&extension.id) {
            InstallStatus::MissingFiles
        } else {
            InstallStatus::Installed
        }
    }

    pub fn is_installed(&self) -> bool {
        !matches!(self, InstallStatus::NotInstalled)
    }
}

impl std::fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            InstallStatus::NotInstalled => "not installed",
            InstallStatus::Installed => "installed",
            InstallStatus::UpdateAvailable => "update available",
            InstallStatus::MissingFiles => "missing files",
        };
        f.pad(text)
    }
}

/// Compare dotted versions ("1.2.10" > "1.2.9"). A leading "v" is ignored,
/// missing components count as 0 and a "-prerelease" suffix ranks below the
/// plain release ("1.0.0-rc.1" < "1.0.0"). Build metadata after "+" is
/// ignored.
pub fn version_is_older(current: &str, candidate: &str) -> bool {
    compare_versions(current, candidate) == Ordering::Less
}

fn compare_versions(a: &str, b: &str) -> Ordering {
    let (a_core, a_pre) = split_version(a);
    let (b_core, b_pre) = split_version(b);

    compare_components(a_core, b_core).then_with(|| match (a_pre, b_pre) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => compare_components(a, b),
    })
}

/// Dot-separated components, numeric where both sides parse, text otherwise.
fn compare_components(a: &str, b: &str) -> Ordering {
    let a: Vec<&str> = a.split('.').collect();
    let b: Vec<&str> = b.split('.').collect();

    for i in 0..a.len().max(b.len()) {
        let left = a.get(i).copied().unwrap_or("0");
        let right = b.get(i).copied().unwrap_or("0");

        let ordering = match (left.parse::<u64>(), right.parse::<u64>()) {
            (Ok(l), Ok(r)) => l.cmp(&r),
            _ => left.cmp(right),
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

/// Split into the numeric core and the optional prerelease tag.
fn split_version(version: &str) -> (&str, Option<&str>) {
    let trimmed = version.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    let trimmed = trimmed.split_once('+').map_or(trimmed, |(v, _)| v);

    match trimmed.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (trimmed, None),
    }
}
