//! Install service.
//!
//! Each operation runs on its own thread and reports progress through the
//! store event bus. Install and update copy the extension files from the
//! catalog source folder into `<install_root>/<id>/`; uninstall removes
//! that folder.

use crate::catalog;
use crate::error::StoreError;
use crate::panels::store::events::{self, StoreEvent};
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use store_widgets::{ButtonAction, Extension};
use tokio::sync::broadcast::Sender;

/// Spawns install/uninstall workers.
pub struct Installer {
    sender: Sender<StoreEvent>,
    install_root: PathBuf,
}

impl Installer {
    pub fn new(sender: Sender<StoreEvent>, install_root: &Path) -> Self {
        Self {
            sender,
            install_root: install_root.to_path_buf(),
        }
    }

    /// Run `action` for `extension` in a background thread.
    pub fn start(
        &self,
        extension: Extension,
        source_dir: PathBuf,
        action: ButtonAction,
    ) -> JoinHandle<()> {
        info!("Starting {} of {}", action, extension.id);

        let sender = self.sender.clone();
        let target_dir = self.install_root.join(&extension.id);

        thread::spawn(move || {
            let reporter = Reporter {
                sender: &sender,
                id: &extension.id,
                action,
            };

            let result = catalog::check_paths(&extension).and_then(|()| match action {
                ButtonAction::Install | ButtonAction::Update => {
                    copy_files(&extension, &source_dir, &target_dir, &reporter)
                }
                ButtonAction::Uninstall => remove_files(&extension, &target_dir, &reporter),
            });

            match result {
                Ok(()) => {
                    info!("{} of {} finished", action, extension.id);
                    events::send(
                        &sender,
                        StoreEvent::Finished {
                            id: extension.id.clone(),
                            action,
                        },
                    );
                }
                Err(e) => {
                    error!("{} of {} failed: {}", action, extension.id, e);
                    events::send(
                        &sender,
                        StoreEvent::Failed {
                            id: extension.id.clone(),
                            action,
                            message: e.to_string(),
                        },
                    );
                }
            }
        })
    }
}

struct Reporter<'a> {
    sender: &'a Sender<StoreEvent>,
    id: &'a str,
    action: ButtonAction,
}

impl Reporter<'_> {
    fn progress(&self, done: usize, total: usize) {
        let progress = if total == 0 {
            1.0
        } else {
            done as f64 / total as f64
        };

        events::send(
            self.sender,
            StoreEvent::Progress {
                id: self.id.to_string(),
                action: self.action,
                progress,
            },
        );
    }
}

fn copy_files(
    extension: &Extension,
    source_dir: &Path,
    target_dir: &Path,
    reporter: &Reporter<'_>,
) -> Result<(), StoreError> {
    let total = extension.files.len();
    reporter.progress(0, total);
    fs::create_dir_all(target_dir)?;

    for (i, file) in extension.files.iter().enumerate() {
        let from = source_dir.join(file);
        let to = target_dir.join(file);

        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&from, &to)?;

        reporter.progress(i + 1, total);
    }

    Ok(())
}

fn remove_files(
    extension: &Extension,
    target_dir: &Path,
    reporter: &Reporter<'_>,
) -> Result<(), StoreError> {
    let total = extension.files.len();
    reporter.progress(0, total);

    for (i, file) in extension.files.iter().enumerate() {
        match fs::remove_file(target_dir.join(file)) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        reporter.progress(i + 1, total);
    }

    if target_dir.exists() {
        fs::remove_dir_all(target_dir)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn extension(files: &[&str]) -> Extension {
        Extension {
            id: "me/tools".into(),
            name: "Tools".into(),
            version: "1.0.0".into(),
            files: files.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    fn collect(rx: &mut tokio::sync::broadcast::Receiver<StoreEvent>) -> Vec<StoreEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[test]
    fn test_install_copies_files_and_reports_progress() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        let source = root.join("source");
        fs::create_dir_all(source.join("lib")).unwrap();
        fs::write(source.join("tools.js"), "main").unwrap();
        fs::write(source.join("lib/util.js"), "util").unwrap();

        let (tx, mut rx) = events::channel();
        let installer = Installer::new(tx, &root.join("installed"));
        installer
            .start(
                extension(&["tools.js", "lib/util.js"]),
                source,
                ButtonAction::Install,
            )
            .join()
            .unwrap();

        let events = collect(&mut rx);
        let progress: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                StoreEvent::Progress { progress, .. } => Some(*progress),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![0.0, 0.5, 1.0]);
        assert_eq!(
            events.last(),
            Some(&StoreEvent::Finished {
                id: "me/tools".into(),
                action: ButtonAction::Install
            })
        );

        let installed = root.join("installed/me/tools");
        assert_eq!(fs::read_to_string(installed.join("lib/util.js")).unwrap(), "util");
    }

    #[test]
    fn test_install_missing_source_fails() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        let (tx, mut rx) = events::channel();
        let installer = Installer::new(tx, &root.join("installed"));

        installer
            .start(
                extension(&["nope.js"]),
                root.join("source"),
                ButtonAction::Update,
            )
            .join()
            .unwrap();

        let events = collect(&mut rx);
        assert!(matches!(
            events.last(),
            Some(StoreEvent::Failed {
                action: ButtonAction::Update,
                ..
            })
        ));
    }

    #[test]
    fn test_uninstall_removes_folder() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        let installed = root.join("installed/me/tools");
        fs::create_dir_all(&installed).unwrap();
        fs::write(installed.join("tools.js"), "main").unwrap();

        let (tx, mut rx) = events::channel();
        let installer = Installer::new(tx, &root.join("installed"));
        installer
            .start(
                extension(&["tools.js", "already-gone.js"]),
                root.join("source"),
                ButtonAction::Uninstall,
            )
            .join()
            .unwrap();

        assert!(!installed.exists());
        assert!(matches!(
            collect(&mut rx).last(),
            Some(StoreEvent::Finished { .. })
        ));
    }

    #[test]
    fn test_uninstall_refuses_paths_outside_install_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        let install_root = root.join("installed");
        let sibling = install_root.join("other/ext/keep.js");
        fs::create_dir_all(sibling.parent().unwrap()).unwrap();
        fs::write(&sibling, "keep").unwrap();
        let outside = root.join("outside.txt");
        fs::write(&outside, "keep").unwrap();

        let (tx, mut rx) = events::channel();
        let installer = Installer::new(tx, &install_root);
        let rogue = Extension {
            id: String::new(),
            files: vec![outside.to_string_lossy().into_owned()],
            ..extension(&[])
        };
        installer
            .start(rogue, root.join("source"), ButtonAction::Uninstall)
            .join()
            .unwrap();

        assert!(outside.exists());
        assert!(sibling.exists());
        assert!(matches!(
            collect(&mut rx).last(),
            Some(StoreEvent::Failed {
                action: ButtonAction::Uninstall,
                ..
            })
        ));
    }
}
