//! Extension store panel.
//!
//! Owns the list items, the description pane and the action button, and
//! wires them together with signal channels:
//!
//! - `item_selected` -> description pane and button action
//! - `button.clicked` -> install service
//! - `progress_changed` -> button progress bar
//! - `action_finished` -> chained into `extension_changed` -> item refresh
//!
//! All channel dispatch happens on the UI thread, in `select`, `click` and
//! `pump`.

pub mod events;

use crate::catalog::Catalog;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::registry::JsonRegistry;
use crate::services::install::Installer;
use events::StoreEvent;
use log::{debug, error, warn};
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::thread::JoinHandle;
use store_signal::{Context, EventChannel, Handler};
use store_widgets::{
    ButtonAction, DescriptionView, Extension, ExtensionItem, IconSet, InstallStatus,
    ProgressButton,
};
use tokio::sync::broadcast::{Receiver, Sender};

pub struct StorePanel {
    catalog: Rc<Catalog>,
    registry: Rc<RefCell<JsonRegistry>>,
    items: Rc<RefCell<Vec<ExtensionItem>>>,
    description: Rc<RefCell<DescriptionView>>,
    button: Rc<RefCell<ProgressButton>>,
    selected: Rc<RefCell<Option<String>>>,
    jobs: Rc<RefCell<Vec<JoinHandle<()>>>>,
    /// Emitted with the extension the user picked in the list.
    pub item_selected: EventChannel<Extension>,
    /// Emitted with the progress of the selected extension's operation.
    pub progress_changed: EventChannel<f64>,
    /// Emitted with the id of an extension whose operation completed.
    pub action_finished: EventChannel<String>,
    /// Emitted with `(id, message)` when an operation failed.
    pub action_failed: EventChannel<(String, String)>,
    /// Emitted whenever an extension's local state changed.
    pub extension_changed: EventChannel<String>,
}

/// Button action offered for an extension in `status`.
fn action_for(status: InstallStatus) -> ButtonAction {
    match status {
        InstallStatus::NotInstalled | InstallStatus::MissingFiles => ButtonAction::Install,
        InstallStatus::UpdateAvailable => ButtonAction::Update,
        InstallStatus::Installed => ButtonAction::Uninstall,
    }
}

impl StorePanel {
    pub fn new(
        catalog: Catalog,
        registry: JsonRegistry,
        config: &StoreConfig,
        sender: Sender<StoreEvent>,
    ) -> Self {
        let icons = match &config.icon_dir {
            Some(dir) => IconSet::with_base(dir),
            None => IconSet::new(),
        };

        let items: Vec<ExtensionItem> = catalog
            .extensions
            .iter()
            .map(|ext| ExtensionItem::new(ext, &registry, &catalog.new_extensions, &icons))
            .collect();

        let installer = Rc::new(Installer::new(sender, registry.install_root()));

        let panel = Self {
            catalog: Rc::new(catalog),
            registry: Rc::new(RefCell::new(registry)),
            items: Rc::new(RefCell::new(items)),
            description: Rc::new(RefCell::new(DescriptionView::new(
                &config.font_family,
                config.font_size,
                config.dpi_scale,
            ))),
            button: Rc::new(RefCell::new(ProgressButton::new(
                &config.accent_color,
                config.dpi_scale,
            ))),
            selected: Rc::new(RefCell::new(None)),
            jobs: Rc::new(RefCell::new(Vec::new())),
            item_selected: EventChannel::with_type_tag("Extension"),
            progress_changed: EventChannel::with_type_tag("f64"),
            action_finished: EventChannel::with_type_tag("String"),
            action_failed: EventChannel::with_type_tag("(String, String)"),
            extension_changed: EventChannel::with_type_tag("String"),
        };

        panel.connect_selection();
        panel.connect_button(installer);
        panel.connect_refresh(icons);
        panel
    }

    /// Selection updates the description pane and the button action.
    fn connect_selection(&self) {
        let description: Context = self.description.clone();
        self.item_selected.subscribe_with(
            description,
            Handler::new(|receiver, extension: &Extension| {
                if let Some(view) = receiver.get::<RefCell<DescriptionView>>() {
                    view.borrow_mut().show_extension(extension);
                }
                Ok(())
            }),
        );

        let button: Context = self.button.clone();
        let registry = Rc::clone(&self.registry);
        self.item_selected.subscribe_with(
            button,
            Handler::new(move |receiver, extension: &Extension| {
                let status = InstallStatus::resolve(extension, &*registry.borrow());
                if let Some(button) = receiver.get::<RefCell<ProgressButton>>() {
                    button.borrow_mut().set_action(action_for(status));
                }
                Ok(())
            }),
        );

        let button: Context = self.button.clone();
        self.progress_changed.subscribe_with(
            button,
            Handler::new(|receiver, progress: &f64| {
                if let Some(button) = receiver.get::<RefCell<ProgressButton>>() {
                    button.borrow_mut().set_progress(*progress);
                }
                Ok(())
            }),
        );
    }

    /// Clicking the button starts the operation on the selected extension.
    fn connect_button(&self, installer: Rc<Installer>) {
        let catalog = Rc::clone(&self.catalog);
        let selected = Rc::clone(&self.selected);
        let jobs = Rc::clone(&self.jobs);

        self.button
            .borrow()
            .clicked
            .subscribe(Handler::new(move |_, action: &ButtonAction| {
                let id = selected
                    .borrow()
                    .clone()
                    .ok_or(StoreError::NothingSelected)?;
                let extension = catalog
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| StoreError::UnknownExtension(id.clone()))?;

                let handle = installer.start(extension, catalog.source_dir(&id), *action);
                jobs.borrow_mut().push(handle);
                Ok(())
            }));
    }

    /// Finished operations refresh the affected list item, and the button
    /// and description when it is the selected one.
    fn connect_refresh(&self, icons: IconSet) {
        self.action_finished.subscribe(&self.extension_changed);

        let catalog = Rc::clone(&self.catalog);
        let registry = Rc::clone(&self.registry);
        let items = Rc::clone(&self.items);
        let selected = Rc::clone(&self.selected);
        let item_selected = self.item_selected.clone();

        self.extension_changed
            .subscribe(Handler::new(move |_, id: &String| {
                let Some(extension) = catalog.get(id) else {
                    warn!("Refresh requested for unknown extension {}", id);
                    return Ok(());
                };

                let item = ExtensionItem::new(
                    extension,
                    &*registry.borrow(),
                    &catalog.new_extensions,
                    &icons,
                );
                debug!("Refreshing {} ({})", id, item.status());

                if let Some(slot) = items
                    .borrow_mut()
                    .iter_mut()
                    .find(|i| i.extension_id() == id)
                {
                    *slot = item;
                }

                let is_selected = selected.borrow().as_deref() == Some(id.as_str());
                if is_selected {
                    item_selected.emit(extension)?;
                }
                Ok(())
            }));
    }

    /// Select extension `id` in the list.
    pub fn select(&self, id: &str) -> Result<(), StoreError> {
        let extension = self
            .catalog
            .get(id)
            .ok_or_else(|| StoreError::UnknownExtension(id.to_string()))?;

        *self.selected.borrow_mut() = Some(id.to_string());
        self.item_selected.emit(extension).map_err(StoreError::slot)
    }

    /// Press the action button.
    pub fn click(&self) -> Result<(), StoreError> {
        // release the button before dispatch, slots may need it mutably
        let (clicked, action) = {
            let button = self.button.borrow();
            match button.action() {
                Some(action) if button.is_enabled() => (button.clicked.clone(), action),
                _ => return Ok(()),
            }
        };
        clicked.emit(&action).map_err(StoreError::slot)
    }

    /// Drain the event bus and dispatch to the panel channels.
    /// Returns how many events were handled.
    pub fn pump(&self, rx: &mut Receiver<StoreEvent>) -> Result<usize, StoreError> {
        let events = events::drain_latest(rx);

        for event in &events {
            let is_selected = self.selected.borrow().as_deref() == Some(event.id());

            match event {
                StoreEvent::Progress { progress, .. } => {
                    if is_selected {
                        self.progress_changed
                            .emit(progress)
                            .map_err(StoreError::slot)?;
                    }
                }
                StoreEvent::Finished { id, action } => {
                    self.record(id, *action)?;
                    if is_selected {
                        self.progress_changed.emit(&1.0).map_err(StoreError::slot)?;
                    }
                    self.action_finished.emit(id).map_err(StoreError::slot)?;
                }
                StoreEvent::Failed { id, message, .. } => {
                    error!("Operation on {} failed: {}", id, message);
                    if is_selected {
                        self.progress_changed
                            .emit(&-1.0)
                            .map_err(StoreError::slot)?;
                    }
                    self.action_failed
                        .emit(&(id.clone(), message.clone()))
                        .map_err(StoreError::slot)?;
                    // files may be half copied
                    self.extension_changed
                        .emit(id)
                        .map_err(StoreError::slot)?;
                }
            }
        }

        Ok(events.len())
    }

    fn record(&self, id: &str, action: ButtonAction) -> Result<(), StoreError> {
        let mut registry = self.registry.borrow_mut();
        match action {
            ButtonAction::Install | ButtonAction::Update => {
                let extension = self
                    .catalog
                    .get(id)
                    .ok_or_else(|| StoreError::UnknownExtension(id.to_string()))?;
                registry.record_install(extension);
            }
            ButtonAction::Uninstall => {
                registry.record_uninstall(id);
            }
        }
        registry.save()
    }

    /// Whether any background operation is still running.
    pub fn is_busy(&self) -> bool {
        self.jobs.borrow().iter().any(|job| !job.is_finished())
    }

    /// Wait for every background operation to end.
    pub fn wait_for_jobs(&self) {
        let jobs: Vec<JoinHandle<()>> = self.jobs.borrow_mut().drain(..).collect();
        for job in jobs {
            if job.join().is_err() {
                error!("Install worker panicked");
            }
        }
    }

    pub fn selected(&self) -> Option<String> {
        self.selected.borrow().clone()
    }

    pub fn items(&self) -> Ref<'_, Vec<ExtensionItem>> {
        self.items.borrow()
    }

    pub fn button(&self) -> Ref<'_, ProgressButton> {
        self.button.borrow()
    }

    pub fn description(&self) -> Ref<'_, DescriptionView> {
        self.description.borrow()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
