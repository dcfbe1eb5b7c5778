//! extension-store - Headless extension store panel
//!
//! Loads a store catalog, shows the state of every extension, then runs
//! the button action (install, update or uninstall) on one extension while
//! reporting progress.
//!
//! Usage: `extension-store <catalog.json> [extension-id]`

mod catalog;
mod config;
mod error;
mod event_bus;
mod panels;
mod registry;
mod services;

use catalog::Catalog;
use config::StoreConfig;
use log::{debug, info, warn};
use panels::store::{StorePanel, events};
use registry::JsonRegistry;
use std::cell::Cell;
use std::error::Error;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use store_signal::Handler;
use store_widgets::extension_item::STATUS_COLUMN;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(catalog_path) = args.next() else {
        eprintln!("Usage: extension-store <catalog.json> [extension-id]");
        return Ok(());
    };
    let target = args.next();

    let config_path = config::default_path();
    let config = StoreConfig::load(&config_path);
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Could not write default config {:?}: {}", config_path, e);
        }
    }
    info!("Using config {:?}", config_path);

    let catalog = Catalog::load(Path::new(&catalog_path))?;
    let registry = JsonRegistry::load(&config.registry_path(), &config.install_root())?;
    info!("Loaded {} extensions", catalog.extensions.len());

    let (tx, mut rx) = events::channel();
    let panel = StorePanel::new(catalog, registry, &config, tx);

    print_items(&panel);

    let Some(id) = target.or_else(|| panel.catalog().extensions.first().map(|e| e.id.clone()))
    else {
        println!("Catalog is empty.");
        return Ok(());
    };

    let done = Rc::new(Cell::new(false));

    let done_ok = Rc::clone(&done);
    panel
        .action_finished
        .subscribe(Handler::from_fn(move |id: &String| {
            info!("{} done", id);
            done_ok.set(true);
        }));

    let done_failed = Rc::clone(&done);
    panel
        .action_failed
        .subscribe(Handler::from_fn(move |(id, message): &(String, String)| {
            warn!("{} failed: {}", id, message);
            done_failed.set(true);
        }));

    panel
        .progress_changed
        .subscribe(Handler::from_fn(|progress: &f64| {
            info!("Progress {:.0}%", progress * 100.0);
        }));

    panel.select(&id)?;
    info!("Selected {}: {}", id, panel.button().text());
    debug!("Description: {}", panel.description().html());
    panel.click()?;

    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    loop {
        let busy = panel.is_busy();
        let handled = panel.pump(&mut rx)?;
        if done.get() || (!busy && handled == 0) {
            break;
        }
        std::thread::sleep(poll_interval);
    }

    panel.wait_for_jobs();
    print_items(&panel);

    Ok(())
}

fn print_items(panel: &StorePanel) {
    let selected = panel.selected();
    for item in panel.items().iter() {
        let marker = if selected.as_deref() == Some(item.extension_id()) {
            '*'
        } else {
            ' '
        };
        let tooltip = item
            .tooltip(STATUS_COLUMN)
            .map(|t| t.replace('\n', " "))
            .unwrap_or_default();
        println!(
            "{} {:<40} {:<18} {}",
            marker,
            item.label(),
            item.status(),
            tooltip
        );
    }
}
