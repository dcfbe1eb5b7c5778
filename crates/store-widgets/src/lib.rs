//! store-widgets: Headless widget models for the extension store panel.
//!
//! Each widget holds the state a toolkit would draw (labels, icons,
//! tooltips, stylesheets, sizes) and exposes its events as
//! [`store_signal::EventChannel`]s.
//!
//! - `ExtensionItem` - one row of the store list
//! - `ProgressButton` - install/uninstall/update button doubling as a progress bar
//! - `DescriptionView` - the description pane
//! - `style` - icons, colours and stylesheet rendering

pub mod description_view;
pub mod extension_item;
pub mod progress_button;
pub mod style;
pub mod types;

pub use description_view::{DescriptionView, SizePolicy};
pub use extension_item::{ExtensionItem, IconSource};
pub use progress_button::{ButtonAction, ProgressButton};
pub use style::IconSet;
pub use types::{Extension, InstallStatus, LocalRegistry, version_is_older};
