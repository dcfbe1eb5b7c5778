//! Background services for the extension store.
//!
//! Services run off the UI thread and report through the store event bus.
//!
//! - `install` - install, update and uninstall extension files

pub mod install;
