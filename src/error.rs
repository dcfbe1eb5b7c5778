//! Error types for the extension store

use store_signal::SlotError;

/// Extension store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown extension: {0}")]
    UnknownExtension(String),

    #[error("Invalid path in extension {id}: {path:?}")]
    InvalidPath { id: String, path: String },

    #[error("No extension selected")]
    NothingSelected,

    #[error("Slot failed: {0}")]
    Slot(String),
}

impl StoreError {
    /// Wrap an error raised by a signal slot.
    pub fn slot(err: SlotError) -> Self {
        StoreError::Slot(err.to_string())
    }
}
