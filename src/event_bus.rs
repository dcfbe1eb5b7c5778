//! Event bus between background services and the UI thread.
//!
//! Design:
//! - Broadcast channel (tokio) - every receiver sees every event
//! - Services send from their own threads, never touch widgets
//! - The panel drains the bus on the UI thread and re-emits through
//!   its signal channels
//!
//! Panels define their own event enums (see `panels::store::events`).

/// Broadcast channel capacity.
/// Lagging receivers skip old events, the latest progress is what matters.
pub const CHANNEL_CAPACITY: usize = 64;
