//! Store event definitions and broadcast event bus.
//!
//! Uses tokio::sync::broadcast so every panel receiver sees every event.
//! Background services only ever send; widgets are updated by the panel
//! after draining on the UI thread.

use crate::event_bus::CHANNEL_CAPACITY;
use std::collections::HashSet;
use store_widgets::ButtonAction;
use tokio::sync::broadcast::{self, Receiver, Sender};

/// Events reported by the install service.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreEvent {
    /// Operation on `id` advanced, `progress` in `0.0..=1.0`.
    Progress {
        id: String,
        action: ButtonAction,
        progress: f64,
    },
    /// Operation on `id` completed successfully.
    Finished { id: String, action: ButtonAction },
    /// Operation on `id` failed.
    Failed {
        id: String,
        action: ButtonAction,
        message: String,
    },
}

impl StoreEvent {
    pub fn id(&self) -> &str {
        match self {
            StoreEvent::Progress { id, .. }
            | StoreEvent::Finished { id, .. }
            | StoreEvent::Failed { id, .. } => id,
        }
    }
}

/// Create a new store event bus.
pub fn channel() -> (Sender<StoreEvent>, Receiver<StoreEvent>) {
    broadcast::channel(CHANNEL_CAPACITY)
}

/// Send an event. Non-blocking.
/// If no receivers, the event is dropped (expected during shutdown).
#[inline]
pub fn send(sender: &Sender<StoreEvent>, event: StoreEvent) {
    let _ = sender.send(event);
}

/// Drain all pending events from a receiver, keeping only the latest
/// progress per extension. Finished/Failed events are always kept.
/// Handles RecvError::Lagged by continuing to drain.
pub fn drain_latest(rx: &mut Receiver<StoreEvent>) -> Vec<StoreEvent> {
    let mut events = Vec::with_capacity(8);

    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Empty) => break,
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue, // Skip old, keep draining
            Err(broadcast::error::TryRecvError::Closed) => break,
        }
    }

    if events.len() <= 1 {
        return events;
    }

    let mut seen_progress: HashSet<String> = HashSet::new();
    let mut result = Vec::with_capacity(events.len());

    for event in events.into_iter().rev() {
        match &event {
            StoreEvent::Progress { id, .. } => {
                if seen_progress.insert(id.clone()) {
                    result.push(event);
                }
            }
            _ => result.push(event),
        }
    }

    result.reverse();
    result
}
