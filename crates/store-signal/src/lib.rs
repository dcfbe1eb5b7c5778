//! store-signal - Qt-like signals for the extension store panel
//!
//! Features:
//! - Ordered, synchronous dispatch (subscription order)
//! - Optional receiver context bound to each subscriber
//! - Channels can be chained into other channels
//! - Suspend flag that gates emission without dropping subscribers
//! - Re-entrant emission bounded by `MAX_DISPATCH_DEPTH`
//!
//! Channels are single-threaded (`Rc` based). Cross-thread producers should
//! hand their events to the UI thread first and emit from there.

pub mod channel;
pub mod error;
pub mod slot;

pub use channel::{EventChannel, MAX_DISPATCH_DEPTH};
pub use error::SignalError;
pub use slot::{Context, Handler, Receiver, Slot, SlotError, SlotResult};
