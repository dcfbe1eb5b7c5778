//! EventChannel implementation
//!
//! Dispatch model:
//! - `emit` walks a snapshot of the subscriber list taken when it starts,
//!   so slots may subscribe/unsubscribe freely while a dispatch is running.
//!   Changes apply from the next `emit`.
//! - The first failing slot aborts the rest of the dispatch and its error
//!   is returned to the emitter as-is.
//! - Chained channels are always forwarded to, re-entrantly included.
//!   A channel nested more than `MAX_DISPATCH_DEPTH` times in its own
//!   dispatch fails with `SignalError::DepthExceeded` (A -> B -> A loops).
//! - Chained channels are held as `Weak`; a dropped one is skipped.

use crate::error::SignalError;
use crate::slot::{Context, Handler, Receiver, Slot, SlotResult};
use log::{debug, warn};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// How many `emit` calls on one channel may be nested.
pub const MAX_DISPATCH_DEPTH: usize = 64;

/// What a subscriber dispatches to once registered.
enum Target<A> {
    Handler(Handler<A>),
    Channel(Weak<Inner<A>>),
}

impl<A> Target<A> {
    fn matches(&self, slot: &Slot<A>) -> bool {
        match (self, slot) {
            (Target::Handler(a), Slot::Handler(b)) => a.ptr_eq(b),
            (Target::Channel(a), Slot::Channel(b)) => {
                std::ptr::eq(a.as_ptr(), Rc::as_ptr(&b.inner))
            }
            _ => false,
        }
    }
}

impl<A> From<Slot<A>> for Target<A> {
    fn from(slot: Slot<A>) -> Self {
        match slot {
            Slot::Handler(handler) => Target::Handler(handler),
            Slot::Channel(channel) => Target::Channel(Rc::downgrade(&channel.inner)),
        }
    }
}

impl<A> Clone for Target<A> {
    fn clone(&self) -> Self {
        match self {
            Target::Handler(h) => Target::Handler(h.clone()),
            Target::Channel(c) => Target::Channel(Weak::clone(c)),
        }
    }
}

/// A registered `(context, slot)` pair.
struct Subscriber<A> {
    context: Option<Context>,
    target: Target<A>,
}

impl<A> Clone for Subscriber<A> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            target: self.target.clone(),
        }
    }
}

struct Inner<A> {
    subscribers: RefCell<Vec<Subscriber<A>>>,
    suspended: Cell<bool>,
    /// Nesting depth of `emit` calls currently running on this channel.
    dispatching: Cell<usize>,
    /// Informational only, never checked against emitted values.
    type_tag: Option<&'static str>,
}

/// Decrements the dispatch depth when `emit` returns, including on error.
struct DispatchGuard<'a>(&'a Cell<usize>);

impl<'a> DispatchGuard<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// Synchronous signal with an ordered list of subscribers.
///
/// Cloning returns another handle to the same channel.
pub struct EventChannel<A> {
    inner: Rc<Inner<A>>,
}

impl<A> EventChannel<A> {
    /// Create an empty, active channel.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a channel carrying a descriptive type tag (shown in logs).
    pub fn with_type_tag(tag: &'static str) -> Self {
        Self::build(Some(tag))
    }

    fn build(type_tag: Option<&'static str>) -> Self {
        Self {
            inner: Rc::new(Inner {
                subscribers: RefCell::new(Vec::new()),
                suspended: Cell::new(false),
                dispatching: Cell::new(0),
                type_tag,
            }),
        }
    }

    pub fn type_tag(&self) -> Option<&'static str> {
        self.inner.type_tag
    }

    /// Connect a slot with no receiver context.
    pub fn subscribe(&self, slot: impl Into<Slot<A>>) {
        self.push(None, slot.into());
    }

    /// Connect a slot that is invoked with `context` as its receiver.
    pub fn subscribe_with(&self, context: Context, slot: impl Into<Slot<A>>) {
        self.push(Some(context), slot.into());
    }

    fn push(&self, context: Option<Context>, slot: Slot<A>) {
        self.inner
            .subscribers
            .borrow_mut()
            .push(Subscriber {
                context,
                target: slot.into(),
            });
    }

    /// Disconnect slots.
    ///
    /// `None` drops every subscriber. `Some(slot)` drops every entry that
    /// refers to that same slot; an unknown slot is ignored.
    /// Returns how many entries were removed.
    pub fn unsubscribe(&self, slot: Option<&Slot<A>>) -> usize {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        let before = subscribers.len();

        match slot {
            None => subscribers.clear(),
            Some(target) => subscribers.retain(|s| !s.target.matches(target)),
        }

        before - subscribers.len()
    }

    /// Dispatch `args` to every subscriber in subscription order.
    pub fn emit(&self, args: &A) -> SlotResult {
        if self.is_suspended() {
            return Ok(());
        }

        let snapshot: Vec<Subscriber<A>> = self.inner.subscribers.borrow().clone();
        if snapshot.is_empty() {
            return Ok(());
        }

        if self.inner.dispatching.get() >= MAX_DISPATCH_DEPTH {
            warn!("{} nested {} times, aborting", self, MAX_DISPATCH_DEPTH);
            return Err(SignalError::DepthExceeded {
                channel: self.to_string(),
                limit: MAX_DISPATCH_DEPTH,
            }
            .into());
        }

        debug!("{} emitting to {} subscriber(s)", self, snapshot.len());
        let _guard = DispatchGuard::enter(&self.inner.dispatching);

        for subscriber in &snapshot {
            match &subscriber.target {
                Target::Handler(handler) => {
                    handler.call(Receiver::new(subscriber.context.as_ref()), args)?;
                }
                Target::Channel(chained) => match chained.upgrade() {
                    Some(inner) => EventChannel { inner }.emit(args)?,
                    None => debug!("{} skipping dropped chained channel", self),
                },
            }
        }

        Ok(())
    }

    pub fn set_suspended(&self, suspended: bool) {
        self.inner.suspended.set(suspended);
    }

    pub fn is_suspended(&self) -> bool {
        self.inner.suspended.get()
    }

    /// True while an `emit` on this channel is on the stack.
    pub fn is_dispatching(&self) -> bool {
        self.inner.dispatching.get() > 0
    }

    pub fn len(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether both handles point at the same channel.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<A> Default for EventChannel<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for EventChannel<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> fmt::Display for EventChannel<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.type_tag {
            Some(tag) => write!(f, "EventChannel<{tag}>"),
            None => write!(f, "EventChannel"),
        }
    }
}

impl<A> fmt::Debug for EventChannel<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("type_tag", &self.inner.type_tag)
            .field("subscribers", &self.len())
            .field("suspended", &self.is_suspended())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::Handler;
    use std::fmt;

    type Log = Rc<RefCell<Vec<String>>>;

    fn new_log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn recorder(log: &Log, name: &'static str) -> Handler<i32> {
        let log = Rc::clone(log);
        Handler::from_fn(move |value: &i32| log.borrow_mut().push(format!("{name}:{value}")))
    }

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom")
        }
    }

    impl std::error::Error for Boom {}

    #[test]
    fn test_emit_in_subscription_order() {
        let log = new_log();
        let channel = EventChannel::new();
        channel.subscribe(recorder(&log, "a"));
        channel.subscribe(recorder(&log, "b"));
        channel.subscribe(recorder(&log, "c"));

        channel.emit(&1).unwrap();

        assert_eq!(*log.borrow(), vec!["a:1", "b:1", "c:1"]);
    }

    #[test]
    fn test_context_is_bound_receiver() {
        let seen = new_log();
        let seen_in = Rc::clone(&seen);
        let channel: EventChannel<i32> = EventChannel::new();

        let ctx: Context = Rc::new(String::from("description-view"));
        channel.subscribe_with(
            ctx,
            Handler::new(move |receiver, value: &i32| {
                let name = receiver.get::<String>().cloned().unwrap_or_default();
                seen_in.borrow_mut().push(format!("{name}:{value}"));
                Ok(())
            }),
        );

        let unbound = Rc::clone(&seen);
        channel.subscribe(Handler::new(move |receiver, _: &i32| {
            unbound
                .borrow_mut()
                .push(format!("bound={}", receiver.is_bound()));
            Ok(())
        }));

        channel.emit(&3).unwrap();

        assert_eq!(*seen.borrow(), vec!["description-view:3", "bound=false"]);
    }

    #[test]
    fn test_suspend_gates_emission() {
        let log = new_log();
        let channel = EventChannel::new();
        channel.subscribe(recorder(&log, "a"));

        channel.set_suspended(true);
        channel.emit(&1).unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(channel.len(), 1);

        channel.set_suspended(false);
        channel.emit(&2).unwrap();
        assert_eq!(*log.borrow(), vec!["a:2"]);
    }

    #[test]
    fn test_unsubscribe_all() {
        let log = new_log();
        let channel = EventChannel::new();
        for name in ["a", "b", "c", "d"] {
            channel.subscribe(recorder(&log, name));
        }

        assert_eq!(channel.unsubscribe(None), 4);
        channel.emit(&1).unwrap();

        assert!(log.borrow().is_empty());
        assert!(channel.is_empty());
    }

    #[test]
    fn test_unsubscribe_by_reference_removes_duplicates() {
        let log = new_log();
        let channel = EventChannel::new();
        let twice: Slot<i32> = recorder(&log, "twice").into();
        channel.subscribe(twice.clone());
        channel.subscribe(recorder(&log, "other"));
        channel.subscribe(twice.clone());

        assert_eq!(channel.unsubscribe(Some(&twice)), 2);
        channel.emit(&5).unwrap();

        assert_eq!(*log.borrow(), vec!["other:5"]);
    }

    #[test]
    fn test_unsubscribe_unknown_is_noop() {
        let log = new_log();
        let channel = EventChannel::new();
        channel.subscribe(recorder(&log, "a"));

        let stranger: Slot<i32> = recorder(&log, "a").into();
        assert_eq!(channel.unsubscribe(Some(&stranger)), 0);
        assert_eq!(channel.len(), 1);
    }

    #[test]
    fn test_chained_channel_forwards_args_and_contexts() {
        let seen = new_log();
        let upstream: EventChannel<(i32, i32)> = EventChannel::new();
        let downstream: EventChannel<(i32, i32)> = EventChannel::new();

        for name in ["first", "second"] {
            let seen_in = Rc::clone(&seen);
            let ctx: Context = Rc::new(name);
            downstream.subscribe_with(
                ctx,
                Handler::new(move |receiver, (x, y): &(i32, i32)| {
                    let name = receiver.get::<&str>().copied().unwrap_or("?");
                    seen_in.borrow_mut().push(format!("{name}:{x},{y}"));
                    Ok(())
                }),
            );
        }

        upstream.subscribe(&downstream);
        upstream.emit(&(1, 2)).unwrap();

        assert_eq!(*seen.borrow(), vec!["first:1,2", "second:1,2"]);
    }

    #[test]
    fn test_chained_channel_respects_its_own_suspend() {
        let log = new_log();
        let upstream = EventChannel::new();
        let downstream = EventChannel::new();
        downstream.subscribe(recorder(&log, "down"));
        upstream.subscribe(&downstream);
        upstream.subscribe(recorder(&log, "up"));

        downstream.set_suspended(true);
        upstream.emit(&4).unwrap();

        assert_eq!(*log.borrow(), vec!["up:4"]);
    }

    #[test]
    fn test_chain_cycle_fails_at_depth_limit() {
        let log = new_log();
        let a = EventChannel::new();
        let b = EventChannel::new();
        a.subscribe(recorder(&log, "a"));
        a.subscribe(&b);
        b.subscribe(recorder(&log, "b"));
        b.subscribe(&a);

        let err = a.emit(&9).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SignalError>(),
            Some(SignalError::DepthExceeded { limit: MAX_DISPATCH_DEPTH, .. })
        ));
        assert_eq!(log.borrow().len(), 2 * MAX_DISPATCH_DEPTH);
        assert_eq!(log.borrow()[..2], ["a:9", "b:9"]);
        assert!(!a.is_dispatching());
        assert!(!b.is_dispatching());
    }

    #[test]
    fn test_reentrant_chain_forwards_every_emit() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let a: EventChannel<i32> = EventChannel::new();
        let b: EventChannel<i32> = EventChannel::new();
        a.subscribe(&b);

        let seen_in = Rc::clone(&seen);
        let a_in = a.clone();
        b.subscribe(Handler::new(move |_, x: &i32| {
            seen_in.borrow_mut().push(*x);
            if *x < 3 {
                a_in.emit(&(x + 1))?;
            }
            Ok(())
        }));

        a.emit(&1).unwrap();

        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_dropped_chained_channel_is_skipped() {
        let log = new_log();
        let upstream = EventChannel::new();
        let downstream = EventChannel::new();
        downstream.subscribe(recorder(&log, "down"));
        upstream.subscribe(&downstream);
        upstream.subscribe(recorder(&log, "up"));

        drop(downstream);
        upstream.emit(&2).unwrap();

        assert_eq!(*log.borrow(), vec!["up:2"]);
    }

    #[test]
    fn test_chained_cycle_is_freed() {
        let a: EventChannel<i32> = EventChannel::new();
        let b: EventChannel<i32> = EventChannel::new();
        a.subscribe(&b);
        b.subscribe(&a);
        let (weak_a, weak_b) = (Rc::downgrade(&a.inner), Rc::downgrade(&b.inner));

        drop(a);
        drop(b);

        assert!(weak_a.upgrade().is_none());
        assert!(weak_b.upgrade().is_none());
    }

    #[test]
    fn test_unsubscribe_chained_channel() {
        let log = new_log();
        let upstream = EventChannel::new();
        let downstream = EventChannel::new();
        downstream.subscribe(recorder(&log, "down"));
        upstream.subscribe(&downstream);

        assert_eq!(upstream.unsubscribe(Some(&Slot::from(&downstream))), 1);
        upstream.emit(&1).unwrap();

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_error_aborts_remaining_dispatch() {
        let log = new_log();
        let channel = EventChannel::new();
        channel.subscribe(recorder(&log, "first"));
        channel.subscribe(Handler::new(|_, _: &i32| Err(Boom.into())));
        channel.subscribe(recorder(&log, "third"));

        let err = channel.emit(&1).unwrap_err();

        assert!(err.is::<Boom>());
        assert_eq!(*log.borrow(), vec!["first:1"]);
        assert!(!channel.is_dispatching());
    }

    #[test]
    fn test_error_from_chained_channel_surfaces() {
        let upstream = EventChannel::new();
        let downstream = EventChannel::new();
        downstream.subscribe(Handler::new(|_, _: &i32| Err("downstream failed".into())));
        upstream.subscribe(&downstream);

        let err = upstream.emit(&1).unwrap_err();
        assert_eq!(err.to_string(), "downstream failed");
    }

    #[test]
    fn test_emit_without_subscribers_is_noop() {
        let channel: EventChannel<i32> = EventChannel::new();
        assert!(channel.emit(&1).is_ok());
    }

    #[test]
    fn test_subscribe_during_emit_applies_next_time() {
        let log = new_log();
        let channel: EventChannel<i32> = EventChannel::new();

        let late = recorder(&log, "late");
        let channel_in = channel.clone();
        channel.subscribe(Handler::new(move |_, _: &i32| {
            channel_in.subscribe(late.clone());
            Ok(())
        }));

        channel.emit(&1).unwrap();
        assert!(log.borrow().is_empty());

        channel.emit(&2).unwrap();
        assert_eq!(*log.borrow(), vec!["late:2"]);
    }

    #[test]
    fn test_unsubscribe_during_emit_applies_next_time() {
        let log = new_log();
        let channel: EventChannel<i32> = EventChannel::new();
        let victim: Slot<i32> = recorder(&log, "victim").into();

        let channel_in = channel.clone();
        let victim_in = victim.clone();
        channel.subscribe(Handler::new(move |_, _: &i32| {
            channel_in.unsubscribe(Some(&victim_in));
            Ok(())
        }));
        channel.subscribe(victim);

        channel.emit(&1).unwrap();
        channel.emit(&2).unwrap();

        assert_eq!(*log.borrow(), vec!["victim:1"]);
    }

    #[test]
    fn test_type_tag_and_display() {
        let tagged: EventChannel<f64> = EventChannel::with_type_tag("f64");
        let plain: EventChannel<f64> = EventChannel::default();

        assert_eq!(tagged.type_tag(), Some("f64"));
        assert_eq!(tagged.to_string(), "EventChannel<f64>");
        assert_eq!(plain.to_string(), "EventChannel");
    }

    #[test]
    fn test_clone_shares_channel() {
        let log = new_log();
        let channel = EventChannel::new();
        let handle = channel.clone();
        handle.subscribe(recorder(&log, "a"));

        assert!(channel.ptr_eq(&handle));
        channel.emit(&1).unwrap();
        assert_eq!(*log.borrow(), vec!["a:1"]);
    }
}
