//! Slot types: handlers, receiver contexts and the `Slot` enum.

use crate::channel::EventChannel;
use std::any::Any;
use std::error::Error;
use std::fmt;
use std::rc::Rc;

/// Receiver object bound to a subscriber (the `this` of a slot).
pub type Context = Rc<dyn Any>;

/// Error raised by a slot. Passed through `emit` untouched.
pub type SlotError = Box<dyn Error>;

/// Result returned by every slot invocation.
pub type SlotResult = Result<(), SlotError>;

type HandlerFn<A> = dyn Fn(Receiver<'_>, &A) -> SlotResult;

/// The context a handler is invoked with.
///
/// Unbound for subscribers added without a context.
#[derive(Clone, Copy)]
pub struct Receiver<'a> {
    context: Option<&'a Context>,
}

impl<'a> Receiver<'a> {
    pub fn new(context: Option<&'a Context>) -> Self {
        Self { context }
    }

    /// Receiver with no bound context.
    pub fn unbound() -> Self {
        Self { context: None }
    }

    pub fn is_bound(&self) -> bool {
        self.context.is_some()
    }

    /// Raw bound context, if any.
    pub fn context(&self) -> Option<&'a Context> {
        self.context
    }

    /// Downcast the bound context to a concrete type.
    /// Returns None when unbound or when the type does not match.
    pub fn get<T: Any>(&self) -> Option<&'a T> {
        self.context.and_then(|ctx| ctx.downcast_ref::<T>())
    }
}

impl fmt::Debug for Receiver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// A callable slot. Cloning keeps the same identity, which is what
/// `EventChannel::unsubscribe` matches on.
pub struct Handler<A> {
    func: Rc<HandlerFn<A>>,
}

impl<A> Handler<A> {
    /// Handler that sees its receiver and may fail.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(Receiver<'_>, &A) -> SlotResult + 'static,
    {
        Self {
            func: Rc::new(func),
        }
    }

    /// Infallible handler that ignores its receiver.
    pub fn from_fn<F>(func: F) -> Self
    where
        F: Fn(&A) + 'static,
    {
        Self::new(move |_, args| {
            func(args);
            Ok(())
        })
    }

    /// Invoke the handler bound to `receiver`.
    #[inline]
    pub fn call(&self, receiver: Receiver<'_>, args: &A) -> SlotResult {
        (self.func)(receiver, args)
    }

    /// Reference equality (same underlying closure allocation).
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl<A> Clone for Handler<A> {
    fn clone(&self) -> Self {
        Self {
            func: Rc::clone(&self.func),
        }
    }
}

impl<A> fmt::Debug for Handler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.func) as *const ())
    }
}

/// Anything a channel can dispatch to.
pub enum Slot<A> {
    /// Plain callable.
    Handler(Handler<A>),
    /// Another channel; emission is forwarded to its own `emit`.
    /// Once subscribed it is held weakly, so chains (and cycles of chains)
    /// never keep a channel alive.
    Channel(EventChannel<A>),
}

impl<A> Slot<A> {
    /// Identity comparison used for unsubscribing.
    pub fn same_as(&self, other: &Slot<A>) -> bool {
        match (self, other) {
            (Slot::Handler(a), Slot::Handler(b)) => a.ptr_eq(b),
            (Slot::Channel(a), Slot::Channel(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl<A> Clone for Slot<A> {
    fn clone(&self) -> Self {
        match self {
            Slot::Handler(h) => Slot::Handler(h.clone()),
            Slot::Channel(c) => Slot::Channel(c.clone()),
        }
    }
}

impl<A> fmt::Debug for Slot<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Handler(h) => fmt::Debug::fmt(h, f),
            Slot::Channel(c) => write!(f, "Slot({c})"),
        }
    }
}

impl<A> From<Handler<A>> for Slot<A> {
    fn from(handler: Handler<A>) -> Self {
        Slot::Handler(handler)
    }
}

impl<A> From<&Handler<A>> for Slot<A> {
    fn from(handler: &Handler<A>) -> Self {
        Slot::Handler(handler.clone())
    }
}

impl<A> From<EventChannel<A>> for Slot<A> {
    fn from(channel: EventChannel<A>) -> Self {
        Slot::Channel(channel)
    }
}

impl<A> From<&EventChannel<A>> for Slot<A> {
    fn from(channel: &EventChannel<A>) -> Self {
        Slot::Channel(channel.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_receiver_downcast() {
        let ctx: Context = Rc::new(String::from("panel"));
        let receiver = Receiver::new(Some(&ctx));

        assert!(receiver.is_bound());
        assert_eq!(receiver.get::<String>().map(String::as_str), Some("panel"));
        assert!(receiver.get::<u32>().is_none());
        assert!(Receiver::unbound().get::<String>().is_none());
    }

    #[test]
    fn test_handler_identity_survives_clone() {
        let a: Handler<i32> = Handler::from_fn(|_| {});
        let b = a.clone();
        let c: Handler<i32> = Handler::from_fn(|_| {});

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert!(Slot::from(&a).same_as(&Slot::from(b)));
        assert!(!Slot::from(a).same_as(&Slot::from(c)));
    }

    #[test]
    fn test_handler_call_passes_args() {
        let seen = Rc::new(Cell::new(0));
        let seen_in = Rc::clone(&seen);
        let handler = Handler::new(move |_, value: &i32| {
            seen_in.set(*value);
            Ok(())
        });

        handler.call(Receiver::unbound(), &7).unwrap();
        assert_eq!(seen.get(), 7);
    }
}
