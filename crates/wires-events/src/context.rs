//! Listener context: the identity a listener is registered with and
//! the target it is invoked on.

use crate::emitter::{Emitter, Inner};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

/// Identity handle used as a listener's context.
///
/// Equality is reference equality: two contexts are equal only when they
/// were cloned from the same handle. Wrapping equal values twice yields two
/// distinct contexts.
///
/// A context either wraps an arbitrary shared value ([`Context::new`]) or
/// refers to an event host ([`Emitter::as_context`]). Host contexts hold a
/// weak reference, so a registration on a remote emitter never keeps the
/// listening host alive.
///
/// # Example
///
/// ```
/// use wires_events::Context;
///
/// let a = Context::new("view");
/// let b = a.clone();
/// let c = Context::new("view");
///
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// assert_eq!(a.downcast_ref::<&str>(), Some(&"view"));
/// ```
#[derive(Clone)]
pub struct Context {
    repr: Repr,
}

#[derive(Clone)]
enum Repr {
    Host(Weak<Inner>),
    Object(Arc<dyn Any + Send + Sync>),
}

impl Context {
    /// Wraps `value` in a fresh context identity.
    #[must_use]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Uses an existing shared value as the context identity.
    ///
    /// Clones of the same `Arc` produce equal contexts.
    #[must_use]
    pub fn from_arc(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            repr: Repr::Object(value),
        }
    }

    pub(crate) fn host(inner: &Arc<Inner>) -> Self {
        Self {
            repr: Repr::Host(Arc::downgrade(inner)),
        }
    }

    /// Returns the wrapped value if this is an object context of type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match &self.repr {
            Repr::Object(value) => value.downcast_ref::<T>(),
            Repr::Host(_) => None,
        }
    }

    /// Returns the host this context refers to, if it is a host context
    /// and the host is still alive.
    #[must_use]
    pub fn emitter(&self) -> Option<Emitter> {
        match &self.repr {
            Repr::Host(weak) => weak.upgrade().map(Emitter::from_inner),
            Repr::Object(_) => None,
        }
    }

    /// Returns `true` if this context refers to `emitter`.
    #[must_use]
    pub fn is_emitter(&self, emitter: &Emitter) -> bool {
        matches!(self.repr, Repr::Host(_)) && self.addr() == emitter.addr()
    }

    fn addr(&self) -> *const () {
        match &self.repr {
            Repr::Host(weak) => weak.as_ptr().cast::<()>(),
            Repr::Object(value) => Arc::as_ptr(value).cast::<()>(),
        }
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Host(_) => write!(f, "Context::Host({:p})", self.addr()),
            Repr::Object(_) => write!(f, "Context::Object({:p})", self.addr()),
        }
    }
}

impl From<&Emitter> for Context {
    fn from(emitter: &Emitter) -> Self {
        emitter.as_context()
    }
}
