//! Listener trait, the shared [`Callback`] handle and testing utilities.

use crate::{Context, ListenerResult};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// A single event handler.
///
/// Invoked with the record's effective target (its context, or the host
/// it is registered on) and the event payload.
///
/// Closures of the shape `Fn(&Context, &[Value]) -> ListenerResult`
/// implement this trait automatically.
///
/// # Thread Safety
///
/// Listeners must be `Send + Sync`: hosts are shareable across threads
/// and a listener may be invoked from whichever thread calls `trigger`.
pub trait Listener: Send + Sync {
    /// Handles one event.
    ///
    /// Returning `Err` aborts the rest of the current dispatch and the
    /// error is returned from `trigger` unchanged.
    fn handle(&self, target: &Context, args: &[Value]) -> ListenerResult;
}

impl<F> Listener for F
where
    F: Fn(&Context, &[Value]) -> ListenerResult + Send + Sync,
{
    fn handle(&self, target: &Context, args: &[Value]) -> ListenerResult {
        self(target, args)
    }
}

/// Shared, identity-comparable handle to a [`Listener`].
///
/// Removal by callback (`off(name, callback)`) compares handles by
/// reference: clones of one `Callback` match each other, two callbacks
/// built from identical closures do not.
#[derive(Clone)]
pub struct Callback(Arc<dyn Listener>);

impl Callback {
    /// Wraps a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Context, &[Value]) -> ListenerResult + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invokes the listener.
    pub fn call(&self, target: &Context, args: &[Value]) -> ListenerResult {
        self.0.handle(target, args)
    }

    /// Returns `true` if both handles point at the same listener.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast::<()>()
    }
}

impl<L: Listener + 'static> From<Arc<L>> for Callback {
    fn from(listener: Arc<L>) -> Self {
        Self(listener)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", self.addr())
    }
}

/// Once-guard around a callback.
///
/// On first invocation it flips its guard, unregisters itself through
/// `unbind` (passing its own identity) and only then calls the wrapped
/// callback. Later invocations are no-ops.
pub(crate) struct Once {
    fired: AtomicBool,
    callback: Callback,
    unbind: Box<dyn Fn(&Callback) + Send + Sync>,
    this: Weak<Once>,
}

impl Once {
    /// Builds the wrapper. The returned handle is the identity `unbind`
    /// receives.
    pub(crate) fn wrap(
        callback: Callback,
        unbind: impl Fn(&Callback) + Send + Sync + 'static,
    ) -> Callback {
        let once = Arc::new_cyclic(|this| Once {
            fired: AtomicBool::new(false),
            callback,
            unbind: Box::new(unbind),
            this: this.clone(),
        });
        Callback(once)
    }
}

impl Listener for Once {
    fn handle(&self, target: &Context, args: &[Value]) -> ListenerResult {
        if self.fired.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if let Some(this) = self.this.upgrade() {
            (self.unbind)(&Callback(this));
        }
        self.callback.call(target, args)
    }
}

/// Test utilities for listeners.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// One recorded invocation.
    #[derive(Debug, Clone)]
    pub struct Call {
        /// The target the listener was invoked on.
        pub target: Context,
        /// The payload it received.
        pub args: Vec<Value>,
    }

    /// A recording listener for tests.
    ///
    /// Every [`callback`](MockListener::callback) handed out shares the
    /// same identity, so it can be used both to register and to remove.
    pub struct MockListener {
        calls: Mutex<Vec<Call>>,
        failure: Option<String>,
    }

    /// Error returned by a failing [`MockListener`].
    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    #[error("mock listener failed: {0}")]
    pub struct MockFailure(pub String);

    impl MockListener {
        /// Creates a listener that records calls and succeeds.
        #[must_use]
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                failure: None,
            })
        }

        /// Creates a listener that records calls and then fails with
        /// [`MockFailure`].
        #[must_use]
        pub fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                failure: Some(message.to_string()),
            })
        }

        /// Returns a callback handle for this listener.
        #[must_use]
        pub fn callback(self: &Arc<Self>) -> Callback {
            Callback::from(Arc::clone(self))
        }

        /// Returns all recorded calls.
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }

        /// Returns the number of recorded calls.
        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }

        /// Returns `true` if the listener has never been invoked.
        pub fn not_called(&self) -> bool {
            self.call_count() == 0
        }

        /// Returns the payload of the `index`-th call.
        pub fn args(&self, index: usize) -> Option<Vec<Value>> {
            self.calls.lock().get(index).map(|c| c.args.clone())
        }

        /// Returns `true` if any call received exactly `args`.
        pub fn called_with(&self, args: &[Value]) -> bool {
            self.calls.lock().iter().any(|c| c.args == args)
        }

        /// Returns `true` if every call was made on `target`.
        pub fn always_called_on(&self, target: &Context) -> bool {
            let calls = self.calls.lock();
            !calls.is_empty() && calls.iter().all(|c| &c.target == target)
        }
    }

    impl Listener for MockListener {
        fn handle(&self, target: &Context, args: &[Value]) -> ListenerResult {
            self.calls.lock().push(Call {
                target: target.clone(),
                args: args.to_vec(),
            });
            match &self.failure {
                Some(message) => Err(Box::new(MockFailure(message.clone()))),
                None => Ok(()),
            }
        }
    }
}
