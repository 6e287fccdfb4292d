//! The event host and its dispatch engine.
//!
//! An [`Emitter`] owns two lazily created structures:
//!
//! ```text
//! ┌──────────────────────────────┐     ┌──────────────────────────────┐
//! │ Emitter L (listener)         │     │ Emitter E (remote)           │
//! │                              │     │                              │
//! │  events:                     │     │  events:                     │
//! │    "change" → [r1, r2]       │     │    "save" → [{cb, ctx: L}]   │
//! │                              │     │                  ▲           │
//! │  listening_to:               │     │                  │ weak      │
//! │    l3 ⇢ E (weak) ────────────┼────►│                  │           │
//! └──────────────────────────────┘     └──────────────────┼───────────┘
//!                                                         │
//!                                       L.listen_to(E, "save", cb)
//! ```
//!
//! # Concurrency
//!
//! Each host serializes access to its state with one mutex. The mutex is
//! never held while a listener runs, so listeners may freely call back
//! into the host that is dispatching (`off` themselves, register more
//! listeners, trigger other events).

use crate::listener::Once;
use crate::names::{Normalized, ALL_EVENT};
use crate::table::{EventTable, ListenerRecord};
use crate::{Callback, Context, EmitterConfig, EventNames, ListenerError};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use tracing::{debug, trace, warn};

static NEXT_LISTEN_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity token of an emitter used as a remote by
/// [`Emitter::listen_to`].
///
/// Assigned on first use and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenId(u64);

impl ListenId {
    fn next() -> Self {
        Self(NEXT_LISTEN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ListenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}", self.0)
    }
}

#[derive(Default)]
struct State {
    /// Subscription table. `None` until the first registration and after
    /// a full reset.
    events: Option<EventTable>,
    /// Remotes this host listens to. `None` until the first `listen_to`
    /// and after a full `stop_listening`. Weak, so hosts listening to each
    /// other (or to themselves) are still freed when dropped.
    listening_to: Option<BTreeMap<ListenId, Weak<Inner>>>,
}

pub(crate) struct Inner {
    state: Mutex<State>,
    listen_id: OnceLock<ListenId>,
    config: EmitterConfig,
}

/// An event host.
///
/// Cloning an `Emitter` yields another handle to the same host; all
/// operations take `&self` and return `&Self` for chaining.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use wires_events::{Callback, Emitter};
///
/// let host = Emitter::new();
/// host.on("change", Callback::new(|_target, args| {
///     assert_eq!(args, &[json!(1)]);
///     Ok(())
/// }), None);
///
/// host.trigger("change", &[json!(1)]).expect("listener succeeds");
/// ```
#[derive(Clone)]
pub struct Emitter {
    inner: Arc<Inner>,
}

impl Emitter {
    /// Creates a host with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default())
    }

    /// Creates a host with the given configuration.
    #[must_use]
    pub fn with_config(config: EmitterConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                listen_id: OnceLock::new(),
                config,
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    pub(crate) fn addr(&self) -> *const () {
        Arc::as_ptr(&self.inner).cast::<()>()
    }

    /// Returns this host's configuration.
    #[must_use]
    pub fn config(&self) -> &EmitterConfig {
        &self.inner.config
    }

    /// Returns a context referring to this host.
    ///
    /// This is the target listeners registered without a context are
    /// invoked on, and the context [`listen_to`](Self::listen_to) registers
    /// with.
    #[must_use]
    pub fn as_context(&self) -> Context {
        Context::host(&self.inner)
    }

    /// Returns `true` if both handles refer to the same host.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns this host's remote identity token, assigning it on first use.
    pub fn listen_id(&self) -> ListenId {
        *self.inner.listen_id.get_or_init(ListenId::next)
    }

    // ── on / once ────────────────────────────────────────────

    /// Registers `callback` for `names`.
    ///
    /// The callback is invoked on `context`, or on this host when no
    /// context is given. A missing name or callback is silently ignored.
    ///
    /// With an event map, each entry's callback is registered under its
    /// name and `callback` is ignored.
    pub fn on(
        &self,
        names: impl Into<EventNames<Callback>>,
        callback: impl Into<Option<Callback>>,
        context: impl Into<Option<Context>>,
    ) -> &Self {
        let callback = callback.into();
        let context = context.into();

        match names.into().normalize() {
            Normalized::Unnamed => {}
            Normalized::Many(entries) => {
                for (name, value) in entries {
                    self.on(name, value.or_else(|| callback.clone()), context.clone());
                }
            }
            Normalized::Single(name) => {
                if let Some(callback) = callback {
                    self.register(name, ListenerRecord::new(callback, context));
                }
            }
        }
        self
    }

    /// Registers `callback` to run at most once for `names`.
    ///
    /// The record removes itself before the callback runs. It can also be
    /// removed early with `off(name, callback)` using the original
    /// callback.
    pub fn once(
        &self,
        names: impl Into<EventNames<Callback>>,
        callback: impl Into<Option<Callback>>,
        context: impl Into<Option<Context>>,
    ) -> &Self {
        let callback = callback.into();
        let context = context.into();

        match names.into().normalize() {
            Normalized::Unnamed => {}
            Normalized::Many(entries) => {
                for (name, value) in entries {
                    self.once(name, value.or_else(|| callback.clone()), context.clone());
                }
            }
            Normalized::Single(name) => {
                if let Some(callback) = callback {
                    let host = Arc::downgrade(&self.inner);
                    let event = name.clone();
                    let wrapper = Once::wrap(callback.clone(), move |me| {
                        if let Some(inner) = host.upgrade() {
                            Emitter::from_inner(inner).off(event.as_str(), me.clone(), None);
                        }
                    });
                    self.register(name, ListenerRecord::once(wrapper, callback, context));
                }
            }
        }
        self
    }

    fn register(&self, name: String, record: ListenerRecord) {
        let max = self.inner.config.max_listeners;
        let mut state = self.inner.state.lock();
        let table = state.events.get_or_insert_with(EventTable::default);
        let len = table.push(name.clone(), record);
        drop(state);

        if max > 0 && len == max + 1 {
            warn!(
                event = %name,
                listeners = len,
                max_listeners = max,
                "possible listener leak: event exceeds max_listeners"
            );
        }
    }

    // ── off ──────────────────────────────────────────────────

    /// Removes listeners.
    ///
    /// - nothing given: removes every listener of every event
    /// - names only: removes every listener of those events
    /// - callback and/or context given: removes the records (of the named
    ///   events, or of every event) matching all given fields; a callback
    ///   matches both a plain registration and a `once` registration of it
    ///
    /// Removing something that is not registered is not an error.
    pub fn off(
        &self,
        names: impl Into<EventNames<Callback>>,
        callback: impl Into<Option<Callback>>,
        context: impl Into<Option<Context>>,
    ) -> &Self {
        let callback = callback.into();
        let context = context.into();

        let name = match names.into().normalize() {
            Normalized::Many(entries) => {
                for (name, value) in entries {
                    self.off(name, value.or_else(|| callback.clone()), context.clone());
                }
                return self;
            }
            Normalized::Single(name) => Some(name),
            Normalized::Unnamed => None,
        };

        let mut state = self.inner.state.lock();
        let Some(table) = state.events.as_mut() else {
            return self;
        };

        match (name, &callback, &context) {
            (None, None, None) => {
                table.retire_all();
                state.events = None;
                debug!("removed all listeners");
            }
            (Some(name), None, None) => table.remove_event(&name),
            (name, callback, context) => {
                table.remove_matching(name.as_deref(), callback.as_ref(), context.as_ref());
            }
        }
        self
    }

    // ── trigger ──────────────────────────────────────────────

    /// Fires `names` with `args`.
    ///
    /// Listeners of the event run in registration order on their effective
    /// target, followed by the `"all"` listeners, which receive the event
    /// name prepended to `args`. Both lists are captured when dispatch
    /// starts: listeners added meanwhile wait for the next trigger, and
    /// listeners removed meanwhile are skipped.
    ///
    /// With an event map, each entry's value is prepended to `args` for
    /// that event.
    ///
    /// # Errors
    ///
    /// Returns the first error a listener returns, unchanged. Listeners
    /// after it are not invoked.
    pub fn trigger(
        &self,
        names: impl Into<EventNames<Value>>,
        args: &[Value],
    ) -> Result<&Self, ListenerError> {
        match names.into().normalize() {
            Normalized::Unnamed => {}
            Normalized::Many(entries) => {
                for (name, value) in entries {
                    let payload: Vec<Value> = value.into_iter().chain(args.iter().cloned()).collect();
                    self.trigger(name, &payload)?;
                }
            }
            Normalized::Single(name) => self.dispatch(&name, args)?,
        }
        Ok(self)
    }

    fn dispatch(&self, name: &str, args: &[Value]) -> Result<(), ListenerError> {
        let (listeners, all) = {
            let state = self.inner.state.lock();
            let Some(table) = state.events.as_ref() else {
                return Ok(());
            };
            (table.snapshot(name), table.snapshot(ALL_EVENT))
        };

        let count = listeners.as_ref().map_or(0, Vec::len);
        let all_count = all.as_ref().map_or(0, Vec::len);
        if self.inner.config.trace_dispatch {
            debug!(event = name, listeners = count, all_listeners = all_count, "trigger");
        } else {
            trace!(event = name, listeners = count, all_listeners = all_count, "trigger");
        }

        let target = self.as_context();
        if let Some(listeners) = listeners {
            self.invoke(name, &listeners, &target, args)?;
        }
        if let Some(all) = all {
            let payload: Vec<Value> = std::iter::once(Value::String(name.to_string()))
                .chain(args.iter().cloned())
                .collect();
            self.invoke(name, &all, &target, &payload)?;
        }
        Ok(())
    }

    fn invoke(
        &self,
        name: &str,
        records: &[Arc<ListenerRecord>],
        host: &Context,
        args: &[Value],
    ) -> Result<(), ListenerError> {
        for record in records {
            if !record.is_live() {
                continue;
            }
            let target = record.context.as_ref().unwrap_or(host);
            if let Err(err) = record.callback.call(target, args) {
                debug!(event = name, error = %err, "listener failed, aborting dispatch");
                return Err(err);
            }
        }
        Ok(())
    }

    // ── listen_to / stop_listening ──────────────────────────────

    /// Registers `callback` for `names` on `emitter`, with this host as
    /// context, and remembers `emitter` for [`stop_listening`](Self::stop_listening).
    ///
    /// With an event map the map supplies the callbacks; the context is
    /// still this host.
    pub fn listen_to(
        &self,
        emitter: &Emitter,
        names: impl Into<EventNames<Callback>>,
        callback: impl Into<Option<Callback>>,
    ) -> &Self {
        self.track(emitter);
        emitter.on(names, callback, self.as_context());
        self
    }

    /// Like [`listen_to`](Self::listen_to), but the callback runs at most
    /// once per event; it stops listening before it runs.
    pub fn listen_to_once(
        &self,
        emitter: &Emitter,
        names: impl Into<EventNames<Callback>>,
        callback: impl Into<Option<Callback>>,
    ) -> &Self {
        let callback = callback.into();

        match names.into().normalize() {
            Normalized::Unnamed => {}
            Normalized::Many(entries) => {
                for (name, value) in entries {
                    self.listen_to_once(emitter, name, value.or_else(|| callback.clone()));
                }
            }
            Normalized::Single(name) => {
                if let Some(callback) = callback {
                    let listener = Arc::downgrade(&self.inner);
                    let remote = Arc::downgrade(&emitter.inner);
                    let event = name.clone();
                    let wrapper = Once::wrap(callback.clone(), move |me| {
                        if let (Some(listener), Some(remote)) = (listener.upgrade(), remote.upgrade())
                        {
                            Emitter::from_inner(listener).stop_listening(
                                Some(&Emitter::from_inner(remote)),
                                event.as_str(),
                                me.clone(),
                            );
                        }
                    });

                    self.track(emitter);
                    emitter.register(
                        name,
                        ListenerRecord::once(wrapper, callback, Some(self.as_context())),
                    );
                }
            }
        }
        self
    }

    fn track(&self, emitter: &Emitter) {
        let id = emitter.listen_id();
        let mut state = self.inner.state.lock();
        state
            .listening_to
            .get_or_insert_with(BTreeMap::new)
            .insert(id, Arc::downgrade(&emitter.inner));
    }

    /// Removes this host's registrations on other hosts.
    ///
    /// Targets `emitter` if given, otherwise every remote this host listens
    /// to. On each target, removes the records registered with this host as
    /// context that match `names` and `callback`. A remote is forgotten once
    /// nothing was narrowed or this host has no registrations left on it.
    pub fn stop_listening(
        &self,
        emitter: Option<&Emitter>,
        names: impl Into<EventNames<Callback>>,
        callback: impl Into<Option<Callback>>,
    ) -> &Self {
        let names = names.into();
        let callback = callback.into();

        let remove_all = names.is_unnamed() && callback.is_none();
        let mut forget = Vec::new();

        let remotes: Vec<(ListenId, Emitter)> = {
            let state = self.inner.state.lock();
            let Some(index) = state.listening_to.as_ref() else {
                return self;
            };
            match emitter {
                Some(emitter) => vec![(emitter.listen_id(), emitter.clone())],
                None => index
                    .iter()
                    .filter_map(|(id, weak)| match weak.upgrade() {
                        Some(inner) => Some((*id, Emitter::from_inner(inner))),
                        None => {
                            forget.push(*id);
                            None
                        }
                    })
                    .collect(),
            }
        };

        let me = self.as_context();
        for (id, remote) in remotes {
            remote.off(names.clone(), callback.clone(), me.clone());
            if remove_all || !remote.has_context(&me) {
                forget.push(id);
            }
        }

        let mut state = self.inner.state.lock();
        if let Some(index) = state.listening_to.as_mut() {
            for id in &forget {
                index.remove(id);
            }
            if index.is_empty() {
                state.listening_to = None;
            }
        }
        if emitter.is_none() && remove_all {
            debug!(remotes = forget.len(), "stopped listening to all remotes");
        }
        self
    }

    // ── introspection ────────────────────────────────────────

    /// Returns the number of listeners registered for `name`.
    ///
    /// `"all"` listeners are only counted for the name `"all"`.
    pub fn listener_count(&self, name: &str) -> usize {
        let state = self.inner.state.lock();
        state.events.as_ref().map_or(0, |t| t.listener_count(name))
    }

    /// Returns the total number of registered listeners.
    pub fn total_listeners(&self) -> usize {
        let state = self.inner.state.lock();
        state.events.as_ref().map_or(0, EventTable::len)
    }

    /// Returns `true` if any listener is registered.
    pub fn has_listeners(&self) -> bool {
        let state = self.inner.state.lock();
        state.events.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// Returns the names of events with listeners, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let state = self.inner.state.lock();
        state.events.as_ref().map_or_else(Vec::new, EventTable::names)
    }

    /// Returns `true` if this host currently tracks `emitter` as a remote.
    pub fn is_listening_to(&self, emitter: &Emitter) -> bool {
        let Some(id) = emitter.inner.listen_id.get().copied() else {
            return false;
        };
        let state = self.inner.state.lock();
        state
            .listening_to
            .as_ref()
            .and_then(|index| index.get(&id))
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Returns the number of live remotes this host tracks.
    pub fn listening_to_count(&self) -> usize {
        let state = self.inner.state.lock();
        state.listening_to.as_ref().map_or(0, |index| {
            index.values().filter(|weak| weak.strong_count() > 0).count()
        })
    }

    fn has_context(&self, context: &Context) -> bool {
        let state = self.inner.state.lock();
        state.events.as_ref().is_some_and(|t| t.has_context(context))
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("addr", &self.addr())
            .field("listen_id", &self.inner.listen_id.get())
            .finish_non_exhaustive()
    }
}
