//! Event notification for any object.
//!
//! This crate gives a type publish/subscribe semantics: callers register
//! interest in named events, producers announce events by name with
//! arbitrary JSON payload arguments, and listeners run synchronously in
//! registration order.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Events trait  (capability for host types)                   │
//! │    fn emitter(&self) -> &Emitter                             │
//! └──────────────────────────────┬──────────────────────────────┘
//!                                ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Emitter                                                     │
//! │  ├─ normalization : maps, "a b" lists, unnamed → single name │
//! │  ├─ on / once / off                                          │
//! │  ├─ trigger       : snapshot dispatch + "all" listeners      │
//! │  └─ listen_to / listen_to_once / stop_listening              │
//! └──────────────────────────────┬──────────────────────────────┘
//!                                ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  EventTable    : name → [ListenerRecord]   (lazy)            │
//! │  remote index  : ListenId → Emitter        (lazy)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Core Concepts
//!
//! ## Callbacks and contexts
//!
//! A [`Callback`] is a shared handle to a [`Listener`]; a [`Context`] is an
//! identity handle. Both compare by reference, which is what removal with
//! [`Emitter::off`] matches on. A listener is invoked on its context, or on
//! the host it was registered on when it has none.
//!
//! ## Event names
//!
//! Every operation accepts [`EventNames`]: a single name, several names
//! separated by whitespace (`"change blur"`), or an event map pairing each
//! name with its own callback (or, for `trigger`, its own leading payload
//! value). Listeners on [`ALL_EVENT`] receive every event with its name
//! prepended to the payload.
//!
//! ## Listening to other hosts
//!
//! [`Emitter::listen_to`] registers on another host with the listening
//! host as context and remembers the remote, so
//! [`Emitter::stop_listening`] can later remove exactly those
//! registrations.
//!
//! # Errors
//!
//! Malformed calls (no name, no callback) are silently ignored. The only
//! runtime failure is a listener returning `Err`: dispatch stops and
//! `trigger` returns that [`ListenerError`] unchanged.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use wires_events::{Callback, Emitter, ALL_EVENT};
//!
//! let model = Emitter::new();
//! let view = Emitter::new();
//!
//! let render = Callback::new(|target, args| {
//!     println!("{target:?} got {args:?}");
//!     Ok(())
//! });
//!
//! view.listen_to(&model, "change", render.clone());
//! model.on(ALL_EVENT, Callback::new(|_, args| {
//!     assert_eq!(args[0], json!("change"));
//!     Ok(())
//! }), None);
//!
//! model.trigger("change", &[json!({"title": "new"})]).expect("listeners succeed");
//!
//! view.stop_listening(None, None, None);
//! assert!(!view.is_listening_to(&model));
//! ```

mod config;
mod context;
mod emitter;
mod error;
mod events;
mod listener;
mod names;
mod table;

pub use config::{EmitterConfig, ENV_MAX_LISTENERS, ENV_TRACE_DISPATCH};
pub use context::Context;
pub use emitter::{Emitter, ListenId};
pub use error::{ConfigError, ListenerError, ListenerResult};
pub use events::Events;
pub use listener::{Callback, Listener};
pub use names::{EventNames, ALL_EVENT};

#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    //! Test utilities for the event system.
    //!
    //! Provides [`MockListener`] for use in tests.
    pub use crate::listener::testing::{Call, MockFailure, MockListener};
}
