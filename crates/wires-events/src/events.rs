//! The `Events` capability trait.

use crate::{Callback, Context, Emitter, EventNames, ListenerError};
use serde_json::Value;

/// Event capability for host types.
///
/// A type gains `on`/`once`/`off`/`trigger` and the `listen_to` family by
/// embedding an [`Emitter`] and returning it from [`emitter`](Events::emitter).
/// Every provided method delegates to that emitter and returns `&Self`, so
/// calls chain on the host type itself.
///
/// Listeners registered without a context are invoked on the embedded
/// emitter's context ([`Emitter::as_context`]).
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use wires_events::{Callback, Emitter, Events};
///
/// struct Model {
///     events: Emitter,
///     name: String,
/// }
///
/// impl Events for Model {
///     fn emitter(&self) -> &Emitter {
///         &self.events
///     }
/// }
///
/// let model = Model { events: Emitter::new(), name: "doc".into() };
/// model
///     .on("rename", Callback::new(|_, args| {
///         assert_eq!(args[0], json!("doc"));
///         Ok(())
///     }), None)
///     .trigger("rename", &[json!(model.name)])
///     .expect("listener succeeds");
/// ```
pub trait Events {
    /// The emitter backing this host.
    fn emitter(&self) -> &Emitter;

    /// See [`Emitter::on`].
    fn on(
        &self,
        names: impl Into<EventNames<Callback>>,
        callback: impl Into<Option<Callback>>,
        context: impl Into<Option<Context>>,
    ) -> &Self {
        self.emitter().on(names, callback, context);
        self
    }

    /// See [`Emitter::once`].
    fn once(
        &self,
        names: impl Into<EventNames<Callback>>,
        callback: impl Into<Option<Callback>>,
        context: impl Into<Option<Context>>,
    ) -> &Self {
        self.emitter().once(names, callback, context);
        self
    }

    /// See [`Emitter::off`].
    fn off(
        &self,
        names: impl Into<EventNames<Callback>>,
        callback: impl Into<Option<Callback>>,
        context: impl Into<Option<Context>>,
    ) -> &Self {
        self.emitter().off(names, callback, context);
        self
    }

    /// See [`Emitter::trigger`].
    ///
    /// # Errors
    ///
    /// Returns the first listener error, unchanged.
    fn trigger(
        &self,
        names: impl Into<EventNames<Value>>,
        args: &[Value],
    ) -> Result<&Self, ListenerError> {
        self.emitter().trigger(names, args)?;
        Ok(self)
    }

    /// See [`Emitter::listen_to`].
    fn listen_to<E: Events + ?Sized>(
        &self,
        other: &E,
        names: impl Into<EventNames<Callback>>,
        callback: impl Into<Option<Callback>>,
    ) -> &Self {
        self.emitter().listen_to(other.emitter(), names, callback);
        self
    }

    /// See [`Emitter::listen_to_once`].
    fn listen_to_once<E: Events + ?Sized>(
        &self,
        other: &E,
        names: impl Into<EventNames<Callback>>,
        callback: impl Into<Option<Callback>>,
    ) -> &Self {
        self.emitter().listen_to_once(other.emitter(), names, callback);
        self
    }

    /// See [`Emitter::stop_listening`].
    ///
    /// To target every remote, pass a typed `None` such as `None::<&Self>`.
    fn stop_listening<E: Events + ?Sized>(
        &self,
        other: Option<&E>,
        names: impl Into<EventNames<Callback>>,
        callback: impl Into<Option<Callback>>,
    ) -> &Self {
        self.emitter()
            .stop_listening(other.map(|o| o.emitter()), names, callback);
        self
    }
}

impl Events for Emitter {
    fn emitter(&self) -> &Emitter {
        self
    }
}
