//! Integration tests for on / once / off / trigger.

use serde_json::{json, Value};
use wires_events::testing::{MockFailure, MockListener};
use wires_events::{Callback, Context, Emitter, EventNames, ALL_EVENT};

fn args(values: &[&str]) -> Vec<Value> {
    values.iter().map(|v| json!(v)).collect()
}

// ── trigger ──────────────────────────────────────────────────

#[test]
fn trigger_returns_host() {
    let host = Emitter::new();
    let same = host.trigger(EventNames::Unnamed, &[]).expect("trigger");
    assert!(same.same(&host));
}

#[test]
fn trigger_fires_event() {
    let host = Emitter::new();
    let f = MockListener::new();
    host.on("myEvent", f.callback(), None);

    host.trigger("myEvent", &args(&["arg1", "arg2"])).expect("trigger");

    assert_eq!(f.call_count(), 1);
    assert!(f.called_with(&args(&["arg1", "arg2"])));
}

#[test]
fn trigger_space_separated_list() {
    let host = Emitter::new();
    let (f, g) = (MockListener::new(), MockListener::new());
    host.on("myEvent1", f.callback(), None)
        .on("myEvent2", g.callback(), None);

    host.trigger("myEvent1 myEvent2", &args(&["arg1", "arg2"]))
        .expect("trigger");

    assert!(f.called_with(&args(&["arg1", "arg2"])));
    assert!(g.called_with(&args(&["arg1", "arg2"])));
}

#[test]
fn trigger_event_map() {
    let host = Emitter::new();
    let (f, g) = (MockListener::new(), MockListener::new());
    host.on("myEvent1", f.callback(), None)
        .on("myEvent2", g.callback(), None);

    host.trigger(
        [("myEvent1", json!("arg1")), ("myEvent2", json!("arg2"))],
        &args(&["arg3", "arg4"]),
    )
    .expect("trigger");

    assert_eq!(f.call_count(), 1);
    assert!(f.called_with(&args(&["arg1", "arg3", "arg4"])));
    assert_eq!(g.call_count(), 1);
    assert!(g.called_with(&args(&["arg2", "arg3", "arg4"])));
}

#[test]
fn trigger_forwards_any_number_of_arguments() {
    for n in 0..10 {
        let host = Emitter::new();
        let f = MockListener::new();
        host.on("myEvent", f.callback(), None);

        let payload: Vec<Value> = (1..=n).map(|i| json!(format!("arg{i}"))).collect();
        host.trigger("myEvent", &payload).expect("trigger");

        assert_eq!(f.call_count(), 1, "with {n} arguments");
        assert_eq!(f.args(0), Some(payload), "with {n} arguments");
    }
}

#[test]
fn trigger_map_equals_repeated_triggers() {
    let record = |host: &Emitter| {
        let f = MockListener::new();
        host.on("a b", f.callback(), None);
        f
    };

    let mapped = Emitter::new();
    let f = record(&mapped);
    mapped
        .trigger([("a", json!(1)), ("b", json!(2))], &[json!("x")])
        .expect("trigger");

    let repeated = Emitter::new();
    let g = record(&repeated);
    repeated
        .trigger("a", &[json!(1), json!("x")])
        .expect("a")
        .trigger("b", &[json!(2), json!("x")])
        .expect("b");

    let f_args: Vec<_> = f.calls().into_iter().map(|c| c.args).collect();
    let g_args: Vec<_> = g.calls().into_iter().map(|c| c.args).collect();
    assert_eq!(f_args, g_args);
}

#[test]
fn trigger_surfaces_error_from_all_listener() {
    let host = Emitter::new();
    let named = MockListener::new();
    let (failing, later) = (MockListener::failing("all broke"), MockListener::new());
    host.on("myEvent", named.callback(), None)
        .on(ALL_EVENT, failing.callback(), None)
        .on(ALL_EVENT, later.callback(), None);

    let err = host
        .trigger("myEvent", &args(&["arg1"]))
        .expect_err("all listener fails");

    assert_eq!(
        err.downcast_ref::<MockFailure>(),
        Some(&MockFailure("all broke".into()))
    );
    assert_eq!(named.call_count(), 1);
    assert!(failing.called_with(&args(&["myEvent", "arg1"])));
    assert!(later.not_called());
}

#[test]
fn trigger_error_stops_remaining_names_of_list() {
    let host = Emitter::new();
    let (failing, b) = (MockListener::failing("a broke"), MockListener::new());
    host.on("a", failing.callback(), None)
        .on("b", b.callback(), None);

    let err = host.trigger("a b", &[]).expect_err("listener on a fails");

    assert!(err.downcast_ref::<MockFailure>().is_some());
    assert_eq!(failing.call_count(), 1);
    assert!(b.not_called());
}

#[test]
fn trigger_error_stops_remaining_entries_of_map() {
    let host = Emitter::new();
    let (failing, b) = (MockListener::failing("a broke"), MockListener::new());
    host.on("a", failing.callback(), None)
        .on("b", b.callback(), None);

    host.trigger([("a", json!(1)), ("b", json!(2))], &[])
        .expect_err("listener on a fails");

    assert!(b.not_called());
}

// ── on ───────────────────────────────────────────────────────

#[test]
fn on_returns_host() {
    let host = Emitter::new();
    assert!(host.on(EventNames::Unnamed, None, None).same(&host));
}

#[test]
fn on_fires_on_every_trigger() {
    let host = Emitter::new();
    let f = MockListener::new();
    host.on("myEvent", f.callback(), None);

    host.trigger("myEvent", &args(&["arg1", "arg2"])).expect("first");
    host.trigger("myEvent", &args(&["arg3", "arg4"])).expect("second");

    assert_eq!(f.call_count(), 2);
    assert!(f.called_with(&args(&["arg1", "arg2"])));
    assert!(f.called_with(&args(&["arg3", "arg4"])));
}

#[test]
fn on_defaults_target_to_host() {
    let host = Emitter::new();
    let f = MockListener::new();
    host.on("myEvent", f.callback(), None);
    host.trigger("myEvent", &[]).expect("trigger");
    assert!(f.always_called_on(&host.as_context()));
}

#[test]
fn on_uses_given_context() {
    let host = Emitter::new();
    let f = MockListener::new();
    let context = Context::new(());
    host.on("myEvent", f.callback(), context.clone());
    host.trigger("myEvent", &[]).expect("trigger");
    assert!(f.always_called_on(&context));
}

#[test]
fn on_space_separated_list() {
    let host = Emitter::new();
    let f = MockListener::new();
    let context = Context::new(());
    host.on("myEvent1 myEvent2", f.callback(), context.clone());

    host.trigger("myEvent1", &args(&["arg1", "arg2"])).expect("1");
    host.trigger("myEvent2", &args(&["arg3", "arg4"])).expect("2");

    assert_eq!(f.call_count(), 2);
    assert!(f.called_with(&args(&["arg1", "arg2"])));
    assert!(f.called_with(&args(&["arg3", "arg4"])));
    assert!(f.always_called_on(&context));
}

#[test]
fn on_event_map() {
    let host = Emitter::new();
    let (f, g) = (MockListener::new(), MockListener::new());
    let context = Context::new(());
    host.on(
        [("myEvent1", f.callback()), ("myEvent2", g.callback())],
        None,
        context.clone(),
    );

    host.trigger("myEvent1", &args(&["arg1", "arg2"])).expect("1");
    host.trigger("myEvent2", &args(&["arg3", "arg4"])).expect("2");

    assert_eq!(f.call_count(), 1);
    assert!(f.called_with(&args(&["arg1", "arg2"])));
    assert!(f.always_called_on(&context));
    assert_eq!(g.call_count(), 1);
    assert!(g.called_with(&args(&["arg3", "arg4"])));
    assert!(g.always_called_on(&context));
}

#[test]
fn on_all_receives_every_event() {
    let host = Emitter::new();
    let f = MockListener::new();
    host.on(ALL_EVENT, f.callback(), None);

    host.trigger("myEvent1", &args(&["arg1", "arg2"])).expect("1");
    host.trigger("myEvent2", &args(&["arg3", "arg4"])).expect("2");

    assert_eq!(f.call_count(), 2);
    assert!(f.called_with(&args(&["myEvent1", "arg1", "arg2"])));
    assert!(f.called_with(&args(&["myEvent2", "arg3", "arg4"])));
}

#[test]
fn on_list_equals_repeated_on() {
    let f = MockListener::new();
    let listed = Emitter::new();
    listed.on("a b", f.callback(), None);

    let repeated = Emitter::new();
    repeated.on("a", f.callback(), None).on("b", f.callback(), None);

    assert_eq!(listed.event_names(), repeated.event_names());
    assert_eq!(listed.total_listeners(), repeated.total_listeners());
}

// ── once ─────────────────────────────────────────────────────

#[test]
fn once_returns_host() {
    let host = Emitter::new();
    assert!(host.once(EventNames::Unnamed, None, None).same(&host));
}

#[test]
fn once_fires_only_once() {
    let host = Emitter::new();
    let f = MockListener::new();
    host.once("myEvent", f.callback(), None);

    host.trigger("myEvent", &args(&["arg1", "arg2"])).expect("1");
    host.trigger("myEvent", &args(&["arg3", "arg4"])).expect("2");

    assert_eq!(f.call_count(), 1);
    assert!(f.called_with(&args(&["arg1", "arg2"])));
    assert!(f.always_called_on(&host.as_context()));
}

#[test]
fn once_uses_given_context() {
    let host = Emitter::new();
    let f = MockListener::new();
    let context = Context::new(());
    host.once("myEvent", f.callback(), context.clone());

    host.trigger("myEvent", &[]).expect("1");
    host.trigger("myEvent", &[]).expect("2");

    assert_eq!(f.call_count(), 1);
    assert!(f.always_called_on(&context));
}

#[test]
fn once_space_separated_list_once_per_event() {
    let host = Emitter::new();
    let f = MockListener::new();
    let context = Context::new(());
    host.once("myEvent1 myEvent2", f.callback(), context.clone());

    host.trigger("myEvent1", &args(&["arg1", "arg2"])).expect("1");
    host.trigger("myEvent1", &args(&["arg3", "arg4"])).expect("2");
    host.trigger("myEvent2", &args(&["arg5", "arg6"])).expect("3");
    host.trigger("myEvent2", &args(&["arg7", "arg8"])).expect("4");

    assert_eq!(f.call_count(), 2);
    assert!(f.called_with(&args(&["arg1", "arg2"])));
    assert!(f.called_with(&args(&["arg5", "arg6"])));
    assert!(f.always_called_on(&context));
}

#[test]
fn once_event_map_once_per_event() {
    let host = Emitter::new();
    let (f, g) = (MockListener::new(), MockListener::new());
    let context = Context::new(());
    host.once(
        [("myEvent1", f.callback()), ("myEvent2", g.callback())],
        None,
        context.clone(),
    );

    host.trigger("myEvent1", &args(&["arg1", "arg2"])).expect("1");
    host.trigger("myEvent1", &args(&["arg3", "arg4"])).expect("2");
    host.trigger("myEvent2", &args(&["arg5", "arg6"])).expect("3");
    host.trigger("myEvent2", &args(&["arg7", "arg8"])).expect("4");

    assert_eq!(f.call_count(), 1);
    assert!(f.called_with(&args(&["arg1", "arg2"])));
    assert!(f.always_called_on(&context));
    assert_eq!(g.call_count(), 1);
    assert!(g.called_with(&args(&["arg5", "arg6"])));
    assert!(g.always_called_on(&context));
}

#[test]
fn once_all_fires_for_first_event() {
    let host = Emitter::new();
    let f = MockListener::new();
    host.once(ALL_EVENT, f.callback(), None);

    host.trigger("myEvent1", &args(&["arg1", "arg2"])).expect("1");
    host.trigger("myEvent2", &args(&["arg3", "arg4"])).expect("2");

    assert_eq!(f.call_count(), 1);
    assert!(f.called_with(&args(&["myEvent1", "arg1", "arg2"])));
}

// ── off ──────────────────────────────────────────────────────

#[test]
fn off_returns_host() {
    let host = Emitter::new();
    assert!(host.off(None, None, None).same(&host));
}

#[test]
fn off_without_arguments_removes_everything() {
    let host = Emitter::new();
    let (f, g) = (MockListener::new(), MockListener::new());
    host.on("myEvent1", f.callback(), Context::new(1))
        .on("myEvent2", g.callback(), Context::new(2));

    host.off(None, None, None);
    host.trigger("myEvent1", &[]).expect("1");
    host.trigger("myEvent2", &[]).expect("2");

    assert!(f.not_called());
    assert!(g.not_called());
}

/// One row of the removal matrix: which fields are passed to `off`
/// (1 = the registered one, 2 = a different one) and whether the
/// registration on `event1` should be gone afterwards.
struct OffCase {
    event: Option<u8>,
    callback: Option<u8>,
    context: Option<u8>,
    removed: bool,
}

const fn case(event: Option<u8>, callback: Option<u8>, context: Option<u8>, removed: bool) -> OffCase {
    OffCase {
        event,
        callback,
        context,
        removed,
    }
}

const OFF_CASES: &[OffCase] = &[
    case(Some(1), None, None, true),
    case(Some(2), None, None, false),
    case(None, Some(1), None, true),
    case(None, Some(2), None, false),
    case(None, None, Some(1), true),
    case(None, None, Some(2), false),
    case(None, Some(1), Some(1), true),
    case(None, Some(2), Some(1), false),
    case(None, Some(1), Some(2), false),
    case(Some(1), None, Some(1), true),
    case(Some(2), None, Some(1), false),
    case(Some(1), None, Some(2), false),
    case(Some(2), Some(1), None, false),
    case(Some(1), Some(2), None, false),
    case(Some(1), Some(1), Some(1), true),
    case(Some(2), Some(1), Some(1), false),
    case(Some(1), Some(2), Some(1), false),
    case(Some(1), Some(1), Some(2), false),
    case(Some(2), Some(2), Some(1), false),
    case(Some(2), Some(1), Some(2), false),
    case(Some(1), Some(2), Some(2), false),
];

struct OffFixture {
    host: Emitter,
    registered: std::sync::Arc<MockListener>,
    other: std::sync::Arc<MockListener>,
    context1: Context,
    context2: Context,
}

impl OffFixture {
    fn new() -> Self {
        let fixture = Self {
            host: Emitter::new(),
            registered: MockListener::new(),
            other: MockListener::new(),
            context1: Context::new("context1"),
            context2: Context::new("context2"),
        };
        fixture.host.on(
            "event1",
            fixture.registered.callback(),
            fixture.context1.clone(),
        );
        fixture
    }

    fn event(n: u8) -> String {
        format!("event{n}")
    }

    fn callback(&self, n: Option<u8>) -> Option<Callback> {
        n.map(|n| match n {
            1 => self.registered.callback(),
            _ => self.other.callback(),
        })
    }

    fn context(&self, n: Option<u8>) -> Option<Context> {
        n.map(|n| match n {
            1 => self.context1.clone(),
            _ => self.context2.clone(),
        })
    }

    fn assert_outcome(&self, c: &OffCase, form: &str) {
        self.host.trigger("event1", &[]).expect("trigger");
        assert_eq!(
            self.registered.not_called(),
            c.removed,
            "{form}: event={:?} callback={:?} context={:?}",
            c.event,
            c.callback,
            c.context
        );
    }
}

#[test]
fn off_matrix() {
    for c in OFF_CASES {
        let fx = OffFixture::new();
        let name = c.event.map(OffFixture::event);
        fx.host
            .off(name.as_deref(), fx.callback(c.callback), fx.context(c.context));
        fx.assert_outcome(c, "plain");
    }
}

#[test]
fn off_matrix_space_separated_list() {
    for c in OFF_CASES.iter().filter(|c| c.event.is_some()) {
        let fx = OffFixture::new();
        let name = format!("event3 {}", OffFixture::event(c.event.unwrap_or(1)));
        fx.host
            .off(name, fx.callback(c.callback), fx.context(c.context));
        fx.assert_outcome(c, "list");
    }
}

#[test]
fn off_matrix_event_map() {
    let cases = OFF_CASES
        .iter()
        .filter(|c| c.event.is_some() && c.callback.is_some());
    for c in cases {
        let fx = OffFixture::new();
        let name = OffFixture::event(c.event.unwrap_or(1));
        let callback = fx.callback(c.callback).expect("filtered on callback");
        fx.host
            .off(vec![(name, callback)], None, fx.context(c.context));
        fx.assert_outcome(c, "map");
    }
}

// ── scenarios ────────────────────────────────────────────────

#[test]
fn scenario_on_trigger_off_trigger() {
    let h = Emitter::new();
    let f = MockListener::new();

    h.on("x", f.callback(), None);
    h.trigger("x", &[json!(1), json!(2)]).expect("trigger");
    assert_eq!(f.call_count(), 1);
    assert!(f.called_with(&[json!(1), json!(2)]));

    h.off("x", f.callback(), None);
    h.trigger("x", &[]).expect("trigger");
    assert_eq!(f.call_count(), 1);
}

#[test]
fn scenario_once() {
    let h = Emitter::new();
    let f = MockListener::new();

    h.once("y", f.callback(), None);
    h.trigger("y", &[json!("a")]).expect("a");
    h.trigger("y", &[json!("b")]).expect("b");

    assert_eq!(f.call_count(), 1);
    assert_eq!(f.args(0), Some(vec![json!("a")]));
}

#[test]
fn scenario_all() {
    let h = Emitter::new();
    let f = MockListener::new();

    h.on(ALL_EVENT, f.callback(), None);
    h.trigger("q", &[json!(7)]).expect("trigger");

    assert_eq!(f.call_count(), 1);
    assert!(f.called_with(&[json!("q"), json!(7)]));
}
