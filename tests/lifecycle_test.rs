mod common;

use common::{capture, record, Seen};
use mountbus::{
    Config, EmitError, EmitEvent, Emitter, Handler, HandlerResult, LifecyclePhase, PhaseOrder,
    PhaseScope,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn fresh() -> Emitter {
    common::init_tracing();
    Emitter::new(Config::default())
}

#[test]
fn test_repeated_did_mount_is_stable() {
    let bus = fresh();
    let mounts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&mounts);
    bus.on_phase(
        LifecyclePhase::DidMount,
        "count",
        Handler::fire(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }),
    );

    let seen = Seen::new();
    bus.on("x", record(&seen));
    bus.emit("x", EmitEvent::new(json!(1))).unwrap();

    bus.will_mount().unwrap();
    bus.did_mount().unwrap();
    bus.did_mount().unwrap();

    assert_eq!(bus.phase(), LifecyclePhase::DidMount);
    assert_eq!(mounts.load(Ordering::SeqCst), 2);
    assert_eq!(seen.len(), 1);
}

#[test]
fn test_transitions_are_unordered() {
    let bus = fresh();
    let seen = Seen::new();
    bus.on("x", record(&seen));

    bus.did_unmount().unwrap();
    assert_eq!(bus.phase(), LifecyclePhase::DidUnmount);
    bus.emit("x", EmitEvent::new(json!("unmounted"))).unwrap();
    assert_eq!(seen.all(), vec![json!("unmounted")]);

    // Going back to WillMount re-enables buffering.
    bus.will_mount().unwrap();
    bus.emit("x", EmitEvent::new(json!("buffered"))).unwrap();
    assert_eq!(seen.len(), 1);

    bus.did_mount().unwrap();
    bus.will_unmount().unwrap();
    assert_eq!(seen.all(), vec![json!("unmounted"), json!("buffered")]);
    assert_eq!(bus.phase(), LifecyclePhase::WillUnmount);
}

#[test]
fn test_unknown_transition_is_ignored() {
    let bus = fresh();
    bus.did_mount().unwrap();

    assert_eq!(bus.enter(LifecyclePhase::Unknown), Ok(()));
    assert_eq!(bus.phase(), LifecyclePhase::DidMount);
    assert!(!bus.on_phase(LifecyclePhase::Unknown, "x", Handler::fire(|_| Ok(None))));
}

#[test]
fn test_each_phase_runs_its_own_hook() {
    let bus = fresh();
    let hits: Seen<&'static str> = Seen::new();
    for phase in [
        LifecyclePhase::WillMount,
        LifecyclePhase::DidMount,
        LifecyclePhase::WillUnmount,
        LifecyclePhase::DidUnmount,
    ] {
        let hits = hits.clone();
        bus.on_phase(
            phase,
            "trace",
            Handler::fire(move |_| {
                hits.push(phase.as_label());
                Ok(None)
            }),
        );
    }

    bus.will_mount().unwrap();
    bus.did_mount().unwrap();
    bus.will_unmount().unwrap();
    bus.did_unmount().unwrap();

    assert_eq!(
        hits.all(),
        vec![
            LifecyclePhase::WillMount.as_label(),
            LifecyclePhase::DidMount.as_label(),
            LifecyclePhase::WillUnmount.as_label(),
            LifecyclePhase::DidUnmount.as_label(),
        ]
    );
}

#[test]
fn test_enter_with_callback_and_args() {
    let bus = fresh();
    let args: Seen<Value> = Seen::new();
    bus.on_phase(LifecyclePhase::WillUnmount, "args", Handler::fire(record(&args)));
    bus.on_phase(
        LifecyclePhase::DidUnmount,
        "ready",
        Handler::fire(|_| Err(EmitError::handler("still busy"))),
    );

    bus.enter_with(LifecyclePhase::WillUnmount, None, vec![json!(1), json!("a")])
        .unwrap();
    assert_eq!(args.all(), vec![json!([1, "a"])]);

    let outcomes: Seen<HandlerResult> = Seen::new();
    bus.enter_with(LifecyclePhase::DidUnmount, Some(capture(&outcomes)), Vec::new())
        .unwrap();
    assert_eq!(outcomes.all(), vec![Err(EmitError::handler("still busy"))]);

    // Without a callback the same failure reaches the caller.
    assert_eq!(bus.did_unmount(), Err(EmitError::handler("still busy")));
    assert_eq!(bus.phase(), LifecyclePhase::DidUnmount);
}

#[tokio::test]
async fn test_enter_async_awaits_async_hook() {
    let bus = fresh();
    bus.on_phase(
        LifecyclePhase::WillUnmount,
        "flush",
        Handler::promise(|ev: EmitEvent| async move {
            tokio::task::yield_now().await;
            Ok(Some(json!({"flushed": ev.params})))
        }),
    );

    let out = bus
        .enter_async(LifecyclePhase::WillUnmount, vec![json!("queue")])
        .await;
    assert_eq!(out, Ok(Some(json!({"flushed": ["queue"]}))));
    assert_eq!(bus.phase(), LifecyclePhase::WillUnmount);

    assert_eq!(bus.enter_async(LifecyclePhase::Unknown, Vec::new()).await, Ok(None));
    assert_eq!(bus.phase(), LifecyclePhase::WillUnmount);
}

#[test]
fn test_reset_clears_everything() {
    let bus = fresh();
    let seen = Seen::new();
    bus.on("a", record(&seen));
    bus.on_callback("b", |_ev, done| done.done());
    bus.on_phase(LifecyclePhase::DidMount, "boot", Handler::fire(|_| Ok(None)));
    bus.emit("a", EmitEvent::new(json!(1))).unwrap();
    bus.did_mount().unwrap();

    bus.reset();

    assert_eq!(bus.phase(), LifecyclePhase::Unknown);
    assert_eq!(bus.ledger(), mountbus::SubscriptionLedger::default());
    assert_eq!(bus.pending_deferrals(), 0);

    bus.did_mount().unwrap();
    bus.emit("a", EmitEvent::new(json!(2))).unwrap();
    assert_eq!(seen.all(), vec![json!(1)]);
}

#[test]
fn test_builder_taps_before_first_transition() {
    common::init_tracing();
    let booted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&booted);
    let bus = Emitter::builder(Config::default())
        .on_phase(
            LifecyclePhase::DidMount,
            "boot",
            Handler::fire(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }),
        )
        .on_phase(LifecyclePhase::Unknown, "skipped", Handler::fire(|_| Ok(None)))
        .build();

    bus.did_mount().unwrap();
    assert_eq!(booted.load(Ordering::SeqCst), 1);
}

#[test]
fn test_phase_scope_order() {
    let bus = fresh();
    let trail: Seen<String> = Seen::new();
    let hook_trail = trail.clone();
    bus.on_phase(
        LifecyclePhase::DidMount,
        "trail",
        Handler::fire(move |_| {
            hook_trail.push("hook".into());
            Ok(None)
        }),
    );

    let body = trail.clone();
    let out = PhaseScope::new(&bus, LifecyclePhase::DidMount)
        .run(|| {
            body.push("body".into());
            7
        })
        .unwrap();
    assert_eq!(out, 7);

    let body = trail.clone();
    PhaseScope::new(&bus, LifecyclePhase::DidMount)
        .with_order(PhaseOrder::Before)
        .run(|| body.push("body".into()))
        .unwrap();

    assert_eq!(trail.all(), vec!["body", "hook", "hook", "body"]);
}

#[test]
fn test_phase_scope_callback_and_failure() {
    let bus = fresh();
    bus.on_phase(
        LifecyclePhase::WillMount,
        "guard",
        Handler::fire(|_| Err(EmitError::handler("not ready"))),
    );

    let reported: Seen<HandlerResult> = Seen::new();
    let sink = reported.clone();
    PhaseScope::new(&bus, LifecyclePhase::WillMount)
        .with_callback(move |outcome| sink.push(outcome))
        .run(|| ())
        .unwrap();
    assert_eq!(reported.all(), vec![Err(EmitError::handler("not ready"))]);

    let ran = Arc::new(AtomicUsize::new(0));
    let flag = Arc::clone(&ran);
    let err = PhaseScope::new(&bus, LifecyclePhase::WillMount)
        .with_order(PhaseOrder::Before)
        .run(move || flag.fetch_add(1, Ordering::SeqCst))
        .unwrap_err();
    assert_eq!(err, EmitError::handler("not ready"));
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}
