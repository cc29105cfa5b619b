mod common;

use common::{capture, record, Seen};
use mountbus::{Config, EmitError, EmitEvent, EmitMode, Emitter, HandlerResult, ListenFn};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;

fn mounted() -> Emitter {
    common::init_tracing();
    let bus = Emitter::new(Config::default());
    bus.did_mount().unwrap();
    bus
}

fn wire(bus: &Emitter, sync_hits: &Seen<Value>) {
    let hits = sync_hits.clone();
    bus.on("sync", move |ev| {
        hits.push(json!(if ev.params == json!("sync") { 0 } else { 1 }));
        Ok(None)
    });

    bus.on_callback("async", |ev, done| {
        if ev.params == json!("async") {
            done.ok(0);
        } else {
            done.fail(EmitError::handler("params is not valid"));
        }
    });

    bus.on_promise("promise", |ev: EmitEvent| async move {
        if ev.params == json!("promise") {
            Ok(Some(json!(0)))
        } else {
            Err(EmitError::handler("params is not valid"))
        }
    });
}

#[test]
fn test_mounted_sync_emit_runs_immediately() {
    let bus = mounted();
    let hits = Seen::new();
    wire(&bus, &hits);

    bus.emit("sync", EmitEvent::new(json!("sync"))).unwrap();
    assert_eq!(hits.all(), vec![json!(0)]);
}

#[test]
fn test_mounted_async_emit_success_and_error() {
    let bus = mounted();
    wire(&bus, &Seen::new());

    let outcomes = Seen::new();
    bus.async_emit("async", EmitEvent::new(json!("async")), capture(&outcomes)).unwrap();
    assert_eq!(outcomes.all(), vec![Ok(Some(json!(0)))]);

    // A callback that rethrows surfaces the handler error to the caller.
    let err = bus
        .async_emit(
            "async",
            EmitEvent::new(json!("async1")),
            Box::new(|outcome: HandlerResult| outcome.map(|_| ())),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "params is not valid");
}

#[tokio::test]
async fn test_mounted_promise_emit_resolves_and_rejects() {
    let bus = mounted();
    wire(&bus, &Seen::new());

    let ok = bus.promise_emit("promise", EmitEvent::new(json!("promise"))).await;
    assert_eq!(ok, Ok(Some(json!(0))));

    let err = bus.promise_emit("promise", EmitEvent::new(json!("promise1"))).await;
    assert_eq!(err, Err(EmitError::handler("params is not valid")));
    assert_eq!(bus.phase(), mountbus::LifecyclePhase::DidMount);
}

#[test]
fn test_sync_chain_bails_on_first_result() {
    let bus = mounted();
    let later = Seen::new();

    bus.register_as("chain", "first", mountbus::Handler::fire(|_| Ok(Some(json!("first")))));
    bus.register_as("chain", "second", mountbus::Handler::fire(record(&later)));

    let outcomes = Seen::new();
    bus.emit_with("chain", EmitEvent::new(json!(null)), capture(&outcomes)).unwrap();

    assert_eq!(outcomes.all(), vec![Ok(Some(json!("first")))]);
    assert!(later.all().is_empty());
}

#[test]
fn test_sync_handler_error_reaches_caller() {
    let bus = mounted();
    bus.on("strict", |_| Err(EmitError::handler("nope")));

    assert_eq!(
        bus.emit("strict", EmitEvent::new(json!(1))),
        Err(EmitError::handler("nope"))
    );
}

#[test]
fn test_empty_service_resolves_to_none() {
    let bus = mounted();
    let outcomes = Seen::new();

    bus.emit("nobody", EmitEvent::new(json!(1))).unwrap();
    bus.emit_with("nobody", EmitEvent::new(json!(1)), capture(&outcomes)).unwrap();
    bus.async_emit("nobody", EmitEvent::new(json!(1)), capture(&outcomes)).unwrap();

    assert_eq!(outcomes.all(), vec![Ok(None), Ok(None)]);
}

#[tokio::test]
async fn test_async_race_first_outcome_wins() {
    let bus = mounted();
    bus.register_as(
        "race",
        "slow",
        mountbus::Handler::promise(|_ev: EmitEvent| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(Some(json!("slow")))
        }),
    );
    bus.register_as(
        "race",
        "fast",
        mountbus::Handler::promise(|_ev: EmitEvent| async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(Some(json!("fast")))
        }),
    );

    let winner = bus.promise_emit("race", EmitEvent::new(json!(null))).await;
    assert_eq!(winner, Ok(Some(json!("fast"))));
}

#[tokio::test]
async fn test_suspended_async_emit_finishes_on_runtime() {
    let bus = mounted();
    bus.on_promise("later", |ev: EmitEvent| async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok(Some(ev.params))
    });

    let (tx, rx) = tokio::sync::oneshot::channel();
    bus.async_emit(
        "later",
        EmitEvent::new(json!(7)),
        Box::new(move |outcome| {
            let _ = tx.send(outcome);
            Ok(())
        }),
    )
    .unwrap();

    assert_eq!(rx.await.unwrap(), Ok(Some(json!(7))));
}

#[test]
fn test_suspended_async_emit_without_runtime() {
    let bus = mounted();
    bus.on_promise("pending", |_ev: EmitEvent| futures::future::pending::<HandlerResult>());

    let outcomes = Seen::new();
    bus.async_emit("pending", EmitEvent::new(json!(1)), capture(&outcomes)).unwrap();

    assert_eq!(
        outcomes.all(),
        vec![Err(EmitError::NoRuntime { service: "pending".into() })]
    );
}

#[tokio::test]
async fn test_panicking_async_handler_rejects() {
    let bus = mounted();
    bus.on_callback("boom", |_ev, _done| panic!("handler exploded"));

    let outcome = bus.promise_emit("boom", EmitEvent::new(json!(1))).await;
    assert!(matches!(
        outcome,
        Err(EmitError::Panicked { ref service, ref info }) if service == "boom" && info == "handler exploded"
    ));
}

#[tokio::test]
async fn test_dropped_responder_counts_as_no_result() {
    let bus = mounted();
    bus.on_callback("silent", |_ev, done| drop(done));

    assert_eq!(bus.promise_emit("silent", EmitEvent::new(json!(1))).await, Ok(None));
}

#[tokio::test]
async fn test_listen_registers_by_name() {
    let bus = mounted();
    let echo = ListenFn::arc("echo", |ev: EmitEvent| async move { Ok::<_, EmitError>(Some(ev.params)) });

    assert!(bus.listen("ping", echo.clone()));
    assert!(!bus.listen("ping", echo));

    let out = bus
        .promise_emit("ping", EmitEvent::new(json!({"n": 1})).with_callback_id(9))
        .await;
    assert_eq!(out, Ok(Some(json!({"n": 1}))));
}

#[test]
fn test_emit_as_routes_by_mode() {
    let bus = mounted();
    let sync_hits = Seen::new();
    wire(&bus, &sync_hits);

    let outcomes = Seen::new();
    bus.emit_as("sync", EmitEvent::new(json!("sync")), EmitMode::Fire, None).unwrap();
    bus.emit_as("async", EmitEvent::new(json!("async")), EmitMode::Callback, Some(capture(&outcomes)))
        .unwrap();
    bus.emit_as("promise", EmitEvent::new(json!("x")), EmitMode::Promise, Some(capture(&outcomes)))
        .unwrap();

    assert_eq!(sync_hits.all(), vec![json!(0)]);
    assert_eq!(
        outcomes.all(),
        vec![Ok(Some(json!(0))), Err(EmitError::handler("params is not valid"))]
    );
}
