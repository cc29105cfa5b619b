//! # Example: lifecycle
//!
//! Shows how dispatch is gated on the mount lifecycle.
//!
//! Demonstrates how to:
//! - Register fire-and-forget, callback and promise handlers.
//! - Emit before mount and watch the calls collapse and replay on [`Emitter::did_mount`].
//! - Drive a lifecycle hook with [`PhaseScope`].
//!
//! ## Flow
//! ```text
//! register handlers ──► emit x2 / async_emit / promise_emit   (phase Unknown: buffered)
//!     └─► PhaseScope(DidMount).run(load config)
//!           ├─► load config
//!           └─► did_mount() ──► replay: price=2, check=321, lookup="eur"
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=mountbus=debug cargo run --example lifecycle --features logging
//! ```

use mountbus::{Config, EmitError, EmitEvent, Emitter, Handler, LifecyclePhase, PhaseScope};
use serde_json::json;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    mountbus::logging::init();

    // 1. Build the emitter with a mount hook
    let bus = Emitter::builder(Config::default())
        .on_phase(
            LifecyclePhase::DidMount,
            "banner",
            Handler::fire(|_| {
                println!("[lifecycle] mounted");
                Ok(None)
            }),
        )
        .build();

    // 2. Register handlers in each mode
    bus.on("price", |ev| {
        println!("[price] {}", ev.params);
        Ok(None)
    });
    bus.on_callback("check", |ev, done| {
        if ev.params == json!(321) {
            done.ok(json!({"success": true}));
        } else {
            done.fail(EmitError::handler("params is not valid"));
        }
    });
    bus.on_promise("lookup", |ev: EmitEvent| async move {
        tokio::task::yield_now().await;
        Ok(Some(json!({"currency": ev.params, "rate": 1.08})))
    });

    // 3. Emit before mount: the two price updates collapse into the latest one
    bus.emit("price", EmitEvent::new(json!(1)))?;
    bus.emit("price", EmitEvent::new(json!(2)))?;
    bus.async_emit(
        "check",
        EmitEvent::new(json!(321)),
        Box::new(|outcome| {
            println!("[check] {:?}", outcome);
            Ok(())
        }),
    )?;
    let lookup = bus.promise_emit("lookup", EmitEvent::new(json!("eur")));
    println!("[main] buffered calls: {}", bus.pending_deferrals());

    // 4. Mount after "loading" and replay the buffered calls
    PhaseScope::new(&bus, LifecyclePhase::DidMount).run(|| println!("[main] loading config"))?;
    println!("[lookup] {:?}", lookup.await?);

    // 5. Tear down
    bus.will_unmount()?;
    bus.did_unmount()?;
    println!("[main] phase: {}", bus.phase());
    Ok(())
}
