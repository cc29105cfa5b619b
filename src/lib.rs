//! # mountbus
//!
//! **mountbus** is an in-process, lifecycle-gated event bus.
//!
//! Components register handlers under string service names and emit events to
//! those services in one of three styles (fire-and-forget, callback, future).
//! Until the bus is mounted, emits are buffered per service and replayed when
//! `did_mount()` fires.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//!  │ component #1 │  │ component #2 │  │ StreamBridge │
//!  │  (attach)    │  │  (on / emit) │  │ (ValueStream)│
//!  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!         ▼                 ▼                 ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │  Emitter (cloneable handle)                             │
//! │  - PhaseCell       (current LifecyclePhase)             │
//! │  - LifecycleHooks  (sync + async hook per phase)        │
//! │  - HookMap<SyncHook>   (fire-and-forget handlers)       │
//! │  - HookMap<AsyncHook>  (callback / promise handlers)    │
//! └──────┬──────────────────────────┬───────────────────────┘
//!        │ phase < DidMount         │ phase ≥ DidMount
//!        ▼                          ▼
//!  DidMount one-shot slot     SyncHook::call (bail chain)
//!  (per service, last wins)   AsyncHook::dispatch (bail race)
//!        │                          ▲
//!        └──── did_mount() ─────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! Unknown ──► WillMount ──► DidMount ──► WillUnmount ──► DidUnmount
//!    ▲            (transitions are not ordered; any phase may follow any other)
//!    └──────────── reset()
//! ```
//!
//! ## Features
//! | Area             | Description                                              | Key types / traits                          |
//! |------------------|----------------------------------------------------------|---------------------------------------------|
//! | **Dispatch**     | emit / emit_with / async_emit / promise_emit / emit_as   | [`Emitter`], [`EmitEvent`], [`EmitMode`]    |
//! | **Handlers**     | fire, callback and promise handlers, trait listeners     | [`Handler`], [`Responder`], [`Listen`]      |
//! | **Lifecycle**    | mount phases with their own hooks                        | [`LifecyclePhase`], [`PhaseScope`]          |
//! | **Components**   | per-type handler tables bound at construction            | [`EventComponent`], [`HandlerTable`]        |
//! | **Streams**      | value streams re-emitted on the bus                      | [`StreamBridge`], [`Subject`], [`BroadcastStream`] |
//! | **Errors**       | typed dispatch errors                                    | [`EmitError`], [`HandlerResult`]            |
//! | **Configuration**| deferral, race draining, bridge naming                   | [`Config`], [`EmitterBuilder`]              |
//!
//! ## Optional features
//! - `logging`: exports [`logging::init`], a `tracing-subscriber` console setup.
//!
//! ## Example
//! ```rust
//! use mountbus::{Config, EmitEvent, Emitter, EmitError};
//! use serde_json::json;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), EmitError> {
//!     let bus = Emitter::new(Config::default());
//!
//!     bus.on_promise("double", |ev: EmitEvent| async move {
//!         match ev.params.as_i64() {
//!             Some(n) => Ok(Some(json!(n * 2))),
//!             None => Err(EmitError::handler("not a number")),
//!         }
//!     });
//!
//!     // Buffered until mount.
//!     let pending = bus.promise_emit("double", EmitEvent::new(json!(21)));
//!     bus.did_mount()?;
//!
//!     assert_eq!(pending.await?, Some(json!(42)));
//!     Ok(())
//! }
//! ```
mod bridge;
mod components;
mod core;
mod error;
mod events;
mod hooks;

// ---- Public re-exports ----

pub use bridge::{
    bind_stream, bind_stream_promise, BroadcastStream, OnValue, StreamBridge, Subject, Subscription,
    ValueStream,
};
pub use components::{EventComponent, HandlerTable, PhaseOrder, PhaseScope};
pub use core::{
    Config, EmitCallback, EmitFuture, Emitter, EmitterBuilder, LifecyclePhase, SubscriptionLedger,
};
pub use error::{EmitError, HandlerResult};
pub use events::{EmitEvent, EmitMode};
pub use hooks::{
    AsyncHandler, AsyncHook, Handler, HookKind, HookMap, Listen, ListenFn, Responder, SyncHandler,
    SyncHook,
};

// Optional: console logging setup.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub mod logging;
