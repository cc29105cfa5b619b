//! # Emitter: lifecycle-gated registry and dispatch engine.
//!
//! [`Emitter`] is a cheap, cloneable handle to one registry. Construct it once at
//! the composition root and pass clones to every component that needs it.
//!
//! ## Architecture
//! ```text
//! register(service, Handler) ──► Fire          ──► HookMap<SyncHook>  ─┐
//!                            └─► Callback/Promise ─► HookMap<AsyncHook> ┤ ledger
//!
//! emit / emit_with / async_emit / promise_emit
//!     │
//!     ├─ phase ∈ {Unknown, WillMount}
//!     │     └─► DidMount sync hook: one-shot slot keyed by service (last write wins)
//!     │                 └─ did_mount() ──► slot fires ──► buffered dispatch
//!     │
//!     └─ phase ∈ {DidMount, WillUnmount, DidUnmount}
//!           ├─► SyncHook::call       (emit, emit_with)
//!           └─► AsyncHook::dispatch  (async_emit, promise_emit)
//! ```
//!
//! ## Rules
//! - Lifecycle transitions are unguarded: any phase may be entered from any other.
//! - Deferred slots fire once; a second `did_mount()` only re-runs regular taps.
//! - A failing deferred slot does not stop the others; `did_mount()` returns the
//!   first slot error once every slot has fired.
//! - Sync paths return handler errors (and callback errors) to the caller.
//! - Async paths hand the outcome to the callback / future; if the race cannot
//!   finish inline it continues on the ambient tokio runtime.
//! - No lock is held while a handler runs; handlers may call back into the emitter.
//!
//! ## Example
//! ```rust
//! use mountbus::{Config, EmitEvent, Emitter};
//! use serde_json::json;
//! use std::sync::{Arc, Mutex};
//!
//! let bus = Emitter::new(Config::default());
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = Arc::clone(&seen);
//! bus.on("price", move |ev| {
//!     sink.lock().unwrap().push(ev.params.clone());
//!     Ok(None)
//! });
//!
//! // Not mounted yet: buffered.
//! bus.emit("price", EmitEvent::new(json!(1))).unwrap();
//! assert!(seen.lock().unwrap().is_empty());
//!
//! bus.did_mount().unwrap();
//! assert_eq!(*seen.lock().unwrap(), vec![json!(1)]);
//! ```

use std::sync::{Arc, Weak};

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::core::builder::EmitterBuilder;
use crate::core::config::Config;
use crate::core::lifecycle::{LifecycleHooks, LifecyclePhase, PhaseCell};
use crate::error::{EmitError, HandlerResult};
use crate::events::{EmitEvent, EmitMode};
use crate::hooks::{AsyncHook, Handler, HookKind, HookMap, Listen, Responder, SyncHandler, SyncHook};

/// Completion callback for callback-style dispatch and lifecycle transitions.
///
/// Returning `Err` mirrors a throwing callback: on sync paths the error is
/// returned to whoever triggered the dispatch.
pub type EmitCallback = Box<dyn FnOnce(HandlerResult) -> Result<(), EmitError> + Send>;

/// Future returned by [`Emitter::promise_emit`].
pub type EmitFuture = BoxFuture<'static, HandlerResult>;

/// Snapshot of every service that has had a hook materialized.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubscriptionLedger {
    /// Services with a sync (fire-and-forget) hook, sorted.
    pub sync: Vec<String>,
    /// Services with an async (callback/promise) hook, sorted.
    pub asynchronous: Vec<String>,
}

struct Inner {
    cfg: Config,
    phase: PhaseCell,
    lifecycle: LifecycleHooks,
    sync_hooks: HookMap<SyncHook>,
    async_hooks: HookMap<AsyncHook>,
}

/// Handle to a lifecycle-gated event registry.
#[derive(Clone)]
pub struct Emitter {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("phase", &self.phase())
            .field("ledger", &self.ledger())
            .finish()
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Emitter {
    /// Creates an emitter in phase `Unknown` with no handlers.
    pub fn new(cfg: Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                cfg,
                phase: PhaseCell::default(),
                lifecycle: LifecycleHooks::default(),
                sync_hooks: HookMap::new(),
                async_hooks: HookMap::new(),
            }),
        }
    }

    /// Returns a builder for wiring lifecycle handlers up front.
    pub fn builder(cfg: Config) -> EmitterBuilder {
        EmitterBuilder::new(cfg)
    }

    /// Returns the configuration this emitter was built with.
    pub fn config(&self) -> &Config {
        &self.inner.cfg
    }

    /// Returns the current lifecycle phase.
    pub fn phase(&self) -> LifecyclePhase {
        self.inner.phase.load()
    }

    /// Returns the services recorded in both ledgers.
    pub fn ledger(&self) -> SubscriptionLedger {
        SubscriptionLedger {
            sync: self.inner.sync_hooks.services(),
            asynchronous: self.inner.async_hooks.services(),
        }
    }

    /// Number of handlers registered on `service` for the given hook kind.
    ///
    /// Does not materialize the hook.
    pub fn handler_count(&self, service: &str, kind: HookKind) -> usize {
        match kind {
            HookKind::Sync => self.inner.sync_hooks.get(service).map_or(0, |h| h.len()),
            HookKind::Async => self.inner.async_hooks.get(service).map_or(0, |h| h.len()),
        }
    }

    /// Number of dispatches currently buffered until `DidMount`.
    pub fn pending_deferrals(&self) -> usize {
        self.inner.lifecycle.did_mount().pending()
    }

    // ---------------------------
    // Registry
    // ---------------------------

    /// Registers `handler` on `service` with subscriber id = service name.
    ///
    /// Returns `false` if that id was already registered (no-op).
    pub fn register(&self, service: &str, handler: Handler) -> bool {
        self.register_as(service, service, handler)
    }

    /// Registers `handler` on `service` under an explicit subscriber id.
    pub fn register_as(&self, service: &str, subscriber_id: &str, handler: Handler) -> bool {
        let mode = handler.mode();
        let added = match handler {
            Handler::Fire(h) => self.inner.sync_hooks.for_service(service).tap(subscriber_id, h),
            Handler::Callback(h) | Handler::Promise(h) => {
                self.inner.async_hooks.for_service(service).tap(subscriber_id, h)
            }
        };
        tracing::debug!(service, subscriber_id, %mode, added, "handler registered");
        added
    }

    /// Registers a fire-and-forget handler.
    pub fn on<F>(&self, service: &str, f: F) -> bool
    where
        F: Fn(&EmitEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(service, Handler::fire(f))
    }

    /// Registers a callback-style handler.
    pub fn on_callback<F>(&self, service: &str, f: F) -> bool
    where
        F: Fn(EmitEvent, Responder) + Send + Sync + 'static,
    {
        self.register(service, Handler::callback(f))
    }

    /// Registers a future-returning handler.
    pub fn on_promise<F, Fut>(&self, service: &str, f: F) -> bool
    where
        F: Fn(EmitEvent) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(service, Handler::promise(f))
    }

    /// Registers a [`Listen`] implementation in promise mode, keyed by its name.
    pub fn listen(&self, service: &str, listener: Arc<dyn Listen>) -> bool {
        let id = listener.name().to_string();
        let handler = Handler::Promise(Arc::new(move |event: EmitEvent| {
            let listener = Arc::clone(&listener);
            async move { listener.handle(event).await }.boxed()
        }));
        self.register_as(service, &id, handler)
    }

    /// Removes `service` from both ledgers and both hook maps.
    ///
    /// Idempotent; returns true if anything was removed.
    pub fn unregister(&self, service: &str) -> bool {
        let sync = self.inner.sync_hooks.remove(service);
        let asynchronous = self.inner.async_hooks.remove(service);
        tracing::debug!(service, removed = sync || asynchronous, "service unregistered");
        sync || asynchronous
    }

    /// Drops every handler, ledger entry, lifecycle tap and pending deferral,
    /// and returns the phase to `Unknown`.
    pub fn reset(&self) {
        self.inner.sync_hooks.clear();
        self.inner.async_hooks.clear();
        self.inner.lifecycle.clear();
        let prev = self.inner.phase.swap(LifecyclePhase::Unknown);
        tracing::debug!(from = %prev, "emitter reset");
    }

    // ---------------------------
    // Lifecycle
    // ---------------------------

    /// Enters `WillMount` (fire-and-forget, no arguments).
    pub fn will_mount(&self) -> Result<(), EmitError> {
        self.enter(LifecyclePhase::WillMount)
    }

    /// Enters `DidMount`, replaying every deferred dispatch.
    pub fn did_mount(&self) -> Result<(), EmitError> {
        self.enter(LifecyclePhase::DidMount)
    }

    /// Enters `WillUnmount`.
    pub fn will_unmount(&self) -> Result<(), EmitError> {
        self.enter(LifecyclePhase::WillUnmount)
    }

    /// Enters `DidUnmount`.
    pub fn did_unmount(&self) -> Result<(), EmitError> {
        self.enter(LifecyclePhase::DidUnmount)
    }

    /// Enters `phase` without callback or arguments.
    pub fn enter(&self, phase: LifecyclePhase) -> Result<(), EmitError> {
        self.enter_with(phase, None, Vec::new())
    }

    /// Enters `phase` and runs its sync hook.
    ///
    /// - with `callback`: the first bail outcome (error or result) goes to the
    ///   callback; only the callback's own error is returned
    /// - without: hook runs fire-and-forget with `args` (as a JSON array) as
    ///   payload; a handler error is returned
    ///
    /// Entering `Unknown` is rejected with an error log and leaves the phase untouched.
    pub fn enter_with(
        &self,
        phase: LifecyclePhase,
        callback: Option<EmitCallback>,
        args: Vec<Value>,
    ) -> Result<(), EmitError> {
        let Some(hook) = self.inner.lifecycle.sync(phase) else {
            tracing::error!(%phase, current = %self.phase(), "wrong lifecycle transition ignored");
            return Ok(());
        };

        let prev = self.inner.phase.swap(phase);
        tracing::debug!(from = %prev, to = %phase, pending = hook.pending(), "lifecycle transition");

        let event = EmitEvent::new(Value::Array(args));
        match callback {
            Some(cb) => cb(hook.call(&event)),
            None => hook.call(&event).map(|_| ()),
        }
    }

    /// Enters `phase`, runs its sync hook, then awaits its async hook.
    ///
    /// A bail from the sync hook skips the async hook.
    pub async fn enter_async(&self, phase: LifecyclePhase, args: Vec<Value>) -> HandlerResult {
        let (Some(sync), Some(asynchronous)) = (
            self.inner.lifecycle.sync(phase),
            self.inner.lifecycle.asynchronous(phase),
        ) else {
            tracing::error!(%phase, current = %self.phase(), "wrong lifecycle transition ignored");
            return Ok(None);
        };

        let prev = self.inner.phase.swap(phase);
        tracing::debug!(from = %prev, to = %phase, "lifecycle transition (async)");

        let event = EmitEvent::new(Value::Array(args));
        if let bail @ (Ok(Some(_)) | Err(_)) = sync.call(&event) {
            return bail;
        }
        asynchronous
            .dispatch(phase.as_label(), event, self.inner.cfg.drain_losers)
            .await
    }

    /// Taps the hook of `phase`: fire handlers go to the sync hook,
    /// callback/promise handlers to the async hook.
    ///
    /// Returns `false` for `Unknown` or an already used id.
    pub fn on_phase(&self, phase: LifecyclePhase, subscriber_id: &str, handler: Handler) -> bool {
        let added = match handler {
            Handler::Fire(h) => self
                .inner
                .lifecycle
                .sync(phase)
                .is_some_and(|hook| hook.tap(subscriber_id, h)),
            Handler::Callback(h) | Handler::Promise(h) => self
                .inner
                .lifecycle
                .asynchronous(phase)
                .is_some_and(|hook| hook.tap(subscriber_id, h)),
        };
        tracing::debug!(%phase, subscriber_id, added, "lifecycle handler registered");
        added
    }

    // ---------------------------
    // Dispatch
    // ---------------------------

    /// Fire-and-forget dispatch to the sync handlers of `service`.
    ///
    /// Before mount the call is buffered (replacing an earlier buffered call to
    /// the same service) and `Ok(())` is returned; the handler error, if any,
    /// then surfaces from `did_mount()`.
    pub fn emit(&self, service: &str, event: EmitEvent) -> Result<(), EmitError> {
        if self.defers() {
            let svc = service.to_string();
            self.defer(service, move |me| me.fire(&svc, &event).map(|_| ()));
            return Ok(());
        }
        self.fire(service, &event).map(|_| ())
    }

    /// Callback-style dispatch to the sync handlers of `service`.
    ///
    /// The callback receives the first bail outcome; its own error is returned.
    pub fn emit_with(
        &self,
        service: &str,
        event: EmitEvent,
        callback: EmitCallback,
    ) -> Result<(), EmitError> {
        if self.defers() {
            let svc = service.to_string();
            self.defer(service, move |me| callback(me.fire(&svc, &event)));
            return Ok(());
        }
        callback(self.fire(service, &event))
    }

    /// Callback-style dispatch to the async handlers of `service`.
    ///
    /// When every handler answers without suspending the callback runs inline
    /// and its error is returned here. Otherwise the race continues on the
    /// ambient tokio runtime and a callback error is logged.
    pub fn async_emit(
        &self,
        service: &str,
        event: EmitEvent,
        callback: EmitCallback,
    ) -> Result<(), EmitError> {
        if self.defers() {
            let svc = service.to_string();
            self.defer(service, move |me| me.race(&svc, event, callback));
            return Ok(());
        }
        self.race(service, event, callback)
    }

    /// Future-style dispatch to the async handlers of `service`.
    ///
    /// Handlers are started now (or at mount, when deferred). A buffered call
    /// that is replaced by a newer one, or discarded by [`reset`](Self::reset),
    /// resolves to [`EmitError::Abandoned`].
    pub fn promise_emit(&self, service: &str, event: EmitEvent) -> EmitFuture {
        if self.defers() {
            let (tx, rx) = oneshot::channel::<HandlerResult>();
            let svc = service.to_string();
            self.defer(service, move |me| {
                me.race(
                    &svc,
                    event,
                    Box::new(move |outcome| {
                        // Receiver gone means the caller stopped waiting.
                        let _ = tx.send(outcome);
                        Ok(())
                    }),
                )
            });

            let svc = service.to_string();
            return async move {
                rx.await
                    .unwrap_or_else(|_| Err(EmitError::Abandoned { service: svc }))
            }
            .boxed();
        }

        self.inner
            .async_hooks
            .for_service(service)
            .dispatch(service, event, self.inner.cfg.drain_losers)
    }

    /// Dispatches by mode; the path taken by component "emitting methods".
    ///
    /// - `Fire`: [`emit`](Self::emit), or [`emit_with`](Self::emit_with) if a callback is given
    /// - `Callback`: [`async_emit`](Self::async_emit)
    /// - `Promise`: [`promise_emit`](Self::promise_emit), outcome reported to the callback
    pub fn emit_as(
        &self,
        service: &str,
        event: EmitEvent,
        mode: EmitMode,
        callback: Option<EmitCallback>,
    ) -> Result<(), EmitError> {
        match (mode, callback) {
            (EmitMode::Fire, None) => self.emit(service, event),
            (EmitMode::Fire, Some(cb)) => self.emit_with(service, event, cb),
            (EmitMode::Callback, cb) => {
                self.async_emit(service, event, cb.unwrap_or_else(ignore_outcome))
            }
            (EmitMode::Promise, cb) => {
                let fut = self.promise_emit(service, event);
                drive(service, fut, cb.unwrap_or_else(ignore_outcome))
            }
        }
    }

    /// Sync dispatch followed by async dispatch of the same event.
    ///
    /// Before mount both are parked in a single slot, so the pair is replayed
    /// together instead of the async half replacing the sync half.
    pub(crate) fn emit_both(
        &self,
        service: &str,
        event: EmitEvent,
        on_async: EmitCallback,
    ) -> Result<(), EmitError> {
        if self.defers() {
            let svc = service.to_string();
            self.defer(service, move |me| me.fire_and_race(&svc, event, on_async));
            return Ok(());
        }
        self.fire_and_race(service, event, on_async)
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    fn fire_and_race(
        &self,
        service: &str,
        event: EmitEvent,
        on_async: EmitCallback,
    ) -> Result<(), EmitError> {
        self.fire(service, &event)?;
        self.race(service, event, on_async)
    }

    fn downgrade(&self) -> Weak<Inner> {
        Arc::downgrade(&self.inner)
    }

    fn defers(&self) -> bool {
        self.inner.cfg.defer_until_mount && self.phase().is_pre_mount()
    }

    fn fire(&self, service: &str, event: &EmitEvent) -> HandlerResult {
        tracing::trace!(service, "sync dispatch");
        self.inner.sync_hooks.for_service(service).call(event)
    }

    fn race(&self, service: &str, event: EmitEvent, on_done: EmitCallback) -> Result<(), EmitError> {
        tracing::trace!(service, "async dispatch");
        let fut = self
            .inner
            .async_hooks
            .for_service(service)
            .dispatch(service, event, self.inner.cfg.drain_losers);
        drive(service, fut, on_done)
    }

    /// Parks `run` in the DidMount one-shot slot keyed by `service`.
    fn defer<F>(&self, service: &str, run: F)
    where
        F: FnOnce(&Emitter) -> Result<(), EmitError> + Send + 'static,
    {
        let weak = self.downgrade();
        let slot = Mutex::new(Some(run));
        let handler: SyncHandler = Arc::new(move |_event: &EmitEvent| {
            let Some(run) = slot.lock().take() else {
                return Ok(None);
            };
            let Some(inner) = weak.upgrade() else {
                return Ok(None);
            };
            run(&Emitter { inner }).map(|_| None)
        });

        let replaced = self.inner.lifecycle.did_mount().tap_once(service, handler);
        tracing::debug!(service, replaced, phase = %self.phase(), "dispatch deferred until mount");
    }
}

fn ignore_outcome() -> EmitCallback {
    Box::new(|_outcome| Ok(()))
}

/// Resolves `fut` inline if it is already complete, otherwise finishes it on
/// the ambient runtime, then hands the outcome to `on_done`.
fn drive(service: &str, mut fut: EmitFuture, on_done: EmitCallback) -> Result<(), EmitError> {
    if let Some(outcome) = fut.as_mut().now_or_never() {
        return on_done(outcome);
    }

    match tokio::runtime::Handle::try_current() {
        Ok(rt) => {
            let service = service.to_string();
            rt.spawn(async move {
                let outcome = fut.await;
                if let Err(err) = on_done(outcome) {
                    tracing::warn!(
                        service = %service,
                        label = err.as_label(),
                        error = %err,
                        "emit callback failed after async completion"
                    );
                }
            });
            Ok(())
        }
        Err(_) => on_done(Err(EmitError::NoRuntime {
            service: service.to_string(),
        })),
    }
}
