//! # Stream bridge.
//!
//! [`StreamBridge`] subscribes to a [`ValueStream`] once, at construction, and
//! re-emits each value on a generated service (`<bridge_prefix>:<uuid v4>`)
//! through both the sync and the async path, so handlers of either kind see it.
//!
//! ## Rules
//! - Values produced before mount are buffered like any other emit (latest
//!   wins) and replayed by `did_mount()`; a handler added after that replay
//!   never sees them.
//! - [`StreamBridge::destroy`] only unsubscribes from the source. The generated
//!   service keeps its handlers until [`StreamBridge::release`] or
//!   [`Emitter::reset`].
//! - Dispatch errors cannot reach a caller and are logged.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::core::{EmitCallback, Emitter};
use crate::error::HandlerResult;
use crate::events::EmitEvent;

use super::stream::{OnValue, Subscription, ValueStream};

/// Bridges one value stream onto a generated bus service.
pub struct StreamBridge<S: ValueStream> {
    emitter: Emitter,
    service: String,
    stream: S,
    subscription: Box<dyn Subscription>,
}

impl<S: ValueStream> StreamBridge<S> {
    /// Subscribes to `stream` and starts forwarding its values.
    pub fn new(emitter: &Emitter, stream: S) -> Self {
        let service = emitter.config().bridge_service(Uuid::new_v4());

        let bus = emitter.clone();
        let target = service.clone();
        let forward: OnValue = Arc::new(move |value| forward(&bus, &target, value));
        let subscription = stream.subscribe(forward);

        tracing::debug!(service = %service, "stream bridge created");
        Self {
            emitter: emitter.clone(),
            service,
            stream,
            subscription,
        }
    }

    /// The generated service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Registers a fire-and-forget handler for the bridged values.
    pub fn on<F>(&self, f: F) -> bool
    where
        F: Fn(&EmitEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.emitter.on(&self.service, f)
    }

    /// The stream's current value, if it keeps one.
    pub fn value(&self) -> Option<Value> {
        self.stream.current()
    }

    /// Unsubscribes from the source; registered handlers stay in place.
    pub fn destroy(&self) {
        self.subscription.unsubscribe();
        tracing::debug!(service = %self.service, "stream bridge destroyed");
    }

    /// Unsubscribes and removes the generated service from the emitter.
    pub fn release(self) {
        self.destroy();
        self.emitter.unregister(&self.service);
    }

    /// Returns true once the source subscription is closed.
    pub fn is_destroyed(&self) -> bool {
        self.subscription.is_closed()
    }
}

fn forward(emitter: &Emitter, service: &str, value: Value) {
    let svc = service.to_string();
    let report: EmitCallback = Box::new(move |outcome| {
        if let Err(err) = outcome {
            tracing::warn!(service = %svc, label = err.as_label(), error = %err, "bridged async dispatch failed");
        }
        Ok(())
    });

    if let Err(err) = emitter.emit_both(service, EmitEvent::new(value), report) {
        tracing::warn!(service, label = err.as_label(), error = %err, "bridged dispatch failed");
    }
}

/// Registers `handler` on `service` and emits every value of `stream` there.
///
/// Returns the source subscription; unsubscribing it stops the forwarding but
/// leaves the handler registered.
pub fn bind_stream<S, F>(emitter: &Emitter, service: &str, handler: F, stream: &S) -> Box<dyn Subscription>
where
    S: ValueStream + ?Sized,
    F: Fn(&EmitEvent) -> HandlerResult + Send + Sync + 'static,
{
    emitter.on(service, handler);

    let bus = emitter.clone();
    let target = service.to_string();
    stream.subscribe(Arc::new(move |value| {
        if let Err(err) = bus.emit(&target, EmitEvent::new(value)) {
            tracing::warn!(service = %target, label = err.as_label(), error = %err, "bound stream dispatch failed");
        }
    }))
}

/// Promise-mode counterpart of [`bind_stream`].
///
/// Registers a future-returning `handler` on `service` and dispatches every
/// stream value to the async hook. Outcomes have no caller: a handler error
/// is logged, a result is dropped.
pub fn bind_stream_promise<S, F, Fut>(
    emitter: &Emitter,
    service: &str,
    handler: F,
    stream: &S,
) -> Box<dyn Subscription>
where
    S: ValueStream + ?Sized,
    F: Fn(EmitEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    emitter.on_promise(service, handler);

    let bus = emitter.clone();
    let target = service.to_string();
    stream.subscribe(Arc::new(move |value| {
        let svc = target.clone();
        let report: EmitCallback = Box::new(move |outcome| {
            if let Err(err) = outcome {
                tracing::warn!(service = %svc, label = err.as_label(), error = %err, "bound stream handler failed");
            }
            Ok(())
        });
        if let Err(err) = bus.async_emit(&target, EmitEvent::new(value), report) {
            tracing::warn!(service = %target, label = err.as_label(), error = %err, "bound stream dispatch failed");
        }
    }))
}
