//! # Per-type handler tables.
//!
//! ## Rules
//! - Entries keep declaration order.
//! - A service declared twice in one table keeps the first method.
//! - Binding registers each entry with subscriber id = service name, so a
//!   second instance attached to the same emitter does not add duplicates.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::core::Emitter;
use crate::error::HandlerResult;
use crate::events::{EmitEvent, EmitMode};
use crate::hooks::{Handler, Responder};

/// Fire-and-forget method.
pub type FireMethod<T> = fn(&T, &EmitEvent) -> HandlerResult;
/// Callback-style method.
pub type CallbackMethod<T> = fn(&T, EmitEvent, Responder);
/// Future-returning method; receives the shared instance so the future can own it.
pub type PromiseMethod<T> = fn(Arc<T>, EmitEvent) -> BoxFuture<'static, HandlerResult>;

enum Method<T> {
    Fire(FireMethod<T>),
    Callback(CallbackMethod<T>),
    Promise(PromiseMethod<T>),
}

impl<T> Clone for Method<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Method<T> {}

impl<T: Send + Sync + 'static> Method<T> {
    fn mode(self) -> EmitMode {
        match self {
            Method::Fire(_) => EmitMode::Fire,
            Method::Callback(_) => EmitMode::Callback,
            Method::Promise(_) => EmitMode::Promise,
        }
    }

    fn bind(self, target: &Arc<T>) -> Handler {
        let target = Arc::clone(target);
        match self {
            Method::Fire(m) => Handler::fire(move |event| m(&target, event)),
            Method::Callback(m) => {
                Handler::callback(move |event, responder| m(&target, event, responder))
            }
            Method::Promise(m) => {
                Handler::Promise(Arc::new(move |event: EmitEvent| m(Arc::clone(&target), event)))
            }
        }
    }
}

/// Ordered `(service, method, mode)` entries for one component type.
pub struct HandlerTable<T> {
    entries: Vec<(String, Method<T>)>,
}

impl<T: Send + Sync + 'static> HandlerTable<T> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Declares a fire-and-forget method.
    pub fn on(self, service: impl Into<String>, method: FireMethod<T>) -> Self {
        self.push(service.into(), Method::Fire(method))
    }

    /// Declares a callback-style method.
    pub fn on_callback(self, service: impl Into<String>, method: CallbackMethod<T>) -> Self {
        self.push(service.into(), Method::Callback(method))
    }

    /// Declares a future-returning method.
    pub fn on_promise(self, service: impl Into<String>, method: PromiseMethod<T>) -> Self {
        self.push(service.into(), Method::Promise(method))
    }

    /// Declared `(service, mode)` pairs in order.
    pub fn entries(&self) -> Vec<(&str, EmitMode)> {
        self.entries
            .iter()
            .map(|(service, method)| (service.as_str(), method.mode()))
            .collect()
    }

    /// Number of declared services.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers every entry on `emitter`, bound to `target`.
    ///
    /// Returns how many entries were actually added (already taken subscriber
    /// ids are skipped).
    pub fn bind(&self, target: &Arc<T>, emitter: &Emitter) -> usize {
        self.entries
            .iter()
            .filter(|(service, method)| emitter.register(service, method.bind(target)))
            .count()
    }

    fn push(mut self, service: String, method: Method<T>) -> Self {
        if self.entries.iter().any(|(s, _)| *s == service) {
            tracing::trace!(service = %service, "duplicate table entry ignored");
            return self;
        }
        self.entries.push((service, method));
        self
    }
}

impl<T: Send + Sync + 'static> Default for HandlerTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A type whose instances subscribe their methods at construction.
pub trait EventComponent: Send + Sync + Sized + 'static {
    /// The handler table for this type.
    fn handlers() -> HandlerTable<Self>;
}

impl Emitter {
    /// Binds `T::handlers()` to `target` and returns the instance.
    pub fn attach<T: EventComponent>(&self, target: Arc<T>) -> Arc<T> {
        let table = T::handlers();
        let bound = table.bind(&target, self);
        tracing::debug!(
            component = std::any::type_name::<T>(),
            declared = table.len(),
            bound,
            "component attached"
        );
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::hooks::HookKind;
    use futures::FutureExt;
    use serde_json::json;

    struct Probe;

    impl Probe {
        fn first(&self, _ev: &EmitEvent) -> HandlerResult {
            Ok(Some(json!("first")))
        }

        fn second(&self, _ev: &EmitEvent) -> HandlerResult {
            Ok(Some(json!("second")))
        }

        fn check(&self, _ev: EmitEvent, done: Responder) {
            done.done();
        }

        fn later(self: Arc<Self>, _ev: EmitEvent) -> BoxFuture<'static, HandlerResult> {
            async { Ok(None) }.boxed()
        }
    }

    #[test]
    fn test_duplicate_service_keeps_first() {
        let table = HandlerTable::<Probe>::new()
            .on("svc", Probe::first)
            .on("svc", Probe::second)
            .on_callback("check", Probe::check)
            .on_promise("later", Probe::later);

        assert_eq!(
            table.entries(),
            vec![
                ("svc", EmitMode::Fire),
                ("check", EmitMode::Callback),
                ("later", EmitMode::Promise)
            ]
        );
    }

    #[test]
    fn test_bind_routes_by_mode_and_skips_taken_ids() {
        let bus = Emitter::new(Config::default());
        let table = HandlerTable::<Probe>::new()
            .on("svc", Probe::first)
            .on_callback("check", Probe::check)
            .on_promise("later", Probe::later);

        let probe = Arc::new(Probe);
        assert_eq!(table.bind(&probe, &bus), 3);
        assert_eq!(table.bind(&Arc::new(Probe), &bus), 0);

        assert_eq!(bus.handler_count("svc", HookKind::Sync), 1);
        assert_eq!(bus.handler_count("check", HookKind::Async), 1);
        assert_eq!(bus.handler_count("later", HookKind::Async), 1);
    }
}
