//! # Handler values and the completion responder.
//!
//! [`Handler`] carries both the callable and its [`EmitMode`], so registration
//! needs no separate mode argument:
//!
//! | constructor            | mode       | signature                                   |
//! |------------------------|------------|---------------------------------------------|
//! | [`Handler::fire`]      | `Fire`     | `Fn(&EmitEvent) -> HandlerResult`           |
//! | [`Handler::callback`]  | `Callback` | `Fn(EmitEvent, Responder)`                  |
//! | [`Handler::promise`]   | `Promise`  | `Fn(EmitEvent) -> impl Future<HandlerResult>` |
//!
//! A [`Responder`] is consumed when used, so a callback handler can complete
//! at most once. Dropping it without answering counts as "no result".

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{EmitError, HandlerResult};
use crate::events::{EmitEvent, EmitMode};

/// Type-erased fire-and-forget handler.
pub type SyncHandler = Arc<dyn Fn(&EmitEvent) -> HandlerResult + Send + Sync>;

/// Type-erased async handler (callback and promise modes both normalize to this).
pub type AsyncHandler = Arc<dyn Fn(EmitEvent) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// A handler together with its dispatch mode.
#[derive(Clone)]
pub enum Handler {
    /// Runs inline on the sync hook.
    Fire(SyncHandler),
    /// Completes through a [`Responder`]; stored on the async hook.
    Callback(AsyncHandler),
    /// Returns a future; stored on the async hook.
    Promise(AsyncHandler),
}

impl Handler {
    /// Fire-and-forget handler. Returning `Ok(Some(_))` or `Err(_)` stops the
    /// remaining handlers of the service.
    pub fn fire<F>(f: F) -> Self
    where
        F: Fn(&EmitEvent) -> HandlerResult + Send + Sync + 'static,
    {
        Handler::Fire(Arc::new(f))
    }

    /// Callback-style handler. `f` runs as soon as the service is dispatched and
    /// must answer through the [`Responder`] (now or later).
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(EmitEvent, Responder) + Send + Sync + 'static,
    {
        Handler::Callback(Arc::new(move |event: EmitEvent| {
            let (responder, rx) = Responder::channel();
            f(event, responder);
            async move {
                match rx.await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        tracing::debug!("responder dropped without answer");
                        Ok(None)
                    }
                }
            }
            .boxed()
        }))
    }

    /// Future-returning handler.
    pub fn promise<F, Fut>(f: F) -> Self
    where
        F: Fn(EmitEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Handler::Promise(Arc::new(move |event: EmitEvent| f(event).boxed()))
    }

    /// Returns the dispatch mode of this handler.
    pub fn mode(&self) -> EmitMode {
        match self {
            Handler::Fire(_) => EmitMode::Fire,
            Handler::Callback(_) => EmitMode::Callback,
            Handler::Promise(_) => EmitMode::Promise,
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Handler").field(&self.mode()).finish()
    }
}

/// One-shot completion channel handed to callback-style handlers.
#[derive(Debug)]
pub struct Responder {
    tx: oneshot::Sender<HandlerResult>,
}

impl Responder {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<HandlerResult>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Completes with an arbitrary outcome.
    pub fn respond(self, outcome: HandlerResult) {
        // The dispatch may already have a winner; a closed channel is fine.
        let _ = self.tx.send(outcome);
    }

    /// Completes with a result value (wins the race).
    pub fn ok(self, value: impl Into<Value>) {
        self.respond(Ok(Some(value.into())));
    }

    /// Completes without a result (does not win the race).
    pub fn done(self) {
        self.respond(Ok(None));
    }

    /// Completes with an error (wins the race).
    pub fn fail(self, err: EmitError) {
        self.respond(Err(err));
    }
}
