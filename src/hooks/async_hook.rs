//! # Parallel bail-race hook.
//!
//! [`AsyncHook::dispatch`] starts every tap at once and resolves with the
//! first outcome that is an error or carries a result:
//!
//! ```text
//! dispatch(ev)
//!     ├──► tap 1 ──► Ok(None)      (ignored)
//!     ├──► tap 2 ──► Ok(Some(v))   ◄── first decisive outcome wins
//!     └──► tap N ──► ...           (keeps running, outcome discarded)
//! ```
//!
//! ## Rules
//! - Taps are invoked **eagerly** when `dispatch` is called; the returned
//!   future only collects outcomes.
//! - If every tap answers `Ok(None)`, the dispatch resolves to `Ok(None)`.
//! - Panics (while creating or polling a tap future) are caught and turned into
//!   [`EmitError::Panicked`].
//! - Losers are moved to the ambient tokio runtime when `drain_losers` is set;
//!   otherwise they are dropped together with the race.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use parking_lot::Mutex;

use crate::error::{EmitError, HandlerResult};
use crate::events::EmitEvent;
use crate::hooks::handler::AsyncHandler;

struct Tap {
    id: Arc<str>,
    handler: AsyncHandler,
}

/// Parallel, first-decisive-outcome-wins hook.
#[derive(Default)]
pub struct AsyncHook {
    taps: Mutex<Vec<Tap>>,
}

impl AsyncHook {
    /// Creates an empty hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tap. Returns `false` if `id` is already tapped.
    pub fn tap(&self, id: &str, handler: AsyncHandler) -> bool {
        let mut taps = self.taps.lock();
        if taps.iter().any(|t| &*t.id == id) {
            return false;
        }
        taps.push(Tap {
            id: id.into(),
            handler,
        });
        true
    }

    /// Removes the tap registered under `id`.
    pub fn untap(&self, id: &str) -> bool {
        let mut taps = self.taps.lock();
        let before = taps.len();
        taps.retain(|t| &*t.id != id);
        before != taps.len()
    }

    /// Number of taps.
    pub fn len(&self) -> usize {
        self.taps.lock().len()
    }

    /// Returns true if no taps are present.
    pub fn is_empty(&self) -> bool {
        self.taps.lock().is_empty()
    }

    /// Drops all taps.
    pub fn clear(&self) {
        self.taps.lock().clear();
    }

    /// Starts all taps and returns a future resolving to the race winner.
    ///
    /// `service` is only used to label panics.
    pub fn dispatch(
        &self,
        service: &str,
        event: EmitEvent,
        drain_losers: bool,
    ) -> BoxFuture<'static, HandlerResult> {
        let handlers: Vec<AsyncHandler> = self
            .taps
            .lock()
            .iter()
            .map(|t| Arc::clone(&t.handler))
            .collect();

        if handlers.is_empty() {
            return future::ready(Ok(None)).boxed();
        }

        let service: Arc<str> = service.into();
        let mut racing: FuturesUnordered<BoxFuture<'static, HandlerResult>> =
            FuturesUnordered::new();

        for handler in handlers {
            let started = std::panic::catch_unwind(AssertUnwindSafe(|| handler(event.clone())));
            let svc = Arc::clone(&service);
            let fut = match started {
                Ok(fut) => AssertUnwindSafe(fut)
                    .catch_unwind()
                    .map(move |res| res.unwrap_or_else(|p| Err(EmitError::from_panic(&svc, &*p))))
                    .boxed(),
                Err(p) => future::ready(Err(EmitError::from_panic(&svc, &*p))).boxed(),
            };
            racing.push(fut);
        }

        async move {
            while let Some(outcome) = racing.next().await {
                if matches!(outcome, Ok(None)) {
                    continue;
                }
                if !racing.is_empty() {
                    drain(&service, racing, drain_losers);
                }
                return outcome;
            }
            Ok(None)
        }
        .boxed()
    }
}

/// Lets race losers run to completion on the current runtime.
fn drain(
    service: &str,
    mut losers: FuturesUnordered<BoxFuture<'static, HandlerResult>>,
    keep_running: bool,
) {
    if !keep_running {
        return;
    }
    match tokio::runtime::Handle::try_current() {
        Ok(rt) => {
            tracing::trace!(service, losers = losers.len(), "draining race losers");
            rt.spawn(async move { while losers.next().await.is_some() {} });
        }
        Err(_) => {
            tracing::debug!(service, "no runtime; dropping race losers");
        }
    }
}
