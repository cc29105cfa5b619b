//! # Sequential bail hook.
//!
//! [`SyncHook`] keeps an ordered list of taps and calls them one by one.
//! The first tap returning `Ok(Some(_))` or `Err(_)` ends the call and its
//! outcome is the result of the whole call.
//!
//! ## One-shot taps
//! Besides regular taps, a hook can hold **one-shot** taps (used by the
//! emitter for pre-mount deferral):
//! - a one-shot tap is removed right before it runs, so it fires once;
//! - tapping a one-shot id that is already pending **replaces** the pending
//!   handler (last write wins) and keeps its position;
//! - a one-shot tap removed or replaced while a call is in flight is skipped;
//! - one-shot taps never bail: each pending one runs, and the first error
//!   among them is reported after all have fired.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::HandlerResult;
use crate::events::EmitEvent;
use crate::hooks::handler::SyncHandler;

struct Tap {
    id: Arc<str>,
    handler: SyncHandler,
    once: bool,
}

/// Ordered, bail-on-first-result hook.
#[derive(Default)]
pub struct SyncHook {
    taps: Mutex<Vec<Tap>>,
}

impl SyncHook {
    /// Creates an empty hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a regular tap.
    ///
    /// Returns `false` (and keeps the existing tap) if `id` is already tapped.
    pub fn tap(&self, id: &str, handler: SyncHandler) -> bool {
        let mut taps = self.taps.lock();
        if taps.iter().any(|t| !t.once && &*t.id == id) {
            return false;
        }
        taps.push(Tap {
            id: id.into(),
            handler,
            once: false,
        });
        true
    }

    /// Sets the one-shot slot `id`.
    ///
    /// Returns `true` when a pending one-shot with the same id was replaced.
    pub(crate) fn tap_once(&self, id: &str, handler: SyncHandler) -> bool {
        let mut taps = self.taps.lock();
        if let Some(tap) = taps.iter_mut().find(|t| t.once && &*t.id == id) {
            tap.handler = handler;
            return true;
        }
        taps.push(Tap {
            id: id.into(),
            handler,
            once: true,
        });
        false
    }

    /// Removes every tap registered under `id`. Returns how many were removed.
    pub fn untap(&self, id: &str) -> usize {
        let mut taps = self.taps.lock();
        let before = taps.len();
        taps.retain(|t| &*t.id != id);
        before - taps.len()
    }

    /// Number of taps (regular and pending one-shot).
    pub fn len(&self) -> usize {
        self.taps.lock().len()
    }

    /// Returns true if no taps are present.
    pub fn is_empty(&self) -> bool {
        self.taps.lock().is_empty()
    }

    /// Number of pending one-shot taps.
    pub fn pending(&self) -> usize {
        self.taps.lock().iter().filter(|t| t.once).count()
    }

    /// Drops all taps.
    pub fn clear(&self) {
        self.taps.lock().clear();
    }

    /// Calls taps in order.
    ///
    /// Regular taps stop at the first bail. Pending one-shot taps all run; an
    /// error from one of them does not stop the others. The first decisive
    /// outcome in tap order is returned.
    pub fn call(&self, event: &EmitEvent) -> HandlerResult {
        let snapshot: Vec<(Arc<str>, SyncHandler, bool)> = self
            .taps
            .lock()
            .iter()
            .map(|t| (Arc::clone(&t.id), Arc::clone(&t.handler), t.once))
            .collect();

        let mut outcome: Option<HandlerResult> = None;
        let mut chain_open = true;
        for (id, handler, once) in snapshot {
            if once {
                if !self.take_once(&id, &handler) {
                    continue;
                }
                if let failed @ Err(_) = handler(event) {
                    if outcome.is_none() {
                        outcome = Some(failed);
                    }
                }
                continue;
            }
            if !chain_open {
                continue;
            }
            match handler(event) {
                Ok(None) => {}
                bail => {
                    chain_open = false;
                    if outcome.is_none() {
                        outcome = Some(bail);
                    }
                }
            }
        }
        outcome.unwrap_or(Ok(None))
    }

    /// Removes a pending one-shot tap if it is still the same handler.
    fn take_once(&self, id: &str, handler: &SyncHandler) -> bool {
        let mut taps = self.taps.lock();
        let pos = taps
            .iter()
            .position(|t| t.once && &*t.id == id && Arc::ptr_eq(&t.handler, handler));
        match pos {
            Some(i) => {
                taps.remove(i);
                true
            }
            None => false,
        }
    }
}
