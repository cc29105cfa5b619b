//! # Synchronous multicast stream.
//!
//! `next(v)` calls every live subscriber inline, in subscription order. A
//! subject built with [`Subject::with_value`] remembers the latest value and
//! hands it to each new subscriber immediately.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;

use super::stream::{OnValue, Subscription, ValueStream};

struct Shared {
    observers: Mutex<Vec<(u64, OnValue)>>,
    latest: Mutex<Option<Value>>,
    replay: bool,
    next_id: AtomicU64,
}

/// Hot stream pushed by [`Subject::next`]. Cloning shares the same observers.
#[derive(Clone)]
pub struct Subject {
    shared: Arc<Shared>,
}

impl Subject {
    /// Creates a subject without a stored value.
    pub fn new() -> Self {
        Self::build(None, false)
    }

    /// Creates a subject that stores `initial` and replays its latest value.
    pub fn with_value(initial: Value) -> Self {
        Self::build(Some(initial), true)
    }

    fn build(latest: Option<Value>, replay: bool) -> Self {
        Self {
            shared: Arc::new(Shared {
                observers: Mutex::new(Vec::new()),
                latest: Mutex::new(latest),
                replay,
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Pushes `value` to every subscriber.
    pub fn next(&self, value: Value) {
        if self.shared.replay {
            *self.shared.latest.lock() = Some(value.clone());
        }
        let snapshot: Vec<OnValue> = self
            .shared
            .observers
            .lock()
            .iter()
            .map(|(_, f)| Arc::clone(f))
            .collect();
        for on_value in snapshot {
            on_value(value.clone());
        }
    }

    /// Number of live subscribers.
    pub fn observer_count(&self) -> usize {
        self.shared.observers.lock().len()
    }
}

impl Default for Subject {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueStream for Subject {
    fn subscribe(&self, on_value: OnValue) -> Box<dyn Subscription> {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        self.shared.observers.lock().push((id, Arc::clone(&on_value)));

        if let Some(latest) = self.current() {
            on_value(latest);
        }

        Box::new(SubjectSubscription {
            id,
            shared: Arc::downgrade(&self.shared),
            closed: AtomicBool::new(false),
        })
    }

    fn current(&self) -> Option<Value> {
        if !self.shared.replay {
            return None;
        }
        self.shared.latest.lock().clone()
    }
}

struct SubjectSubscription {
    id: u64,
    shared: Weak<Shared>,
    closed: AtomicBool,
}

impl Subscription for SubjectSubscription {
    fn unsubscribe(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(shared) = self.shared.upgrade() {
            shared.observers.lock().retain(|(id, _)| *id != self.id);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
