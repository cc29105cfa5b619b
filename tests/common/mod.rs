#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use mountbus::{EmitCallback, EmitEvent, HandlerResult};
use serde_json::Value;

/// Shared log of payloads or outcomes seen by handlers/callbacks.
#[derive(Clone, Default)]
pub struct Seen<T> {
    inner: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone> Seen<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push(&self, v: T) {
        self.inner.lock().unwrap().push(v);
    }

    pub fn all(&self) -> Vec<T> {
        self.inner.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}

/// Fire handler that records `params` and returns no result.
pub fn record(seen: &Seen<Value>) -> impl Fn(&EmitEvent) -> HandlerResult + Send + Sync + 'static {
    let seen = seen.clone();
    move |ev: &EmitEvent| {
        seen.push(ev.params.clone());
        Ok(None)
    }
}

/// Callback that records the outcome and succeeds.
pub fn capture(seen: &Seen<HandlerResult>) -> EmitCallback {
    let seen = seen.clone();
    Box::new(move |outcome| {
        seen.push(outcome);
        Ok(())
    })
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
