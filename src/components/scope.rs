//! # Lifecycle method wrapper.
//!
//! [`PhaseScope`] ties a piece of code to a lifecycle transition, the way a
//! component's `mount()` / `unmount()` methods would:
//!
//! ```text
//! PhaseScope::new(&bus, DidMount).run(|| self.load())
//!     ├─ order = Before ─► enter(DidMount) ─► f()
//!     └─ order = After  ─► f() ─► enter(DidMount)      (default)
//! ```
//!
//! An optional callback receives the hook outcome (callback-style transition).

use std::sync::Arc;

use crate::core::{EmitCallback, Emitter, LifecyclePhase};
use crate::error::{EmitError, HandlerResult};

/// Whether the transition runs before or after the wrapped code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseOrder {
    /// Transition first, then the wrapped code.
    Before,
    /// Wrapped code first, then the transition.
    #[default]
    After,
}

type OutcomeFn = Arc<dyn Fn(HandlerResult) + Send + Sync>;

/// Runs code around a lifecycle transition.
#[derive(Clone)]
pub struct PhaseScope {
    emitter: Emitter,
    phase: LifecyclePhase,
    order: PhaseOrder,
    callback: Option<OutcomeFn>,
}

impl PhaseScope {
    /// Creates a scope that enters `phase` after the wrapped code.
    pub fn new(emitter: &Emitter, phase: LifecyclePhase) -> Self {
        Self {
            emitter: emitter.clone(),
            phase,
            order: PhaseOrder::default(),
            callback: None,
        }
    }

    /// Sets when the transition happens.
    pub fn with_order(mut self, order: PhaseOrder) -> Self {
        self.order = order;
        self
    }

    /// Runs the transition in callback style, reporting the hook outcome.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(HandlerResult) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Runs `f` and triggers the transition in the configured order.
    ///
    /// A transition error (fire-and-forget mode only) is returned; when the
    /// transition comes first and fails, `f` does not run.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> Result<R, EmitError> {
        if self.order == PhaseOrder::Before {
            self.trigger()?;
        }
        let out = f();
        if self.order == PhaseOrder::After {
            self.trigger()?;
        }
        Ok(out)
    }

    fn trigger(&self) -> Result<(), EmitError> {
        let callback = self.callback.clone().map(|report| -> EmitCallback {
            Box::new(move |outcome| {
                report(outcome);
                Ok(())
            })
        });
        self.emitter.enter_with(self.phase, callback, Vec::new())
    }
}
