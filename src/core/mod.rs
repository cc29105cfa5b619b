//! Runtime core: lifecycle state machine and dispatch engine.
//!
//! The public API from this module is [`Emitter`] (with its builder and
//! configuration) and [`LifecyclePhase`].
//!
//! Internal modules:
//! - [`lifecycle`]: phases, atomic phase cell, per-phase hooks;
//! - [`emitter`]: registry operations and the three dispatch protocols;
//! - [`builder`]: wiring lifecycle handlers before first use;
//! - [`config`]: emitter settings.

mod builder;
mod config;
mod emitter;
mod lifecycle;

pub use builder::EmitterBuilder;
pub use config::Config;
pub use emitter::{EmitCallback, EmitFuture, Emitter, SubscriptionLedger};
pub use lifecycle::LifecyclePhase;
