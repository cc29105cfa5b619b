//! # Service hooks: handler storage and bail dispatch.
//!
//! A hook is the dispatchable object bound to one service name. Two variants
//! exist and live in separate keyed maps:
//!
//! ```text
//!                 ┌──────────────────────────────┐
//!  register ────► │ HookMap<SyncHook>   (Fire)   │ ──► call():     in order, bail on first Some/Err
//!                 ├──────────────────────────────┤
//!                 │ HookMap<AsyncHook>  (Cb/Pr)  │ ──► dispatch(): all at once, first Some/Err wins
//!                 └──────────────────────────────┘
//!                        │
//!                        └─► ledger: every service name ever materialized
//! ```
//!
//! ## Rules
//! - Taps are keyed by subscriber id; tapping an existing id is a no-op.
//! - Tap lists are snapshotted before invocation; no lock is held while a
//!   handler runs, so handlers may re-enter the emitter.
//! - Hooks are created lazily on first reference.

mod async_hook;
mod handler;
mod hook_map;
mod listen;
mod sync_hook;

pub use async_hook::AsyncHook;
pub use handler::{AsyncHandler, Handler, Responder, SyncHandler};
pub use hook_map::HookMap;
pub use listen::{Listen, ListenFn};
pub use sync_hook::SyncHook;

use std::fmt;

/// Tag of the two hook variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Sequential bail hook used by fire-and-forget handlers.
    Sync,
    /// Parallel bail-race hook used by callback and promise handlers.
    Async,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::Sync => f.write_str("sync"),
            HookKind::Async => f.write_str("async"),
        }
    }
}
