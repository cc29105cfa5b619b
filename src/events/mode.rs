//! # Dispatch modes.
//!
//! A mode decides which hook map a handler lands in:
//! - [`EmitMode::Fire`] → sync hooks (called inline, bail on first result)
//! - [`EmitMode::Callback`] / [`EmitMode::Promise`] → async hooks (raced)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hooks::HookKind;

/// How a handler is invoked and how an emit is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitMode {
    /// Fire-and-forget. Handlers run synchronously in registration order.
    #[default]
    Fire,
    /// Handler completes through a [`Responder`](crate::Responder).
    Callback,
    /// Handler returns a future.
    Promise,
}

impl EmitMode {
    /// Returns the hook kind a handler with this mode is stored in.
    pub fn hook_kind(self) -> HookKind {
        match self {
            EmitMode::Fire => HookKind::Sync,
            EmitMode::Callback | EmitMode::Promise => HookKind::Async,
        }
    }

    /// Returns a short stable label for logs.
    pub fn as_label(self) -> &'static str {
        match self {
            EmitMode::Fire => "fire",
            EmitMode::Callback => "callback",
            EmitMode::Promise => "promise",
        }
    }
}

impl fmt::Display for EmitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
