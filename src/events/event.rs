//! # Event envelope passed to handlers.
//!
//! Every handler receives an [`EmitEvent`]: the caller's payload under `params`
//! and an optional correlation id. Payloads are plain JSON values so that
//! handlers registered by unrelated components can share a service.
//!
//! ## Example
//! ```rust
//! use mountbus::EmitEvent;
//! use serde_json::json;
//!
//! let ev = EmitEvent::new(json!({"price": 123})).with_callback_id(7);
//!
//! assert_eq!(ev.params["price"], 123);
//! assert_eq!(ev.callback_id, Some(7));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload wrapper delivered to every handler.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EmitEvent {
    /// Caller supplied payload.
    pub params: Value,
    /// Optional correlation id chosen by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<u64>,
}

impl EmitEvent {
    /// Wraps a payload.
    pub fn new(params: impl Into<Value>) -> Self {
        Self {
            params: params.into(),
            callback_id: None,
        }
    }

    /// Attaches a correlation id.
    #[inline]
    pub fn with_callback_id(mut self, id: u64) -> Self {
        self.callback_id = Some(id);
        self
    }
}

impl From<Value> for EmitEvent {
    fn from(params: Value) -> Self {
        Self::new(params)
    }
}
