//! # Emitter configuration.
//!
//! Provides [`Config`], the settings an [`Emitter`](crate::Emitter) is built with.
//!
//! ## Defaults
//! - `defer_until_mount = true` → pre-mount calls are buffered until `DidMount`
//! - `drain_losers = true` → bail-race losers keep running after a winner
//! - `bridge_prefix = "stream"` → generated bridge services look like `stream:<uuid>`

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emitter settings.
///
/// ## Field semantics
/// - `defer_until_mount`: buffer dispatches while the phase is `Unknown`/`WillMount`
///   (`false` = always dispatch immediately)
/// - `drain_losers`: after an async race is decided, keep the remaining handler
///   futures running on the ambient runtime (`false` = drop them)
/// - `bridge_prefix`: prefix for service names generated by
///   [`StreamBridge`](crate::StreamBridge) (empty = bare uuid)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Buffer dispatches until the emitter reaches `DidMount`.
    pub defer_until_mount: bool,

    /// Keep bail-race losers running after the winner is known.
    pub drain_losers: bool,

    /// Prefix of generated stream service names.
    pub bridge_prefix: String,
}

impl Config {
    /// Builds a stream service name from a generated id.
    #[inline]
    pub fn bridge_service(&self, id: Uuid) -> String {
        if self.bridge_prefix.is_empty() {
            id.to_string()
        } else {
            format!("{}:{id}", self.bridge_prefix)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defer_until_mount: true,
            drain_losers: true,
            bridge_prefix: "stream".to_string(),
        }
    }
}
