//! # Lifecycle phases and the per-phase hooks.
//!
//! The emitter records exactly one [`LifecyclePhase`] at a time. Transitions
//! are **not** validated: any phase may follow any other, the emitter simply
//! stores the latest one.
//!
//! ```text
//! Unknown ─┐
//! WillMount┼──► (dispatch deferred until DidMount)
//!          │
//! DidMount ┼──► dispatch immediately
//! WillUnmount
//! DidUnmount
//! ```
//!
//! Each phase except `Unknown` owns one sync and one async hook. The DidMount
//! sync hook also carries the one-shot slots used for pre-mount deferral.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use crate::hooks::{AsyncHook, SyncHook};

/// Lifecycle milestone of the emitter.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LifecyclePhase {
    /// Initial phase and the phase after a reset.
    #[default]
    Unknown = 0,
    /// Mounting has started; dispatch is still deferred.
    WillMount = 1,
    /// Mounted; deferred dispatches have been replayed.
    DidMount = 2,
    /// Unmounting has started.
    WillUnmount = 3,
    /// Unmounted.
    DidUnmount = 4,
}

impl LifecyclePhase {
    /// Phases that own hooks, in hook-slot order.
    pub const TRANSITIONS: [LifecyclePhase; 4] = [
        LifecyclePhase::WillMount,
        LifecyclePhase::DidMount,
        LifecyclePhase::WillUnmount,
        LifecyclePhase::DidUnmount,
    ];

    /// Returns true while dispatch must be deferred.
    #[inline]
    pub fn is_pre_mount(self) -> bool {
        matches!(self, LifecyclePhase::Unknown | LifecyclePhase::WillMount)
    }

    /// Returns a short stable label for logs.
    pub fn as_label(self) -> &'static str {
        match self {
            LifecyclePhase::Unknown => "unknown",
            LifecyclePhase::WillMount => "will_mount",
            LifecyclePhase::DidMount => "did_mount",
            LifecyclePhase::WillUnmount => "will_unmount",
            LifecyclePhase::DidUnmount => "did_unmount",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => LifecyclePhase::WillMount,
            2 => LifecyclePhase::DidMount,
            3 => LifecyclePhase::WillUnmount,
            4 => LifecyclePhase::DidUnmount,
            _ => LifecyclePhase::Unknown,
        }
    }

    /// Hook slot of this phase; `Unknown` has none.
    fn slot(self) -> Option<usize> {
        match self {
            LifecyclePhase::Unknown => None,
            LifecyclePhase::WillMount => Some(0),
            LifecyclePhase::DidMount => Some(1),
            LifecyclePhase::WillUnmount => Some(2),
            LifecyclePhase::DidUnmount => Some(3),
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Atomic holder of the current phase.
#[derive(Debug, Default)]
pub(crate) struct PhaseCell(AtomicU8);

impl PhaseCell {
    pub(crate) fn load(&self) -> LifecyclePhase {
        LifecyclePhase::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Stores `phase` and returns the previous one.
    pub(crate) fn swap(&self, phase: LifecyclePhase) -> LifecyclePhase {
        LifecyclePhase::from_u8(self.0.swap(phase as u8, Ordering::AcqRel))
    }
}

/// Sync and async hook per transition phase.
#[derive(Default)]
pub(crate) struct LifecycleHooks {
    sync: [SyncHook; 4],
    asynchronous: [AsyncHook; 4],
}

impl LifecycleHooks {
    pub(crate) fn sync(&self, phase: LifecyclePhase) -> Option<&SyncHook> {
        phase.slot().map(|i| &self.sync[i])
    }

    pub(crate) fn asynchronous(&self, phase: LifecyclePhase) -> Option<&AsyncHook> {
        phase.slot().map(|i| &self.asynchronous[i])
    }

    /// The hook pre-mount deferrals are parked on.
    pub(crate) fn did_mount(&self) -> &SyncHook {
        &self.sync[1]
    }

    pub(crate) fn clear(&self) {
        for hook in &self.sync {
            hook.clear();
        }
        for hook in &self.asynchronous {
            hook.clear();
        }
    }
}
