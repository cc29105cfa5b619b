//! # Keyed map of lazily created hooks.
//!
//! [`HookMap`] maps a service name to its hook and keeps a ledger of every
//! service name that has had a hook materialized.
//!
//! ## Rules
//! - [`for_service`](HookMap::for_service) creates the hook on first reference
//!   (exactly once, even under concurrent access) and records the name.
//! - [`get`](HookMap::get) never creates.
//! - [`remove`](HookMap::remove) drops both the hook and the ledger entry; idempotent.
//! - The ledger is separate from the map so teardown and introspection never
//!   need to walk hook internals.

use std::sync::Arc;

use dashmap::{DashMap, DashSet};

/// Service-name keyed hooks with a subscription ledger.
pub struct HookMap<H> {
    hooks: DashMap<String, Arc<H>>,
    ledger: DashSet<String>,
}

impl<H: Default> HookMap<H> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            hooks: DashMap::new(),
            ledger: DashSet::new(),
        }
    }

    /// Returns the hook for `service`, creating it if absent.
    pub fn for_service(&self, service: &str) -> Arc<H> {
        if let Some(hook) = self.hooks.get(service) {
            return Arc::clone(hook.value());
        }

        let hook = {
            let entry = self
                .hooks
                .entry(service.to_string())
                .or_insert_with(|| Arc::new(H::default()));
            Arc::clone(entry.value())
        };
        if self.ledger.insert(service.to_string()) {
            tracing::trace!(service, "hook materialized");
        }
        hook
    }
}

impl<H> HookMap<H> {
    /// Returns the hook for `service` without creating it.
    pub fn get(&self, service: &str) -> Option<Arc<H>> {
        self.hooks.get(service).map(|h| Arc::clone(h.value()))
    }

    /// Returns true if the ledger records `service`.
    pub fn contains(&self, service: &str) -> bool {
        self.ledger.contains(service)
    }

    /// Removes the hook and the ledger entry for `service`.
    ///
    /// Returns true if anything was removed.
    pub fn remove(&self, service: &str) -> bool {
        let ledger = self.ledger.remove(service).is_some();
        let hook = self.hooks.remove(service).is_some();
        ledger || hook
    }

    /// Drops every hook and clears the ledger.
    pub fn clear(&self) {
        self.ledger.clear();
        self.hooks.clear();
    }

    /// Returns the sorted list of service names in the ledger.
    pub fn services(&self) -> Vec<String> {
        let mut names: Vec<String> = self.ledger.iter().map(|s| s.key().clone()).collect();
        names.sort_unstable();
        names
    }

    /// Number of materialized hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns true if no hook exists.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl<H: Default> Default for HookMap<H> {
    fn default() -> Self {
        Self::new()
    }
}
