// crates/ota-engine/src/lib.rs
// ============================================================================
// Crate: ota-engine
// Description: Drives a device-deployment through its state machine —
// assignment, status reporting, completion detection, abort, and
// decommissioning.
// Purpose: Own every `Store` call that mutates a `Deployment` or
// `DeviceDeployment`, so the transition rules live in one place instead of
// being re-derived by each caller.
// Dependencies: ota-core, ota-registry (for dependency resolution)
// ============================================================================

//! ## Overview
//! [`Engine`] wraps an `Arc<dyn Store>` the same way [`ota_registry::Registry`]
//! does, plus an optional [`ota_core::Notifier`] for best-effort outbound
//! events. Every mutating call here validates against
//! [`ota_core::model::DeviceDeploymentStatus::is_transition_allowed`] by
//! delegating to the store, which re-checks atomically; the engine never
//! assumes a read it took is still current by the time it writes.

use std::sync::Arc;

use ota_core::Store;
use ota_core::traits::Notifier;

pub mod abort;
pub mod assignment;
pub mod phases;
pub mod status;

#[cfg(test)]
mod test_support;

/// Drives deployment and device-deployment lifecycle transitions on top of a
/// [`Store`].
pub struct Engine {
    store: Arc<dyn Store>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl Engine {
    /// Builds an engine over `store`, optionally wired to `notifier` for
    /// best-effort outbound events.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self { store, notifier }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }
}
