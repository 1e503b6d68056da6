// crates/ota-registry/src/lib.rs
// ============================================================================
// Crate: ota-registry
// Description: Artifact/Release Registry, Dependency Resolver, and the
// Limits & Update-Type Registry (spec §4.3, §4.4, and the limits section).
// Purpose: Own every rule that governs what an artifact/release looks like
// and which artifact a device resolves to, on top of the plain CRUD
// `ota_core::Store` exposes.
// Dependencies: ota-core, tracing
// ============================================================================

//! # ota-registry
//!
//! [`Registry`] wraps an `Arc<dyn ota_core::Store>` and adds the
//! application-level invariants the store itself does not enforce:
//! `(name, depends_idx)` uniqueness, release lifecycle bookkeeping, tag
//! cardinality, notes length, and update-type registration. [`resolver`] is
//! pure and store-free: it matches a device description against an
//! in-memory [`ota_core::model::Release`].

pub mod artifact;
pub mod limits;
pub mod release;
pub mod resolver;


use std::sync::Arc;

use ota_core::Store;

/// Entry point for every registry operation, holding the backing store.
///
/// # Invariants
/// - Every method validates and enforces registry-level invariants before
///   delegating to `store`; the store itself trusts its caller.
pub struct Registry {
    store: Arc<dyn Store>,
}

impl Registry {
    /// Wraps `store` in a new registry.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Returns the underlying store, for callers (e.g. `ota-engine`) that
    /// need direct access alongside registry-level operations.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }
}
