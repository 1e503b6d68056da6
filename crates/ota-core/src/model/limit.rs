// crates/ota-core/src/model/limit.rs
// ============================================================================
// Module: Limit
// Description: A named, tenant-scoped numeric ceiling.
// Purpose: Give operators a generic knob (e.g. max parallel in-progress
// deployments) without a dedicated type per limit name.
// Dependencies: serde
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

/// A named, tenant-scoped numeric ceiling.
///
/// # Invariants
/// - `name` is unique within a tenant (enforced by the store's unique
///   index, not by this type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    /// Limit name (e.g. `"max_active_deployments"`).
    pub name: String,
    /// The configured ceiling value.
    pub value: u64,
}

impl Limit {
    /// Returns true if `current` has reached or exceeded this limit.
    #[must_use]
    pub fn is_exceeded_by(&self, current: u64) -> bool {
        current >= self.value
    }
}
