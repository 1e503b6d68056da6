// crates/ota-core/src/model/release.rs
// ============================================================================
// Module: Release
// Description: A denormalized grouping of artifacts sharing the same name.
// Purpose: Model the release-as-embedded-artifacts design the registry
// maintains.
// Dependencies: crate::{identifiers, model::artifact, time}, serde
// Non-goals: this type does not enforce the registry's invariants
// (artifacts_count == artifacts.len(), tag cardinality); that is the
// registry's job so those rules stay in one place (`ota-registry`).
// ============================================================================

//! ## Overview
//! A release exists iff it has at least one artifact: deleting an
//! artifact's containing release's last artifact deletes the release
//! document. This type only carries the shape; `ota-registry` owns the
//! lifecycle rule.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::ReleaseName;
use crate::model::artifact::Artifact;
use crate::time::Timestamp;

/// Maximum length of a release's free-form `notes` field.
pub const DEFAULT_NOTES_MAX_LENGTH: usize = 4096;

/// A logical grouping of artifacts that share the same `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Release name; primary key within a tenant.
    pub name: ReleaseName,
    /// Last modification time, bumped on every mutation.
    pub modified: Timestamp,
    /// Embedded artifact snapshots.
    pub artifacts: Vec<Artifact>,
    /// Count of embedded artifacts; must equal `artifacts.len()`.
    pub artifacts_count: u64,
    /// Set of short tag strings.
    pub tags: BTreeSet<String>,
    /// Bounded free-form notes.
    pub notes: String,
    /// Derived set of update types across all member artifacts.
    pub update_types: BTreeSet<String>,
}

impl Release {
    /// Recomputes `update_types` from the current `artifacts` list.
    pub fn recompute_update_types(&mut self) {
        self.update_types =
            self.artifacts.iter().flat_map(Artifact::update_type_names).map(str::to_string).collect();
    }

    /// Returns true if the release's invariant `artifacts_count ==
    /// artifacts.len()` holds.
    #[must_use]
    pub fn is_count_consistent(&self) -> bool {
        self.artifacts_count == self.artifacts.len() as u64
    }
}
