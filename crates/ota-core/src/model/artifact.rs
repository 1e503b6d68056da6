// crates/ota-core/src/model/artifact.rs
// ============================================================================
// Module: Artifact (Image)
// Description: One signed binary package available for deployment.
// Purpose: Carry the fields the registry uniqueness rule and the resolver
// matching algorithm both depend on.
// Dependencies: crate::{depends, identifiers, time}, serde
// ============================================================================

//! ## Overview
//! An artifact's `(name, depends_idx)` pair is unique within a tenant (spec
//! §3, §4.3); `depends_idx` is computed on demand from `depends` by
//! [`crate::depends::depends_idx`] rather than stored as a separate mutable
//! field, so the two can never drift apart.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::depends::DependsMap;
use crate::depends::DependsTuple;
use crate::depends::depends_idx;
use crate::identifiers::ArtifactId;
use crate::identifiers::ReleaseName;
use crate::time::Timestamp;

/// One update-type descriptor carried by an artifact's `updates` sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDescriptor {
    /// The update type name (e.g. `"rootfs-image"`), matched against the
    /// update-type registry.
    #[serde(rename = "type")]
    pub type_name: String,
}

/// One signed binary package.
///
/// # Invariants
/// - `device_types_compatible` is non-empty.
/// - `depends` always contains [`crate::depends::DEVICE_TYPE_KEY`].
/// - `(name, depends_idx())` is unique within a tenant (enforced by the
///   registry, not by this type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Artifact identifier.
    pub id: ArtifactId,
    /// Release name this artifact belongs to.
    pub name: ReleaseName,
    /// Optional user-editable description.
    pub description: Option<String>,
    /// Artifact size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: Timestamp,
    /// Ordered, non-empty sequence of compatible device types.
    pub device_types_compatible: Vec<String>,
    /// Attribute constraints the resolver matches against device attributes.
    pub depends: DependsMap,
    /// Attributes this artifact, once installed, provides to future matches.
    pub provides: BTreeMap<String, String>,
    /// Ordered sequence of update-type descriptors.
    pub updates: Vec<UpdateDescriptor>,
}

impl Artifact {
    /// Computes the flattened `depends_idx` used for uniqueness indexing.
    #[must_use]
    pub fn depends_idx(&self) -> Vec<DependsTuple> {
        depends_idx(&self.depends)
    }

    /// Returns the distinct update-type names carried by this artifact.
    #[must_use]
    pub fn update_type_names(&self) -> impl Iterator<Item = &str> {
        self.updates.iter().map(|update| update.type_name.as_str())
    }
}
