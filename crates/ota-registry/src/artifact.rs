// crates/ota-registry/src/artifact.rs
// ============================================================================
// Module: Artifact Ingestion
// Description: Assigns identity to a newly submitted artifact, enforces the
// `(name, depends_idx)` uniqueness rule, and registers its update types.
// Purpose: Keep the uniqueness check in one place rather than relying on a
// document-store index over a derived field (spec §4.3, §8 property 1).
// Dependencies: ota-core
// ============================================================================

//! ## Overview
//! `depends_idx` is never persisted as its own field (see
//! [`ota_core::model::Artifact::depends_idx`]), so a document-store unique
//! index cannot enforce uniqueness over it directly. [`Registry::insert_artifact`]
//! instead loads the current release (if any) and checks the new artifact's
//! expanded `depends_idx` against every existing sibling artifact's before
//! delegating to the store.

use std::collections::BTreeMap;

use ota_core::CancellationToken;
use ota_core::Error;
use ota_core::Result;
use ota_core::depends::DependsMap;
use ota_core::depends::DependsTuple;
use ota_core::depends::depends_idx;
use ota_core::identifiers::ArtifactId;
use ota_core::identifiers::ReleaseName;
use ota_core::identifiers::TenantId;
use ota_core::model::Artifact;
use ota_core::model::UpdateDescriptor;
use ota_core::time::Timestamp;

use crate::Registry;

/// The caller-supplied fields of a new artifact; `id` and `modified` are
/// assigned by the registry, not the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArtifact {
    /// Release this artifact belongs to.
    pub name: ReleaseName,
    /// Optional user-editable description.
    pub description: Option<String>,
    /// Artifact size in bytes.
    pub size: u64,
    /// Non-empty list of compatible device types.
    pub device_types_compatible: Vec<String>,
    /// Attribute constraints the resolver matches against.
    pub depends: DependsMap,
    /// Attributes this artifact provides once installed.
    pub provides: BTreeMap<String, String>,
    /// Update-type descriptors carried by this artifact.
    pub updates: Vec<UpdateDescriptor>,
}

fn conflict_attributes(tuple: &DependsTuple) -> serde_json::Map<String, serde_json::Value> {
    tuple.iter().map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone()))).collect()
}

impl Registry {
    /// Validates, assigns identity to, and inserts a new artifact (spec
    /// §4.3).
    ///
    /// # Errors
    ///
    /// Returns [`ota_core::Kind::Validation`] when `device_types_compatible`
    /// is empty or `depends` omits [`ota_core::depends::DEVICE_TYPE_KEY`],
    /// and [`ota_core::Kind::Conflict`] when the new artifact's
    /// `depends_idx` overlaps an existing sibling artifact's.
    pub async fn insert_artifact(&self, tenant: &TenantId, new_artifact: NewArtifact, now: Timestamp, cancel: &CancellationToken) -> Result<Artifact> {
        cancel.check()?;
        if new_artifact.device_types_compatible.is_empty() {
            return Err(Error::validation("artifact.device_types_compatible.empty", "device_types_compatible must not be empty"));
        }
        if !new_artifact.depends.contains_key(ota_core::depends::DEVICE_TYPE_KEY) {
            return Err(Error::validation("artifact.depends.missing_device_type", "depends must contain the device_type key"));
        }

        let artifact = Artifact {
            id: ArtifactId::generate(),
            name: new_artifact.name,
            description: new_artifact.description,
            size: new_artifact.size,
            modified: now,
            device_types_compatible: new_artifact.device_types_compatible,
            depends: new_artifact.depends,
            provides: new_artifact.provides,
            updates: new_artifact.updates,
        };
        let candidate_idx = artifact.depends_idx();

        if let Some(release) = self.store.get_release(tenant, &artifact.name, cancel).await? {
            for sibling in &release.artifacts {
                let sibling_idx = depends_idx(&sibling.depends);
                if let Some(overlap) = candidate_idx.iter().find(|tuple| sibling_idx.contains(tuple)) {
                    return Err(Error::conflict_err(
                        "artifact.depends_conflict",
                        format!("an artifact named '{}' with an overlapping depends_idx already exists", artifact.name),
                        conflict_attributes(overlap),
                    ));
                }
            }
        }

        let inserted = self.store.insert_artifact(tenant, artifact, cancel).await?;
        for update_type in inserted.update_type_names() {
            self.store.register_update_type(tenant, update_type, cancel).await?;
        }
        tracing::info!(artifact_id = %inserted.id, release = %inserted.name, "artifact inserted");
        Ok(inserted)
    }

    /// Deletes an artifact, decrementing (and possibly deleting) its
    /// release.
    pub async fn delete_artifact(&self, tenant: &TenantId, id: ArtifactId, cancel: &CancellationToken) -> Result<()> {
        self.store.delete_artifact(tenant, id, cancel).await
    }

    /// Fetches a single artifact by id.
    pub async fn get_artifact(&self, tenant: &TenantId, id: ArtifactId, cancel: &CancellationToken) -> Result<Option<Artifact>> {
        self.store.get_artifact(tenant, id, cancel).await
    }
}
