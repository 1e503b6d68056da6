// crates/ota-uploads/src/complete.rs
// ============================================================================
// Module: Complete Upload
// Description: Promotes a finished upload intent into a registered
// artifact, trusting only what `stat_object` observes in blob storage.
// Purpose: Implement the "Complete Upload" operation (spec §4.6), enforcing
// the same `(name, depends_idx)` uniqueness rule inline artifact submission
// goes through (spec §4.3, §8 property 1).
// Dependencies: ota-core
// ============================================================================

//! ## Overview
//! The uploaded artifact's size is never taken from the caller's claim; it
//! is read back from blob storage via [`ota_core::BlobGateway::stat_object`].
//! A missing object (the caller never actually uploaded) surfaces as
//! [`ota_core::Kind::NotFound`] rather than silently registering a
//! zero-byte artifact.

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
use ota_core::model::UploadStatus;
use ota_core::time::Timestamp;

use crate::UploadCoordinator;

/// The caller-supplied metadata of a completed upload; everything an
/// inline [`ota_registry::artifact::NewArtifact`]-style submission would
/// carry except `name` and `size`, which come from the intent and from
/// blob storage respectively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCompletion {
    /// Optional user-editable description.
    pub description: Option<String>,
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

impl UploadCoordinator {
    /// Validates the uploaded object against `completion`, registers it as
    /// an artifact keeping the intent's `artifact_id`, and marks the intent
    /// completed (spec §4.6, "Complete Upload").
    ///
    /// # Errors
    ///
    /// Returns [`ota_core::Kind::NotFound`] if no pending intent exists for
    /// `artifact_id` or the object was never uploaded,
    /// [`ota_core::Kind::Validation`] for the same shape checks
    /// `ota-registry`'s inline submission enforces, and
    /// [`ota_core::Kind::Conflict`] on a `depends_idx` collision with an
    /// existing sibling artifact.
    pub async fn complete_upload(&self, tenant: &TenantId, artifact_id: ArtifactId, completion: UploadCompletion, now: Timestamp, cancel: &CancellationToken) -> Result<Artifact> {
        cancel.check()?;
        let intent = self
            .store
            .get_upload_intent(tenant, artifact_id, cancel)
            .await?
            .ok_or_else(|| Error::not_found("upload.complete.not_found", "upload intent not found"))?;
        if intent.status != UploadStatus::Pending {
            return Err(Error::state_invalid("upload.complete.not_pending", "upload intent is no longer pending"));
        }
        if completion.device_types_compatible.is_empty() {
            return Err(Error::validation("upload.complete.device_types_compatible.empty", "device_types_compatible must not be empty"));
        }
        if !completion.depends.contains_key(ota_core::depends::DEVICE_TYPE_KEY) {
            return Err(Error::validation("upload.complete.depends.missing_device_type", "depends must contain the device_type key"));
        }

        let size = self.blobs.stat_object(&intent.object_key, cancel).await?;
        let release_name = ReleaseName::new(intent.release_name.clone()).map_err(|message| Error::validation("upload.complete.release_name.invalid", message))?;

        let artifact = Artifact {
            id: artifact_id,
            name: release_name,
            description: completion.description,
            size,
            modified: now,
            device_types_compatible: completion.device_types_compatible,
            depends: completion.depends,
            provides: completion.provides,
            updates: completion.updates,
        };
        let candidate_idx = artifact.depends_idx();
        if let Some(release) = self.store.get_release(tenant, &artifact.name, cancel).await? {
            for sibling in &release.artifacts {
                let sibling_idx = depends_idx(&sibling.depends);
                if let Some(overlap) = candidate_idx.iter().find(|tuple| sibling_idx.contains(tuple)) {
                    return Err(Error::conflict_err(
                        "upload.complete.depends_conflict",
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
        self.store.transition_upload_intent(tenant, artifact_id, UploadStatus::Pending, UploadStatus::Completed, cancel).await?;
        tracing::info!(artifact_id = %inserted.id, release = %inserted.name, "upload completed and artifact registered");
        Ok(inserted)
    }
}
