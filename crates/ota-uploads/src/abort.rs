// crates/ota-uploads/src/abort.rs
// ============================================================================
// Module: Abort Upload
// Description: Lets a caller abandon a pending upload intent before it
// completes or expires.
// Purpose: Implement the "Abort Upload" operation (spec §4.6).
// Dependencies: ota-core
// ============================================================================

use ota_core::CancellationToken;
use ota_core::Result;
use ota_core::identifiers::ArtifactId;
use ota_core::identifiers::TenantId;
use ota_core::model::UploadStatus;

use crate::UploadCoordinator;

impl UploadCoordinator {
    /// Transitions `artifact_id`'s pending upload intent to `aborted` and
    /// best-effort deletes any partially uploaded object.
    ///
    /// # Errors
    ///
    /// Returns [`ota_core::Kind::NotFound`] when no pending intent exists
    /// for `artifact_id`.
    pub async fn abort_upload(&self, tenant: &TenantId, artifact_id: ArtifactId, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        let intent = self.store.transition_upload_intent(tenant, artifact_id, UploadStatus::Pending, UploadStatus::Aborted, cancel).await?;
        if let Err(error) = self.blobs.delete_object(&intent.object_key, cancel).await {
            tracing::warn!(error = %error, object_key = %intent.object_key, "best-effort delete of aborted upload object failed");
        }
        tracing::info!(artifact_id = %artifact_id, "upload intent aborted");
        Ok(())
    }
}
