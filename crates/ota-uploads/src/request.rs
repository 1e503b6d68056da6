// crates/ota-uploads/src/request.rs
// ============================================================================
// Module: Request Upload
// Description: Reserves an artifact id and issues a presigned destination
// for a caller to upload artifact bytes directly to blob storage.
// Purpose: Implement the "Request Upload" operation (spec §4.6).
// Dependencies: ota-core
// ============================================================================

use ota_core::CancellationToken;
use ota_core::Result;
use ota_core::identifiers::ArtifactId;
use ota_core::identifiers::TenantId;
use ota_core::model::UploadIntent;
use ota_core::model::UploadMethod;
use ota_core::model::UploadStatus;
use ota_core::time::Timestamp;
use ota_core::traits::PresignedRequest;

use crate::UploadCoordinator;

/// The caller-supplied fields of a new upload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Release name the artifact will belong to once the upload completes.
    pub release_name: String,
    /// Upload method the caller intends to use.
    pub method: UploadMethod,
    /// How long the presigned destination stays valid, and how long the
    /// caller has to call [`UploadCoordinator::complete_upload`] before the
    /// reaper expires the intent.
    pub ttl: std::time::Duration,
}

fn object_key(tenant: &TenantId, release_name: &str, artifact_id: ArtifactId) -> String {
    format!("{}/{release_name}/{artifact_id}", tenant.as_str())
}

impl UploadCoordinator {
    /// Reserves an artifact id and issues a presigned upload destination
    /// (spec §4.6, "Request Upload").
    pub async fn request_upload(&self, tenant: &TenantId, request: UploadRequest, now: Timestamp, cancel: &CancellationToken) -> Result<(UploadIntent, PresignedRequest)> {
        cancel.check()?;
        let artifact_id = ArtifactId::generate();
        let key = object_key(tenant, &request.release_name, artifact_id);
        let presigned = self.blobs.put_request(&key, request.ttl, cancel).await?;

        let ttl = time::Duration::try_from(request.ttl).unwrap_or(time::Duration::ZERO);
        let intent = UploadIntent {
            artifact_id,
            release_name: request.release_name,
            method: request.method,
            object_key: key,
            created: now,
            expires_at: now.add(ttl),
            status: UploadStatus::Pending,
        };
        let inserted = self.store.insert_upload_intent(tenant, intent, cancel).await?;
        tracing::info!(artifact_id = %inserted.artifact_id, object_key = %inserted.object_key, "upload intent created");
        Ok((inserted, presigned))
    }
}
