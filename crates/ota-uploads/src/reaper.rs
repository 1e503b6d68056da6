// crates/ota-uploads/src/reaper.rs
// ============================================================================
// Module: Expiry Reaper
// Description: Sweeps upload intents whose caller never completed or
// aborted them before `expires_at`.
// Purpose: Implement the expiry half of the upload-intent lifecycle (spec
// §4.6) as a background task, the same shape as any other periodic worker
// in this workspace.
// Dependencies: ota-core, tokio (tests only; the loop itself only needs
// `tokio::time`, pulled in transitively by a caller that enables it)
// ============================================================================

//! ## Overview
//! [`UploadCoordinator::run_reaper_once`] sweeps one tenant's expired
//! intents. `Store` has no tenant-enumeration primitive, so this crate
//! cannot own a self-scheduling multi-tenant loop; a host binary drives
//! this per tenant on its own interval instead. One expired intent failing
//! to transition (already raced by a concurrent completion, say) never
//! aborts the sweep — it is logged and the loop moves to the next intent.

use ota_core::CancellationToken;
use ota_core::Result;
use ota_core::identifiers::TenantId;
use ota_core::model::UploadStatus;
use ota_core::time::Timestamp;

use crate::UploadCoordinator;

impl UploadCoordinator {
    /// Reaps every pending intent of `tenant` whose `expires_at` is at or
    /// before `now`, returning the number of intents expired.
    pub async fn run_reaper_once(&self, tenant: &TenantId, now: Timestamp, cancel: &CancellationToken) -> Result<u64> {
        cancel.check()?;
        let expired = self.store.find_expired_upload_intents(tenant, now, cancel).await?;
        let mut reaped = 0;
        for intent in expired {
            cancel.check()?;
            match self.store.transition_upload_intent(tenant, intent.artifact_id, UploadStatus::Pending, UploadStatus::Expired, cancel).await {
                Ok(_) => {
                    if let Err(error) = self.blobs.delete_object(&intent.object_key, cancel).await {
                        tracing::warn!(error = %error, object_key = %intent.object_key, "best-effort delete of expired upload object failed");
                    }
                    reaped += 1;
                }
                Err(error) => {
                    tracing::warn!(error = %error, artifact_id = %intent.artifact_id, "failed to expire upload intent, skipping");
                }
            }
        }
        if reaped > 0 {
            tracing::info!(reaped, "expired upload intents reaped");
        }
        Ok(reaped)
    }
}
