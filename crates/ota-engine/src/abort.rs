// crates/ota-engine/src/abort.rs
// ============================================================================
// Module: Abort & Decommission
// Description: Bulk-terminates device-deployments, either for one
// deployment (operator abort) or one device (decommissioning).
// Purpose: Implement deployment engine rules 4-5.
// Dependencies: ota-core
// ============================================================================

use ota_core::CancellationToken;
use ota_core::Result;
use ota_core::identifiers::DeploymentId;
use ota_core::identifiers::DeviceId;
use ota_core::identifiers::TenantId;
use ota_core::time::Timestamp;

use crate::Engine;

impl Engine {
    /// Transitions every non-terminal device-deployment of `deployment_id`
    /// to `aborted` and finishes the deployment (spec §4.5, rule 4).
    ///
    /// Returns the number of device-deployments aborted.
    pub async fn abort_deployment(&self, tenant: &TenantId, deployment_id: DeploymentId, now: Timestamp, cancel: &CancellationToken) -> Result<u64> {
        cancel.check()?;
        let aborted_count = self.store.abort_deployment_device_deployments(tenant, deployment_id, now, cancel).await?;
        self.store.reconcile_deployment_stats(tenant, deployment_id, cancel).await?;
        tracing::info!(deployment_id = %deployment_id, aborted_count, "deployment aborted");
        Ok(aborted_count)
    }

    /// Terminates every non-terminal device-deployment of `device_id` as
    /// `decommissioned`, across every deployment that targets it (spec
    /// §4.5, rule 5).
    ///
    /// Returns the number of device-deployments decommissioned.
    pub async fn decommission_device(&self, tenant: &TenantId, device_id: DeviceId, now: Timestamp, cancel: &CancellationToken) -> Result<u64> {
        cancel.check()?;
        let count = self.store.decommission_device_deployments(tenant, device_id, now, cancel).await?;
        tracing::info!(device_id = %device_id, decommissioned_count = count, "device decommissioned");
        Ok(count)
    }
}
