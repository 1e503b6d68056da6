// crates/ota-engine/src/assignment.rs
// ============================================================================
// Module: Device Assignment
// Description: Finds (or reuses) the device-deployment a requesting device
// should act on next.
// Purpose: Implement the assignment flow — oldest-active reuse, candidate
// search with phase-quota gating, capacity reservation, dependency
// resolution, and immediate terminal-status collapse for already-installed
// or unmatched devices.
// Dependencies: ota-core, ota-registry
// ============================================================================

//! ## Overview
//! A device asking for work is handed, in order: (a) its existing active
//! device-deployment, if one exists — a device never gets two active
//! assignments at once; (b) failing that, the oldest eligible deployment
//! with remaining phase/capacity quota, admitting it with whatever
//! [`ota_registry::resolver::resolve_for_device`] decides. A deployment
//! that has no matching artifact, or whose artifact the device already has,
//! still consumes one unit of capacity — the device is not offered to the
//! deployment again.

use std::collections::BTreeMap;

use ota_core::CancellationToken;
use ota_core::Result;
use ota_core::identifiers::DeviceDeploymentId;
use ota_core::identifiers::DeviceId;
use ota_core::identifiers::TenantId;
use ota_core::model::Deployment;
use ota_core::model::DeviceDeployment;
use ota_core::model::DeviceDeploymentStatus;
use ota_core::store_types::CapacityOutcome;
use ota_core::store_types::DeploymentCandidateFilter;
use ota_core::store_types::DeviceDescription;
use ota_core::time::Timestamp;
use ota_registry::resolver::Resolution;
use ota_registry::resolver::resolve_for_device;

use crate::Engine;
use crate::phases::is_admission_eligible;

impl Engine {
    /// Returns the device-deployment a device should act on next, admitting
    /// it to the oldest eligible deployment with remaining quota if it has
    /// none active already. Returns `Ok(None)` when no deployment currently
    /// has room for this device.
    #[allow(clippy::too_many_arguments, reason = "each parameter is an independent piece of the caller's assignment request")]
    pub async fn assign_device(
        &self,
        tenant: &TenantId,
        device_id: DeviceId,
        device_group: Option<&str>,
        device_description: &DeviceDescription,
        device_provides: &BTreeMap<String, String>,
        now: Timestamp,
        cancel: &CancellationToken,
    ) -> Result<Option<DeviceDeployment>> {
        cancel.check()?;

        if let Some(existing) = self.store.get_oldest_active_device_deployment(tenant, device_id, cancel).await? {
            return Ok(Some(existing));
        }

        let filter = DeploymentCandidateFilter { group: device_group.map(str::to_string), exclude_deployment_ids: Vec::new() };
        let mut candidates = self.store.find_candidate_deployments(tenant, &filter, cancel).await?;
        candidates.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.get().cmp(&b.id.get())));

        for candidate in candidates {
            cancel.check()?;
            if !is_admission_eligible(&candidate, now) {
                continue;
            }
            match self.store.reserve_deployment_capacity(tenant, candidate.id, cancel).await? {
                CapacityOutcome::Exhausted => continue,
                CapacityOutcome::Reserved => {
                    let admitted = self.admit(tenant, &candidate, device_id, device_description, device_provides, now, cancel).await?;
                    return Ok(Some(admitted));
                }
            }
        }
        Ok(None)
    }

    async fn admit(
        &self,
        tenant: &TenantId,
        deployment: &Deployment,
        device_id: DeviceId,
        device_description: &DeviceDescription,
        device_provides: &BTreeMap<String, String>,
        now: Timestamp,
        cancel: &CancellationToken,
    ) -> Result<DeviceDeployment> {
        let release = self.store.get_release(tenant, &deployment.release_name, cancel).await?;
        let resolution = release.as_ref().map_or(Resolution::NoArtifact, |release| resolve_for_device(release, device_description, device_provides, deployment.force_installation));

        let image = match &resolution {
            Resolution::Matched(artifact) => Some(artifact.clone()),
            Resolution::AlreadyInstalled(_) | Resolution::NoArtifact => None,
        };
        let assigned_size = image.as_ref().map_or(0, |artifact| artifact.size);

        let pending = DeviceDeployment {
            id: DeviceDeploymentId::generate(),
            deployment_id: deployment.id,
            device_id,
            created: now,
            status: DeviceDeploymentStatus::Pending,
            sub_state: None,
            finished: None,
            deleted: None,
            active: DeviceDeployment::active_flag_for(DeviceDeploymentStatus::Pending),
            image,
            retries: deployment.retries,
            attempts: 0,
            is_log_available: false,
            request: None,
        };
        let size_delta = i64::try_from(assigned_size).unwrap_or(i64::MAX);
        let inserted = self.store.insert_device_deployment(tenant, pending, cancel).await?;
        self.store.adjust_deployment_stats(tenant, deployment.id, None, Some(DeviceDeploymentStatus::Pending), size_delta, cancel).await?;

        let terminal_status = match resolution {
            Resolution::Matched(_) => None,
            Resolution::AlreadyInstalled(_) => Some(DeviceDeploymentStatus::AlreadyInstalled),
            Resolution::NoArtifact => Some(DeviceDeploymentStatus::NoArtifact),
        };
        let Some(terminal_status) = terminal_status else {
            tracing::info!(device_deployment_id = %inserted.id, deployment_id = %deployment.id, "device-deployment assigned, awaiting download");
            return Ok(inserted);
        };

        let collapsed = self.store.update_device_deployment_status(tenant, inserted.id, DeviceDeploymentStatus::Pending, terminal_status, None, Some(now), cancel).await?;
        self.store.adjust_deployment_stats(tenant, deployment.id, Some(DeviceDeploymentStatus::Pending), Some(terminal_status), 0, cancel).await?;
        self.maybe_finish_deployment(tenant, deployment.id, now, cancel).await?;
        tracing::info!(device_deployment_id = %collapsed.id, deployment_id = %deployment.id, status = terminal_status.as_str(), "device-deployment collapsed to a terminal status on assignment");
        Ok(collapsed)
    }
}
