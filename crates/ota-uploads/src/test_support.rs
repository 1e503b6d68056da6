// crates/ota-uploads/src/test_support.rs
// ============================================================================
// Module: In-Memory Store & Blob Gateway Fakes
// Description: `Mutex`-guarded, single-process stand-ins for
// `ota_core::Store` and `ota_core::BlobGateway`, used only by this crate's
// own tests.
// Purpose: Exercise upload-intent logic without a live MongoDB instance or
// S3 bucket.
// Dependencies: ota-core, async-trait, std::sync::Mutex
// ============================================================================

#![allow(clippy::unwrap_used, reason = "test fake; poisoned-lock panics are acceptable")]

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use ota_core::Result;
use ota_core::cancel::CancellationToken;
use ota_core::error::Error;
use ota_core::identifiers::ArtifactId;
use ota_core::identifiers::DeploymentId;
use ota_core::identifiers::DeviceDeploymentId;
use ota_core::identifiers::DeviceId;
use ota_core::identifiers::ReleaseName;
use ota_core::identifiers::TenantId;
use ota_core::model::Artifact;
use ota_core::model::Deployment;
use ota_core::model::DeploymentLog;
use ota_core::model::DeploymentStats;
use ota_core::model::DeviceDeployment;
use ota_core::model::DeviceDeploymentStatus;
use ota_core::model::Limit;
use ota_core::model::LogMessage;
use ota_core::model::Release;
use ota_core::model::UploadIntent;
use ota_core::model::UploadStatus;
use ota_core::store_types::CapacityOutcome;
use ota_core::store_types::DeploymentCandidateFilter;
use ota_core::store_types::Page;
use ota_core::store_types::PagedResult;
use ota_core::store_types::ReleaseFilter;
use ota_core::store_types::ReleaseSort;
use ota_core::time::Timestamp;
use ota_core::traits::PresignedRequest;

#[derive(Default)]
struct State {
    artifacts: HashMap<ArtifactId, Artifact>,
    releases: HashMap<ReleaseName, Release>,
    deployments: HashMap<DeploymentId, Deployment>,
    devices: HashMap<DeviceDeploymentId, DeviceDeployment>,
    logs: HashMap<DeviceDeploymentId, DeploymentLog>,
    upload_intents: HashMap<ArtifactId, UploadIntent>,
    limits: HashMap<String, Limit>,
    update_types: BTreeSet<String>,
}

/// An in-memory `Store` fake for a single tenant.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Returns a snapshot of `artifact_id`'s upload intent, for test
    /// assertions.
    pub fn get_upload_intent_snapshot(&self, artifact_id: ArtifactId) -> Option<UploadIntent> {
        self.state.lock().unwrap().upload_intents.get(&artifact_id).cloned()
    }
}

#[async_trait]
impl ota_core::Store for InMemoryStore {
    async fn insert_artifact(&self, _tenant: &TenantId, artifact: Artifact, cancel: &CancellationToken) -> Result<Artifact> {
        cancel.check()?;
        let mut state = self.state.lock().unwrap();
        state.artifacts.insert(artifact.id, artifact.clone());
        let release = state.releases.entry(artifact.name.clone()).or_insert_with(|| Release {
            name: artifact.name.clone(),
            modified: artifact.modified,
            artifacts: Vec::new(),
            artifacts_count: 0,
            tags: BTreeSet::new(),
            notes: String::new(),
            update_types: BTreeSet::new(),
        });
        release.artifacts.push(artifact.clone());
        release.artifacts_count = release.artifacts.len() as u64;
        release.modified = artifact.modified;
        release.recompute_update_types();
        Ok(artifact)
    }

    async fn delete_artifact(&self, _tenant: &TenantId, id: ArtifactId, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        let mut state = self.state.lock().unwrap();
        let artifact = state.artifacts.remove(&id).ok_or_else(|| Error::not_found("store.artifact.delete", "artifact not found"))?;
        if let Some(release) = state.releases.get_mut(&artifact.name) {
            release.artifacts.retain(|candidate| candidate.id != id);
            release.artifacts_count = release.artifacts.len() as u64;
            release.recompute_update_types();
        }
        Ok(())
    }

    async fn get_artifact(&self, _tenant: &TenantId, id: ArtifactId, cancel: &CancellationToken) -> Result<Option<Artifact>> {
        cancel.check()?;
        Ok(self.state.lock().unwrap().artifacts.get(&id).cloned())
    }

    async fn get_release(&self, _tenant: &TenantId, name: &ReleaseName, cancel: &CancellationToken) -> Result<Option<Release>> {
        cancel.check()?;
        Ok(self.state.lock().unwrap().releases.get(name).cloned())
    }

    async fn list_releases(
        &self,
        _tenant: &TenantId,
        filter: &ReleaseFilter,
        _sort: ReleaseSort,
        page: Page,
        cancel: &CancellationToken,
    ) -> Result<PagedResult<Release>> {
        cancel.check()?;
        let state = self.state.lock().unwrap();
        let mut matching: Vec<Release> = state
            .releases
            .values()
            .filter(|release| filter.name.as_ref().is_none_or(|name| release.name.as_str().contains(name.as_str())))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        let total_count = matching.len() as u64;
        let items = matching.into_iter().skip(page.offset as usize).take(page.limit as usize).collect();
        Ok(PagedResult { items, total_count })
    }

    async fn replace_release_tags(
        &self,
        _tenant: &TenantId,
        name: &ReleaseName,
        tags: Vec<String>,
        _tags_max_unique: u64,
        cancel: &CancellationToken,
    ) -> Result<Release> {
        cancel.check()?;
        let mut state = self.state.lock().unwrap();
        let release = state.releases.get_mut(name).ok_or_else(|| Error::not_found("store.release.replace_tags", "release not found"))?;
        release.tags = tags.into_iter().collect();
        Ok(release.clone())
    }

    async fn update_release_notes(
        &self,
        _tenant: &TenantId,
        name: &ReleaseName,
        notes: String,
        _notes_max_length: usize,
        cancel: &CancellationToken,
    ) -> Result<Release> {
        cancel.check()?;
        let mut state = self.state.lock().unwrap();
        let release = state.releases.get_mut(name).ok_or_else(|| Error::not_found("store.release.update_notes", "release not found"))?;
        release.notes = notes;
        Ok(release.clone())
    }

    async fn distinct_tags(&self, _tenant: &TenantId, cancel: &CancellationToken) -> Result<Vec<String>> {
        cancel.check()?;
        let state = self.state.lock().unwrap();
        Ok(state.releases.values().flat_map(|release| release.tags.iter().cloned()).collect::<BTreeSet<_>>().into_iter().collect())
    }

    async fn insert_deployment(&self, _tenant: &TenantId, deployment: Deployment, cancel: &CancellationToken) -> Result<Deployment> {
        cancel.check()?;
        self.state.lock().unwrap().deployments.insert(deployment.id, deployment.clone());
        Ok(deployment)
    }

    async fn get_deployment(&self, _tenant: &TenantId, id: DeploymentId, cancel: &CancellationToken) -> Result<Option<Deployment>> {
        cancel.check()?;
        Ok(self.state.lock().unwrap().deployments.get(&id).cloned())
    }

    async fn find_candidate_deployments(
        &self,
        _tenant: &TenantId,
        filter: &DeploymentCandidateFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<Deployment>> {
        cancel.check()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .deployments
            .values()
            .filter(|deployment| deployment.active == Some(true))
            .filter(|deployment| deployment.max_devices.is_none_or(|max| deployment.device_count < max))
            .filter(|deployment| filter.group.is_none() || deployment.group == filter.group)
            .filter(|deployment| !filter.exclude_deployment_ids.contains(&deployment.id))
            .cloned()
            .collect())
    }

    async fn reserve_deployment_capacity(&self, _tenant: &TenantId, deployment_id: DeploymentId, cancel: &CancellationToken) -> Result<CapacityOutcome> {
        cancel.check()?;
        let mut state = self.state.lock().unwrap();
        let Some(deployment) = state.deployments.get_mut(&deployment_id) else {
            return Ok(CapacityOutcome::Exhausted);
        };
        if deployment.max_devices.is_some_and(|max| deployment.device_count >= max) {
            return Ok(CapacityOutcome::Exhausted);
        }
        deployment.device_count += 1;
        Ok(CapacityOutcome::Reserved)
    }

    async fn adjust_deployment_stats(
        &self,
        _tenant: &TenantId,
        deployment_id: DeploymentId,
        decrement: Option<DeviceDeploymentStatus>,
        increment: Option<DeviceDeploymentStatus>,
        size_delta: i64,
        cancel: &CancellationToken,
    ) -> Result<()> {
        cancel.check()?;
        let mut state = self.state.lock().unwrap();
        if let Some(deployment) = state.deployments.get_mut(&deployment_id) {
            if let Some(status) = decrement {
                deployment.stats.decrement(status);
            }
            if let Some(status) = increment {
                deployment.stats.increment(status);
            }
            if size_delta > 0 {
                deployment.total_size += size_delta as u64;
            } else {
                deployment.total_size = deployment.total_size.saturating_sub(size_delta.unsigned_abs());
            }
        }
        Ok(())
    }

    async fn finish_deployment(&self, _tenant: &TenantId, deployment_id: DeploymentId, finished: Timestamp, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        let mut state = self.state.lock().unwrap();
        if let Some(deployment) = state.deployments.get_mut(&deployment_id) {
            deployment.status = ota_core::model::DeploymentStatus::Finished;
            deployment.finished = Some(finished);
            deployment.active = None;
        }
        Ok(())
    }

    async fn reconcile_deployment_stats(&self, _tenant: &TenantId, deployment_id: DeploymentId, cancel: &CancellationToken) -> Result<DeploymentStats> {
        cancel.check()?;
        let mut state = self.state.lock().unwrap();
        let mut stats = DeploymentStats::zeroed();
        for device in state.devices.values().filter(|device| device.deployment_id == deployment_id) {
            stats.increment(device.status);
        }
        if let Some(deployment) = state.deployments.get_mut(&deployment_id) {
            deployment.stats = stats.clone();
        }
        Ok(stats)
    }

    async fn insert_device_deployment(&self, _tenant: &TenantId, device_deployment: DeviceDeployment, cancel: &CancellationToken) -> Result<DeviceDeployment> {
        cancel.check()?;
        self.state.lock().unwrap().devices.insert(device_deployment.id, device_deployment.clone());
        Ok(device_deployment)
    }

    async fn get_device_deployment(&self, _tenant: &TenantId, id: DeviceDeploymentId, cancel: &CancellationToken) -> Result<Option<DeviceDeployment>> {
        cancel.check()?;
        Ok(self.state.lock().unwrap().devices.get(&id).cloned())
    }

    async fn get_oldest_active_device_deployment(&self, _tenant: &TenantId, device_id: DeviceId, cancel: &CancellationToken) -> Result<Option<DeviceDeployment>> {
        cancel.check()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .devices
            .values()
            .filter(|device| device.device_id == device_id && device.active == Some(true))
            .min_by(|a, b| a.created.cmp(&b.created).then(a.id.get().cmp(&b.id.get())))
            .cloned())
    }

    async fn update_device_deployment_status(
        &self,
        _tenant: &TenantId,
        id: DeviceDeploymentId,
        from: DeviceDeploymentStatus,
        to: DeviceDeploymentStatus,
        sub_state: Option<String>,
        finished: Option<Timestamp>,
        cancel: &CancellationToken,
    ) -> Result<DeviceDeployment> {
        cancel.check()?;
        if !from.is_transition_allowed(to) {
            return Err(Error::state_invalid("device_deployment.transition_not_allowed", format!("{from:?} -> {to:?} is not allowed")));
        }
        let mut state = self.state.lock().unwrap();
        let device = state.devices.get_mut(&id).ok_or_else(|| Error::not_found("store.device_deployment.update_status", "device-deployment not found"))?;
        if device.status != from {
            return Err(Error::state_invalid("device_deployment.stale_status", "device-deployment status changed concurrently"));
        }
        device.status = to;
        device.sub_state = sub_state.or(device.sub_state.clone());
        device.finished = finished.or(device.finished);
        device.active = DeviceDeployment::active_flag_for(to);
        Ok(device.clone())
    }

    async fn aggregate_device_deployment_by_status(&self, tenant: &TenantId, deployment_id: DeploymentId, cancel: &CancellationToken) -> Result<DeploymentStats> {
        self.reconcile_deployment_stats(tenant, deployment_id, cancel).await
    }

    async fn abort_deployment_device_deployments(&self, _tenant: &TenantId, deployment_id: DeploymentId, finished: Timestamp, cancel: &CancellationToken) -> Result<u64> {
        cancel.check()?;
        let mut state = self.state.lock().unwrap();
        let mut count = 0u64;
        for device in state.devices.values_mut().filter(|device| device.deployment_id == deployment_id && !device.status.is_terminal()) {
            device.status = DeviceDeploymentStatus::Aborted;
            device.finished = Some(finished);
            device.active = None;
            count += 1;
        }
        Ok(count)
    }

    async fn decommission_device_deployments(&self, _tenant: &TenantId, device_id: DeviceId, finished: Timestamp, cancel: &CancellationToken) -> Result<u64> {
        cancel.check()?;
        let mut state = self.state.lock().unwrap();
        let mut count = 0u64;
        for device in state.devices.values_mut().filter(|device| device.device_id == device_id && !device.status.is_terminal()) {
            device.status = DeviceDeploymentStatus::Decommissioned;
            device.finished = Some(finished);
            device.active = None;
            count += 1;
        }
        Ok(count)
    }

    async fn append_device_deployment_log(
        &self,
        _tenant: &TenantId,
        id: DeviceDeploymentId,
        received: Timestamp,
        messages: Vec<LogMessage>,
        cancel: &CancellationToken,
    ) -> Result<DeploymentLog> {
        cancel.check()?;
        let mut state = self.state.lock().unwrap();
        if !state.devices.contains_key(&id) {
            return Err(Error::not_found("store.device_deployment.log.not_found", "device-deployment not found"));
        }
        let log = DeploymentLog { device_deployment_id: id, received, messages };
        state.logs.insert(id, log.clone());
        Ok(log)
    }

    async fn insert_upload_intent(&self, _tenant: &TenantId, intent: UploadIntent, cancel: &CancellationToken) -> Result<UploadIntent> {
        cancel.check()?;
        self.state.lock().unwrap().upload_intents.insert(intent.artifact_id, intent.clone());
        Ok(intent)
    }

    async fn get_upload_intent(&self, _tenant: &TenantId, artifact_id: ArtifactId, cancel: &CancellationToken) -> Result<Option<UploadIntent>> {
        cancel.check()?;
        Ok(self.state.lock().unwrap().upload_intents.get(&artifact_id).cloned())
    }

    async fn transition_upload_intent(
        &self,
        _tenant: &TenantId,
        artifact_id: ArtifactId,
        from: UploadStatus,
        to: UploadStatus,
        cancel: &CancellationToken,
    ) -> Result<UploadIntent> {
        cancel.check()?;
        let mut state = self.state.lock().unwrap();
        let intent = state
            .upload_intents
            .get_mut(&artifact_id)
            .filter(|intent| intent.status == from)
            .ok_or_else(|| Error::not_found("store.upload_intent.transition", "upload intent no longer exists in the expected state"))?;
        intent.status = to;
        Ok(intent.clone())
    }

    async fn find_expired_upload_intents(&self, _tenant: &TenantId, now: Timestamp, cancel: &CancellationToken) -> Result<Vec<UploadIntent>> {
        cancel.check()?;
        Ok(self.state.lock().unwrap().upload_intents.values().filter(|intent| intent.is_reapable(now)).cloned().collect())
    }

    async fn get_limit(&self, _tenant: &TenantId, name: &str, cancel: &CancellationToken) -> Result<Option<Limit>> {
        cancel.check()?;
        Ok(self.state.lock().unwrap().limits.get(name).cloned())
    }

    async fn set_limit(&self, _tenant: &TenantId, limit: Limit, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        self.state.lock().unwrap().limits.insert(limit.name.clone(), limit);
        Ok(())
    }

    async fn register_update_type(&self, _tenant: &TenantId, name: &str, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        self.state.lock().unwrap().update_types.insert(name.to_string());
        Ok(())
    }

    async fn list_update_types(&self, _tenant: &TenantId, cancel: &CancellationToken) -> Result<Vec<String>> {
        cancel.check()?;
        Ok(self.state.lock().unwrap().update_types.iter().cloned().collect())
    }

    async fn schema_version(&self, _tenant: &TenantId, cancel: &CancellationToken) -> Result<Option<u32>> {
        cancel.check()?;
        Ok(Some(1))
    }

    async fn set_schema_version(&self, _tenant: &TenantId, _version: u32, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        Ok(())
    }
}

/// An in-memory `BlobGateway` fake tracking object sizes only; no bytes are
/// actually stored.
#[derive(Default)]
pub struct InMemoryBlobGateway {
    objects: Mutex<BTreeMap<String, u64>>,
}

impl InMemoryBlobGateway {
    /// Simulates a caller having uploaded `size` bytes to `key`.
    pub fn seed_object(&self, key: &str, size: u64) {
        self.objects.lock().unwrap().insert(key.to_string(), size);
    }
}

#[async_trait]
impl ota_core::BlobGateway for InMemoryBlobGateway {
    async fn put_request(&self, object_key: &str, _ttl: std::time::Duration, cancel: &CancellationToken) -> Result<PresignedRequest> {
        cancel.check()?;
        Ok(PresignedRequest { method: "PUT", url: format!("https://blobs.test/{object_key}") })
    }

    async fn get_request(&self, object_key: &str, _ttl: std::time::Duration, cancel: &CancellationToken) -> Result<PresignedRequest> {
        cancel.check()?;
        Ok(PresignedRequest { method: "GET", url: format!("https://blobs.test/{object_key}") })
    }

    async fn upload_artifact(&self, object_key: &str, body: Vec<u8>, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        self.objects.lock().unwrap().insert(object_key.to_string(), body.len() as u64);
        Ok(())
    }

    async fn delete_object(&self, object_key: &str, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        self.objects.lock().unwrap().remove(object_key);
        Ok(())
    }

    async fn stat_object(&self, object_key: &str, cancel: &CancellationToken) -> Result<u64> {
        cancel.check()?;
        self.objects.lock().unwrap().get(object_key).copied().ok_or_else(|| Error::not_found("blob.stat.not_found", "object not found"))
    }

    async fn last_modified(&self, _object_key: &str, cancel: &CancellationToken) -> Result<Timestamp> {
        cancel.check()?;
        Ok(Timestamp::from_unix_millis(0))
    }
}
