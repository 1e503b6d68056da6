// crates/ota-store-mongo/src/store_impl.rs
// ============================================================================
// Module: Store Trait Implementation
// Description: `impl ota_core::Store for MongoStore` — every document-store
// operation the control plane needs, expressed as concrete `mongodb` calls.
// Purpose: Isolate the (large) trait implementation from the connection and
// collection-accessor plumbing in `lib.rs`.
// Dependencies: mongodb, bson, ota-core
// ============================================================================

use async_trait::async_trait;
use bson::doc;
use bson::to_bson;
use mongodb::options::FindOneAndUpdateOptions;
use mongodb::options::FindOptions;
use mongodb::options::ReturnDocument;
use tokio_stream::StreamExt;

use ota_core::cancel::CancellationToken;
use ota_core::error::Error;
use ota_core::error::Result;
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
use ota_core::store_types::PagedResult;
use ota_core::store_types::Page;
use ota_core::store_types::ReleaseFilter;
use ota_core::store_types::ReleaseSort;
use ota_core::store_types::ReleaseSortField;
use ota_core::store_types::SortDirection;
use ota_core::time::Timestamp;

use crate::MongoStore;
use crate::UpdateTypeRecord;
use crate::error::map_mongo_error;

fn bson_id(code: &'static str, value: impl serde::Serialize) -> Result<bson::Bson> {
    to_bson(&value).map_err(|err| crate::error::map_bson_ser_error(code, "encoding identifier", err))
}

#[async_trait]
impl ota_core::Store for MongoStore {
    async fn insert_artifact(&self, tenant: &TenantId, artifact: Artifact, cancel: &CancellationToken) -> Result<Artifact> {
        cancel.check()?;
        let images = self.images(tenant);
        images
            .insert_one(&artifact)
            .await
            .map_err(|err| map_mongo_error("store.artifact.insert", "inserting artifact", err))?;

        let releases = self.releases(tenant);
        let filter = doc! { "name": artifact.name.as_str() };
        let update = doc! {
            "$push": { "artifacts": to_bson(&artifact).map_err(|err| crate::error::map_bson_ser_error("store.artifact.insert", "encoding artifact", err))? },
            "$inc": { "artifacts_count": 1i64 },
            "$set": { "modified": artifact.modified.unix_millis() },
        };
        releases
            .update_one(filter, update)
            .upsert(true)
            .await
            .map_err(|err| map_mongo_error("store.release.upsert", "upserting release", err))?;
        Ok(artifact)
    }

    async fn delete_artifact(&self, tenant: &TenantId, id: ArtifactId, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        let images = self.images(tenant);
        let id_bson = bson_id("store.artifact.delete", id)?;
        let artifact = images
            .find_one_and_delete(doc! { "id": id_bson })
            .await
            .map_err(|err| map_mongo_error("store.artifact.delete", "deleting artifact", err))?
            .ok_or_else(|| Error::not_found("store.artifact.delete", "artifact not found"))?;

        let releases = self.releases(tenant);
        let release_id = bson_id("store.artifact.delete", &id)?;
        let filter = doc! { "name": artifact.name.as_str() };
        let update = doc! {
            "$pull": { "artifacts": { "id": release_id } },
            "$inc": { "artifacts_count": -1i64 },
        };
        releases
            .update_one(filter.clone(), update)
            .await
            .map_err(|err| map_mongo_error("store.release.decrement", "decrementing release", err))?;
        releases
            .delete_one(doc! { "name": artifact.name.as_str(), "artifacts_count": { "$lte": 0i64 } })
            .await
            .map_err(|err| map_mongo_error("store.release.delete_empty", "deleting emptied release", err))?;
        Ok(())
    }

    async fn get_artifact(&self, tenant: &TenantId, id: ArtifactId, cancel: &CancellationToken) -> Result<Option<Artifact>> {
        cancel.check()?;
        let id_bson = bson_id("store.artifact.get", id)?;
        self.images(tenant).find_one(doc! { "id": id_bson }).await.map_err(|err| map_mongo_error("store.artifact.get", "fetching artifact", err))
    }

    async fn get_release(&self, tenant: &TenantId, name: &ReleaseName, cancel: &CancellationToken) -> Result<Option<Release>> {
        cancel.check()?;
        self.releases(tenant)
            .find_one(doc! { "name": name.as_str() })
            .await
            .map_err(|err| map_mongo_error("store.release.get", "fetching release", err))
    }

    async fn list_releases(
        &self,
        tenant: &TenantId,
        filter: &ReleaseFilter,
        sort: ReleaseSort,
        page: Page,
        cancel: &CancellationToken,
    ) -> Result<PagedResult<Release>> {
        cancel.check()?;
        let mut query = doc! {};
        if let Some(name) = &filter.name {
            query.insert("name", doc! { "$regex": name, "$options": "i" });
        }
        if let Some(description) = &filter.description {
            query.insert("artifacts.description", doc! { "$regex": description, "$options": "i" });
        }
        if !filter.tags.is_empty() {
            query.insert("tags", doc! { "$all": filter.tags.clone() });
        }
        if let Some(device_type) = &filter.device_type {
            query.insert("artifacts.device_types_compatible", device_type);
        }
        if let Some(update_type) = &filter.update_type {
            query.insert("update_types", update_type);
        }

        let releases = self.releases(tenant);
        let total_count = releases
            .count_documents(query.clone())
            .await
            .map_err(|err| map_mongo_error("store.release.count", "counting releases", err))?;

        let sort_field = match sort.field {
            ReleaseSortField::Name => "name",
            ReleaseSortField::Modified => "modified",
            ReleaseSortField::ArtifactsCount => "artifacts_count",
            ReleaseSortField::Tags => "tags",
        };
        let sort_direction = match sort.direction {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        };
        let options = FindOptions::builder()
            .sort(doc! { sort_field: sort_direction })
            .skip(page.offset)
            .limit(i64::try_from(page.limit).unwrap_or(i64::MAX))
            .build();
        let mut cursor = releases.find(query).with_options(options).await.map_err(|err| map_mongo_error("store.release.list", "listing releases", err))?;
        let mut items = Vec::new();
        while let Some(release) = cursor.next().await {
            items.push(release.map_err(|err| map_mongo_error("store.release.list", "reading release page", err))?);
        }
        Ok(PagedResult { items, total_count })
    }

    async fn replace_release_tags(
        &self,
        tenant: &TenantId,
        name: &ReleaseName,
        tags: Vec<String>,
        tags_max_unique: u64,
        cancel: &CancellationToken,
    ) -> Result<Release> {
        cancel.check()?;
        let in_use = self.distinct_tags(tenant, cancel).await?;
        let existing: std::collections::BTreeSet<&str> = in_use.iter().map(String::as_str).collect();
        let new_distinct_count = tags.iter().map(String::as_str).filter(|tag| !existing.contains(tag)).collect::<std::collections::BTreeSet<_>>().len() as u64
            + in_use.len() as u64;
        if new_distinct_count > tags_max_unique {
            return Err(Error::limit_exceeded("release.tags.max_unique", "replacing tags would exceed the tenant's tag cardinality bound"));
        }
        let releases = self.releases(tenant);
        let options = FindOneAndUpdateOptions::builder().return_document(ReturnDocument::After).build();
        releases
            .find_one_and_update(doc! { "name": name.as_str() }, doc! { "$set": { "tags": tags } })
            .with_options(options)
            .await
            .map_err(|err| map_mongo_error("store.release.replace_tags", "replacing release tags", err))?
            .ok_or_else(|| Error::not_found("store.release.replace_tags", "release not found"))
    }

    async fn update_release_notes(
        &self,
        tenant: &TenantId,
        name: &ReleaseName,
        notes: String,
        notes_max_length: usize,
        cancel: &CancellationToken,
    ) -> Result<Release> {
        cancel.check()?;
        if notes.len() > notes_max_length {
            return Err(Error::validation("release.notes.max_length", "notes exceed the configured maximum length"));
        }
        let releases = self.releases(tenant);
        let options = FindOneAndUpdateOptions::builder().return_document(ReturnDocument::After).build();
        releases
            .find_one_and_update(doc! { "name": name.as_str() }, doc! { "$set": { "notes": notes } })
            .with_options(options)
            .await
            .map_err(|err| map_mongo_error("store.release.update_notes", "updating release notes", err))?
            .ok_or_else(|| Error::not_found("store.release.update_notes", "release not found"))
    }

    async fn distinct_tags(&self, tenant: &TenantId, cancel: &CancellationToken) -> Result<Vec<String>> {
        cancel.check()?;
        let releases = self.releases(tenant);
        let values = releases
            .distinct("tags", doc! {})
            .await
            .map_err(|err| map_mongo_error("store.release.distinct_tags", "computing distinct tags", err))?;
        Ok(values.into_iter().filter_map(|value| value.as_str().map(str::to_string)).collect())
    }

    async fn insert_deployment(&self, tenant: &TenantId, deployment: Deployment, cancel: &CancellationToken) -> Result<Deployment> {
        cancel.check()?;
        self.deployments(tenant)
            .insert_one(&deployment)
            .await
            .map_err(|err| map_mongo_error("store.deployment.insert", "inserting deployment", err))?;
        Ok(deployment)
    }

    async fn get_deployment(&self, tenant: &TenantId, id: DeploymentId, cancel: &CancellationToken) -> Result<Option<Deployment>> {
        cancel.check()?;
        let id_bson = bson_id("store.deployment.get", id)?;
        self.deployments(tenant)
            .find_one(doc! { "id": id_bson })
            .await
            .map_err(|err| map_mongo_error("store.deployment.get", "fetching deployment", err))
    }

    async fn find_candidate_deployments(
        &self,
        tenant: &TenantId,
        filter: &DeploymentCandidateFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<Deployment>> {
        cancel.check()?;
        let mut query = doc! {
            "active": true,
            "$expr": { "$lt": ["$device_count", "$max_devices"] },
        };
        if let Some(group) = &filter.group {
            query.insert("group", group);
        }
        if !filter.exclude_deployment_ids.is_empty() {
            let excluded: Result<Vec<bson::Bson>> = filter.exclude_deployment_ids.iter().map(|id| bson_id("store.deployment.find_candidates", *id)).collect();
            query.insert("id", doc! { "$nin": excluded? });
        }
        let deployments = self.deployments(tenant);
        let mut cursor = deployments.find(query).await.map_err(|err| map_mongo_error("store.deployment.find_candidates", "finding candidate deployments", err))?;
        let mut items = Vec::new();
        while let Some(deployment) = cursor.next().await {
            items.push(deployment.map_err(|err| map_mongo_error("store.deployment.find_candidates", "reading candidate deployment", err))?);
        }
        Ok(items)
    }

    async fn reserve_deployment_capacity(&self, tenant: &TenantId, deployment_id: DeploymentId, cancel: &CancellationToken) -> Result<CapacityOutcome> {
        cancel.check()?;
        let id_bson = bson_id("store.deployment.reserve_capacity", deployment_id)?;
        let filter = doc! { "id": id_bson, "$expr": { "$lt": ["$device_count", "$max_devices"] } };
        let update = doc! { "$inc": { "device_count": 1i64 } };
        let result = self
            .deployments(tenant)
            .update_one(filter, update)
            .await
            .map_err(|err| map_mongo_error("store.deployment.reserve_capacity", "reserving deployment capacity", err))?;
        Ok(if result.modified_count == 1 { CapacityOutcome::Reserved } else { CapacityOutcome::Exhausted })
    }

    async fn adjust_deployment_stats(
        &self,
        tenant: &TenantId,
        deployment_id: DeploymentId,
        decrement: Option<DeviceDeploymentStatus>,
        increment: Option<DeviceDeploymentStatus>,
        size_delta: i64,
        cancel: &CancellationToken,
    ) -> Result<()> {
        cancel.check()?;
        let id_bson = bson_id("store.deployment.adjust_stats", deployment_id)?;
        let mut inc = doc! {};
        if let Some(status) = decrement {
            inc.insert(format!("stats.{}", status.as_str()), -1i64);
        }
        if let Some(status) = increment {
            inc.insert(format!("stats.{}", status.as_str()), 1i64);
        }
        if size_delta != 0 {
            inc.insert("total_size", size_delta);
        }
        if inc.is_empty() {
            return Ok(());
        }
        self.deployments(tenant)
            .update_one(doc! { "id": id_bson }, doc! { "$inc": inc })
            .await
            .map_err(|err| map_mongo_error("store.deployment.adjust_stats", "adjusting deployment stats", err))?;
        Ok(())
    }

    async fn finish_deployment(&self, tenant: &TenantId, deployment_id: DeploymentId, finished: Timestamp, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        let id_bson = bson_id("store.deployment.finish", deployment_id)?;
        let update = doc! {
            "$set": { "status": "finished", "finished": finished.unix_millis() },
            "$unset": { "active": "" },
        };
        self.deployments(tenant)
            .update_one(doc! { "id": id_bson }, update)
            .await
            .map_err(|err| map_mongo_error("store.deployment.finish", "finishing deployment", err))?;
        Ok(())
    }

    async fn reconcile_deployment_stats(&self, tenant: &TenantId, deployment_id: DeploymentId, cancel: &CancellationToken) -> Result<DeploymentStats> {
        cancel.check()?;
        let mut stats = DeploymentStats::zeroed();
        let devices = self.devices(tenant);
        let id_bson = bson_id("store.deployment.reconcile_stats", deployment_id)?;
        for status in DeviceDeploymentStatus::all() {
            cancel.check()?;
            let count = devices
                .count_documents(doc! { "deployment_id": id_bson.clone(), "status": status.as_str() })
                .await
                .map_err(|err| map_mongo_error("store.deployment.reconcile_stats", "counting device-deployments by status", err))?;
            stats.set(status, count);
        }
        let id_bson = bson_id("store.deployment.reconcile_stats", deployment_id)?;
        let set_stats = to_bson(&stats).map_err(|err| crate::error::map_bson_ser_error("store.deployment.reconcile_stats", "encoding stats", err))?;
        self.deployments(tenant)
            .update_one(doc! { "id": id_bson }, doc! { "$set": { "stats": set_stats } })
            .await
            .map_err(|err| map_mongo_error("store.deployment.reconcile_stats", "writing reconciled stats", err))?;
        Ok(stats)
    }

    async fn insert_device_deployment(&self, tenant: &TenantId, device_deployment: DeviceDeployment, cancel: &CancellationToken) -> Result<DeviceDeployment> {
        cancel.check()?;
        self.devices(tenant)
            .insert_one(&device_deployment)
            .await
            .map_err(|err| map_mongo_error("store.device_deployment.insert", "inserting device-deployment", err))?;
        Ok(device_deployment)
    }

    async fn get_device_deployment(&self, tenant: &TenantId, id: DeviceDeploymentId, cancel: &CancellationToken) -> Result<Option<DeviceDeployment>> {
        cancel.check()?;
        let id_bson = bson_id("store.device_deployment.get", id)?;
        self.devices(tenant)
            .find_one(doc! { "id": id_bson })
            .await
            .map_err(|err| map_mongo_error("store.device_deployment.get", "fetching device-deployment", err))
    }

    async fn get_oldest_active_device_deployment(&self, tenant: &TenantId, device_id: DeviceId, cancel: &CancellationToken) -> Result<Option<DeviceDeployment>> {
        cancel.check()?;
        let device_bson = bson_id("store.device_deployment.oldest_active", device_id)?;
        let options = FindOptions::builder().sort(doc! { "created": 1, "id": 1 }).limit(1).build();
        let mut cursor = self
            .devices(tenant)
            .find(doc! { "device_id": device_bson, "active": true })
            .with_options(options)
            .await
            .map_err(|err| map_mongo_error("store.device_deployment.oldest_active", "finding oldest active device-deployment", err))?;
        match cursor.next().await {
            Some(result) => Ok(Some(result.map_err(|err| map_mongo_error("store.device_deployment.oldest_active", "reading oldest active device-deployment", err))?)),
            None => Ok(None),
        }
    }

    #[allow(clippy::too_many_arguments, reason = "a status transition inherently carries from/to/sub_state/finished together")]
    async fn update_device_deployment_status(
        &self,
        tenant: &TenantId,
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
        let id_bson = bson_id("store.device_deployment.update_status", id)?;
        let mut set = doc! { "status": to.as_str() };
        if let Some(sub_state) = sub_state {
            set.insert("sub_state", sub_state);
        }
        if let Some(finished) = finished {
            set.insert("finished", finished.unix_millis());
        }
        let update = if to.is_terminal() {
            doc! { "$set": set, "$unset": { "active": "" } }
        } else {
            set.insert("active", true);
            doc! { "$set": set }
        };
        let options = FindOneAndUpdateOptions::builder().return_document(ReturnDocument::After).build();
        let updated = self
            .devices(tenant)
            .find_one_and_update(doc! { "id": id_bson, "status": from.as_str() }, update)
            .with_options(options)
            .await
            .map_err(|err| map_mongo_error("store.device_deployment.update_status", "updating device-deployment status", err))?
            .ok_or_else(|| Error::state_invalid("device_deployment.stale_status", "device-deployment status changed concurrently"))?;
        Ok(updated)
    }

    async fn aggregate_device_deployment_by_status(&self, tenant: &TenantId, deployment_id: DeploymentId, cancel: &CancellationToken) -> Result<DeploymentStats> {
        self.reconcile_deployment_stats(tenant, deployment_id, cancel).await
    }

    async fn abort_deployment_device_deployments(&self, tenant: &TenantId, deployment_id: DeploymentId, finished: Timestamp, cancel: &CancellationToken) -> Result<u64> {
        cancel.check()?;
        let id_bson = bson_id("store.device_deployment.abort_all", deployment_id)?;
        let non_terminal: Vec<&str> = DeviceDeploymentStatus::all().into_iter().filter(|status| !status.is_terminal()).map(DeviceDeploymentStatus::as_str).collect();
        let filter = doc! { "deployment_id": id_bson, "status": { "$in": non_terminal } };
        let update = doc! {
            "$set": { "status": DeviceDeploymentStatus::Aborted.as_str(), "finished": finished.unix_millis() },
            "$unset": { "active": "" },
        };
        let result = self
            .devices(tenant)
            .update_many(filter, update)
            .await
            .map_err(|err| map_mongo_error("store.device_deployment.abort_all", "aborting device-deployments", err))?;
        self.finish_deployment(tenant, deployment_id, finished, cancel).await?;
        Ok(result.modified_count)
    }

    async fn decommission_device_deployments(&self, tenant: &TenantId, device_id: DeviceId, finished: Timestamp, cancel: &CancellationToken) -> Result<u64> {
        cancel.check()?;
        let device_bson = bson_id("store.device_deployment.decommission", device_id)?;
        let non_terminal: Vec<&str> = DeviceDeploymentStatus::all().into_iter().filter(|status| !status.is_terminal()).map(DeviceDeploymentStatus::as_str).collect();
        let filter = doc! { "device_id": device_bson, "status": { "$in": non_terminal } };
        let update = doc! {
            "$set": { "status": DeviceDeploymentStatus::Decommissioned.as_str(), "finished": finished.unix_millis() },
            "$unset": { "active": "" },
        };
        let result = self
            .devices(tenant)
            .update_many(filter, update)
            .await
            .map_err(|err| map_mongo_error("store.device_deployment.decommission", "decommissioning device-deployments", err))?;
        Ok(result.modified_count)
    }

    async fn append_device_deployment_log(
        &self,
        tenant: &TenantId,
        id: DeviceDeploymentId,
        received: Timestamp,
        messages: Vec<LogMessage>,
        cancel: &CancellationToken,
    ) -> Result<DeploymentLog> {
        cancel.check()?;
        let device_deployment = self
            .get_device_deployment(tenant, id, cancel)
            .await?
            .ok_or_else(|| Error::not_found("store.device_deployment.log.not_found", "device-deployment not found"))?;
        let log = DeploymentLog { device_deployment_id: device_deployment.id, received, messages };
        let logs = self.devices_logs(tenant);
        let id_bson = bson_id("store.device_deployment.log.append", device_deployment.id)?;
        logs.replace_one(doc! { "device_deployment_id": id_bson }, &log)
            .upsert(true)
            .await
            .map_err(|err| map_mongo_error("store.device_deployment.log.append", "storing device-deployment log", err))?;
        let id_bson = bson_id("store.device_deployment.log.append", device_deployment.id)?;
        self.devices(tenant)
            .update_one(doc! { "id": id_bson }, doc! { "$set": { "is_log_available": true } })
            .await
            .map_err(|err| map_mongo_error("store.device_deployment.log.append", "marking log available", err))?;
        Ok(log)
    }

    async fn insert_upload_intent(&self, tenant: &TenantId, intent: UploadIntent, cancel: &CancellationToken) -> Result<UploadIntent> {
        cancel.check()?;
        self.upload_intents(tenant)
            .insert_one(&intent)
            .await
            .map_err(|err| map_mongo_error("store.upload_intent.insert", "inserting upload intent", err))?;
        Ok(intent)
    }

    async fn get_upload_intent(&self, tenant: &TenantId, artifact_id: ArtifactId, cancel: &CancellationToken) -> Result<Option<UploadIntent>> {
        cancel.check()?;
        let id_bson = bson_id("store.upload_intent.get", artifact_id)?;
        self.upload_intents(tenant)
            .find_one(doc! { "artifact_id": id_bson })
            .await
            .map_err(|err| map_mongo_error("store.upload_intent.get", "fetching upload intent", err))
    }

    async fn transition_upload_intent(
        &self,
        tenant: &TenantId,
        artifact_id: ArtifactId,
        from: UploadStatus,
        to: UploadStatus,
        cancel: &CancellationToken,
    ) -> Result<UploadIntent> {
        cancel.check()?;
        let id_bson = bson_id("store.upload_intent.transition", artifact_id)?;
        let from_bson = to_bson(&from).map_err(|err| crate::error::map_bson_ser_error("store.upload_intent.transition", "encoding from-status", err))?;
        let to_bson_value = to_bson(&to).map_err(|err| crate::error::map_bson_ser_error("store.upload_intent.transition", "encoding to-status", err))?;
        let options = FindOneAndUpdateOptions::builder().return_document(ReturnDocument::After).build();
        self.upload_intents(tenant)
            .find_one_and_update(doc! { "artifact_id": id_bson, "status": from_bson }, doc! { "$set": { "status": to_bson_value } })
            .with_options(options)
            .await
            .map_err(|err| map_mongo_error("store.upload_intent.transition", "transitioning upload intent", err))?
            .ok_or_else(|| Error::not_found("store.upload_intent.transition", "upload intent no longer exists in the expected state"))
    }

    async fn find_expired_upload_intents(&self, tenant: &TenantId, now: Timestamp, cancel: &CancellationToken) -> Result<Vec<UploadIntent>> {
        cancel.check()?;
        let pending = to_bson(&UploadStatus::Pending).map_err(|err| crate::error::map_bson_ser_error("store.upload_intent.find_expired", "encoding pending status", err))?;
        let filter = doc! { "status": pending, "expires_at": { "$lte": now.unix_millis() } };
        let mut cursor = self
            .upload_intents(tenant)
            .find(filter)
            .await
            .map_err(|err| map_mongo_error("store.upload_intent.find_expired", "finding expired upload intents", err))?;
        let mut items = Vec::new();
        while let Some(intent) = cursor.next().await {
            items.push(intent.map_err(|err| map_mongo_error("store.upload_intent.find_expired", "reading expired upload intent", err))?);
        }
        Ok(items)
    }

    async fn get_limit(&self, tenant: &TenantId, name: &str, cancel: &CancellationToken) -> Result<Option<Limit>> {
        cancel.check()?;
        self.limits(tenant).find_one(doc! { "name": name }).await.map_err(|err| map_mongo_error("store.limit.get", "fetching limit", err))
    }

    async fn set_limit(&self, tenant: &TenantId, limit: Limit, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        self.limits(tenant)
            .replace_one(doc! { "name": limit.name.as_str() }, &limit)
            .upsert(true)
            .await
            .map_err(|err| map_mongo_error("store.limit.set", "setting limit", err))?;
        Ok(())
    }

    async fn register_update_type(&self, tenant: &TenantId, name: &str, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        self.update_types(tenant)
            .update_one(doc! { "name": name }, doc! { "$set": { "name": name } })
            .upsert(true)
            .await
            .map_err(|err| map_mongo_error("store.update_type.register", "registering update type", err))?;
        Ok(())
    }

    async fn list_update_types(&self, tenant: &TenantId, cancel: &CancellationToken) -> Result<Vec<String>> {
        cancel.check()?;
        let mut cursor = self
            .update_types(tenant)
            .find(doc! {})
            .await
            .map_err(|err| map_mongo_error("store.update_type.list", "listing update types", err))?;
        let mut names = Vec::new();
        while let Some(record) = cursor.next().await {
            let record: UpdateTypeRecord = record.map_err(|err| map_mongo_error("store.update_type.list", "reading update type", err))?;
            names.push(record.name);
        }
        Ok(names)
    }

    async fn schema_version(&self, tenant: &TenantId, cancel: &CancellationToken) -> Result<Option<u32>> {
        cancel.check()?;
        let version = crate::migrations::current_version(&self.database(tenant)).await?;
        Ok(if version == 0 { None } else { Some(version) })
    }

    async fn set_schema_version(&self, tenant: &TenantId, version: u32, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        let collection: mongodb::Collection<bson::Document> = self.database(tenant).collection("migration_info");
        collection
            .update_one(doc! {}, doc! { "$set": { "version": i64::from(version) } })
            .upsert(true)
            .await
            .map_err(|err| map_mongo_error("store.schema.set_version", "setting schema version", err))?;
        Ok(())
    }
}
