// crates/ota-core/src/traits.rs
// ============================================================================
// Module: Trait Surfaces
// Description: The backend-agnostic interfaces consumed by every other crate
// in this workspace — Store, BlobGateway, Notifier.
// Purpose: Let `ota-registry`, `ota-engine`, and `ota-uploads` depend on a
// contract instead of on `ota-store-mongo`/`ota-blobstore`/`ota-notify`
// directly, decoupling the core from its document-store and blob-store
// backends.
// Dependencies: crate::{error, identifiers, model, store_types, time, cancel}
// ============================================================================

//! ## Overview
//! Every method here takes a [`crate::cancel::CancellationToken`] as its last
//! parameter: a token observed already-cancelled must surface
//! [`crate::error::Kind::Cancelled`] before any I/O is issued.
//! Implementations are async because every operation in this contract
//! ultimately crosses an I/O boundary (a document-store round-trip or a
//! blob-store HTTP request); `async_trait` is used rather than native
//! `async fn` in traits so these contracts stay object-safe for
//! `Arc<dyn Store>`-style wiring.

use async_trait::async_trait;

use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::identifiers::ArtifactId;
use crate::identifiers::DeploymentId;
use crate::identifiers::DeviceDeploymentId;
use crate::identifiers::DeviceId;
use crate::identifiers::ReleaseName;
use crate::identifiers::TenantId;
use crate::model::Artifact;
use crate::model::Deployment;
use crate::model::DeploymentLog;
use crate::model::DeploymentStats;
use crate::model::DeviceDeployment;
use crate::model::DeviceDeploymentStatus;
use crate::model::Limit;
use crate::model::LogMessage;
use crate::model::Release;
use crate::model::UploadIntent;
use crate::store_types::CapacityOutcome;
use crate::store_types::DeploymentCandidateFilter;
use crate::store_types::PagedResult;
use crate::store_types::Page;
use crate::store_types::ReleaseFilter;
use crate::store_types::ReleaseSort;
use crate::time::Timestamp;

// ============================================================================
// SECTION: Store
// ============================================================================

/// Per-tenant document store. The store exposes only semantic
/// operations; it never leaks a raw query object to its callers.
///
/// # Invariants
/// - Every method resolves its tenant database via
///   [`crate::identifiers::TenantId`] before issuing any I/O.
#[async_trait]
pub trait Store: Send + Sync {
    // -- Artifacts / Releases -----------------------------------------

    /// Inserts an artifact and upserts its release in a single logical
    /// operation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::Conflict`] carrying the conflicting
    /// `(name, depends_idx)` attribute map when a matching artifact already
    /// exists.
    async fn insert_artifact(&self, tenant: &TenantId, artifact: Artifact, cancel: &CancellationToken) -> Result<Artifact>;

    /// Deletes an artifact and decrements/deletes its release.
    async fn delete_artifact(&self, tenant: &TenantId, id: ArtifactId, cancel: &CancellationToken) -> Result<()>;

    /// Fetches a single artifact by id.
    async fn get_artifact(&self, tenant: &TenantId, id: ArtifactId, cancel: &CancellationToken) -> Result<Option<Artifact>>;

    /// Fetches a release by name.
    async fn get_release(&self, tenant: &TenantId, name: &ReleaseName, cancel: &CancellationToken) -> Result<Option<Release>>;

    /// Lists releases with server-side filtering, sorting, and pagination.
    async fn list_releases(
        &self,
        tenant: &TenantId,
        filter: &ReleaseFilter,
        sort: ReleaseSort,
        page: Page,
        cancel: &CancellationToken,
    ) -> Result<PagedResult<Release>>;

    /// Replaces a release's tag set, enforcing the tenant-wide tag
    /// cardinality bound.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::LimitExceeded`] when the new tag set
    /// would grow the tenant's distinct-tag set beyond `TagsMaxUnique`.
    async fn replace_release_tags(
        &self,
        tenant: &TenantId,
        name: &ReleaseName,
        tags: Vec<String>,
        tags_max_unique: u64,
        cancel: &CancellationToken,
    ) -> Result<Release>;

    /// Updates a release's free-form notes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::Validation`] when `notes` exceeds the
    /// configured maximum length.
    async fn update_release_notes(
        &self,
        tenant: &TenantId,
        name: &ReleaseName,
        notes: String,
        notes_max_length: usize,
        cancel: &CancellationToken,
    ) -> Result<Release>;

    /// Returns the distinct tag set currently in use across every release
    /// of `tenant`.
    async fn distinct_tags(&self, tenant: &TenantId, cancel: &CancellationToken) -> Result<Vec<String>>;

    // -- Deployments -----------------------------------------------------

    /// Inserts a new deployment.
    async fn insert_deployment(&self, tenant: &TenantId, deployment: Deployment, cancel: &CancellationToken) -> Result<Deployment>;

    /// Fetches a deployment by id.
    async fn get_deployment(&self, tenant: &TenantId, id: DeploymentId, cancel: &CancellationToken) -> Result<Option<Deployment>>;

    /// Finds deployments with remaining capacity that may match a requesting
    /// device.
    async fn find_candidate_deployments(
        &self,
        tenant: &TenantId,
        filter: &DeploymentCandidateFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<Deployment>>;

    /// Atomically increments `device_count` on `deployment_id`, guarded by
    /// `device_count < max_devices`.
    async fn reserve_deployment_capacity(
        &self,
        tenant: &TenantId,
        deployment_id: DeploymentId,
        cancel: &CancellationToken,
    ) -> Result<CapacityOutcome>;

    /// Applies an `$inc`-shaped delta to `deployment_id`'s `stats` map and
    /// `statistics.total_size` in one atomic document update.
    async fn adjust_deployment_stats(
        &self,
        tenant: &TenantId,
        deployment_id: DeploymentId,
        decrement: Option<DeviceDeploymentStatus>,
        increment: Option<DeviceDeploymentStatus>,
        size_delta: i64,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Marks a deployment finished once its stats show zero in every active
    /// status.
    async fn finish_deployment(&self, tenant: &TenantId, deployment_id: DeploymentId, finished: Timestamp, cancel: &CancellationToken) -> Result<()>;

    /// Recomputes `stats` for `deployment_id` from an aggregation over the
    /// device-deployment collection.
    async fn reconcile_deployment_stats(&self, tenant: &TenantId, deployment_id: DeploymentId, cancel: &CancellationToken) -> Result<DeploymentStats>;

    // -- Device deployments -----------------------------------------------

    /// Inserts a new device-deployment, assigning `status = pending` (spec
    /// §4.5, "Assignment").
    async fn insert_device_deployment(&self, tenant: &TenantId, device_deployment: DeviceDeployment, cancel: &CancellationToken) -> Result<DeviceDeployment>;

    /// Fetches a device-deployment by id.
    async fn get_device_deployment(&self, tenant: &TenantId, id: DeviceDeploymentId, cancel: &CancellationToken) -> Result<Option<DeviceDeployment>>;

    /// Returns the oldest active device-deployment for `device_id`, sorted
    /// `(created asc, id asc)`.
    async fn get_oldest_active_device_deployment(&self, tenant: &TenantId, device_id: DeviceId, cancel: &CancellationToken) -> Result<Option<DeviceDeployment>>;

    /// Applies a validated status transition to a device-deployment (spec
    /// §4.5, rule 1).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::StateInvalid`] if `from` does not
    /// match the persisted status, or [`crate::error::Kind::NotFound`] if
    /// no such device-deployment exists.
    async fn update_device_deployment_status(
        &self,
        tenant: &TenantId,
        id: DeviceDeploymentId,
        from: DeviceDeploymentStatus,
        to: DeviceDeploymentStatus,
        sub_state: Option<String>,
        finished: Option<Timestamp>,
        cancel: &CancellationToken,
    ) -> Result<DeviceDeployment>;

    /// Returns the per-status device-deployment counts for `deployment_id`.
    async fn aggregate_device_deployment_by_status(&self, tenant: &TenantId, deployment_id: DeploymentId, cancel: &CancellationToken) -> Result<DeploymentStats>;

    /// Transitions every non-terminal device-deployment of `deployment_id`
    /// to `aborted` in a single multi-document update.
    async fn abort_deployment_device_deployments(&self, tenant: &TenantId, deployment_id: DeploymentId, finished: Timestamp, cancel: &CancellationToken) -> Result<u64>;

    /// Terminates every non-terminal device-deployment of `device_id` as
    /// `decommissioned`.
    async fn decommission_device_deployments(&self, tenant: &TenantId, device_id: DeviceId, finished: Timestamp, cancel: &CancellationToken) -> Result<u64>;

    /// Stores a device's submitted execution log.
    async fn append_device_deployment_log(
        &self,
        tenant: &TenantId,
        id: DeviceDeploymentId,
        received: Timestamp,
        messages: Vec<LogMessage>,
        cancel: &CancellationToken,
    ) -> Result<DeploymentLog>;

    // -- Upload intents ----------------------------------------------------

    /// Persists a new upload intent with `status = pending`.
    async fn insert_upload_intent(&self, tenant: &TenantId, intent: UploadIntent, cancel: &CancellationToken) -> Result<UploadIntent>;

    /// Fetches an upload intent by artifact id.
    async fn get_upload_intent(&self, tenant: &TenantId, artifact_id: ArtifactId, cancel: &CancellationToken) -> Result<Option<UploadIntent>>;

    /// Atomically transitions an upload intent from `from` to `to`, failing
    /// if the document has already been reaped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::NotFound`] when no intent in state
    /// `from` exists for `artifact_id`.
    async fn transition_upload_intent(
        &self,
        tenant: &TenantId,
        artifact_id: ArtifactId,
        from: crate::model::UploadStatus,
        to: crate::model::UploadStatus,
        cancel: &CancellationToken,
    ) -> Result<UploadIntent>;

    /// Returns every pending upload intent whose `expires_at` is at or
    /// before `now`.
    async fn find_expired_upload_intents(&self, tenant: &TenantId, now: Timestamp, cancel: &CancellationToken) -> Result<Vec<UploadIntent>>;

    // -- Limits / update types --------------------------------------------

    /// Fetches a named limit.
    async fn get_limit(&self, tenant: &TenantId, name: &str, cancel: &CancellationToken) -> Result<Option<Limit>>;

    /// Sets a named limit.
    async fn set_limit(&self, tenant: &TenantId, limit: Limit, cancel: &CancellationToken) -> Result<()>;

    /// Registers a known update-type name.
    async fn register_update_type(&self, tenant: &TenantId, name: &str, cancel: &CancellationToken) -> Result<()>;

    /// Returns every known update-type name for `tenant`.
    async fn list_update_types(&self, tenant: &TenantId, cancel: &CancellationToken) -> Result<Vec<String>>;

    // -- Schema / migrations ------------------------------------------------

    /// Returns the highest migration version recorded for `tenant`, or
    /// `None` if the tenant database has never been migrated.
    async fn schema_version(&self, tenant: &TenantId, cancel: &CancellationToken) -> Result<Option<u32>>;

    /// Records `version` as the highest applied migration for `tenant`.
    async fn set_schema_version(&self, tenant: &TenantId, version: u32, cancel: &CancellationToken) -> Result<()>;
}

// ============================================================================
// SECTION: Blob Gateway
// ============================================================================

/// A presigned or direct upload/download destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedRequest {
    /// HTTP method the caller must use (`"PUT"` or `"GET"`).
    pub method: &'static str,
    /// The presigned URL.
    pub url: String,
}

/// Blob-store operations consumed by the Registry and the Upload-Intent
/// Coordinator.
///
/// # Invariants
/// - Keys are opaque; tenant isolation is a configuration concern (bucket
///   or key-prefix), never encoded in this trait's method signatures.
#[async_trait]
pub trait BlobGateway: Send + Sync {
    /// Issues a presigned `PUT` URL for `object_key`, valid for `ttl`.
    async fn put_request(&self, object_key: &str, ttl: std::time::Duration, cancel: &CancellationToken) -> Result<PresignedRequest>;

    /// Issues a presigned `GET` URL for `object_key`, valid for `ttl`.
    async fn get_request(&self, object_key: &str, ttl: std::time::Duration, cancel: &CancellationToken) -> Result<PresignedRequest>;

    /// Uploads `body` to `object_key` directly via a single streaming PUT
    /// with no retry, for clients that cannot use a presigned URL.
    async fn upload_artifact(&self, object_key: &str, body: Vec<u8>, cancel: &CancellationToken) -> Result<()>;

    /// Deletes `object_key`.
    async fn delete_object(&self, object_key: &str, cancel: &CancellationToken) -> Result<()>;

    /// Returns the size in bytes of `object_key`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::NotFound`] when the object does not
    /// exist.
    async fn stat_object(&self, object_key: &str, cancel: &CancellationToken) -> Result<u64>;

    /// Returns the last-modified time of `object_key`.
    async fn last_modified(&self, object_key: &str, cancel: &CancellationToken) -> Result<Timestamp>;
}

// ============================================================================
// SECTION: Notifier
// ============================================================================

/// A fire-and-forget outbound notification event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    /// Stable event name (e.g. `"deployment.finished"`).
    pub event: &'static str,
    /// JSON-encoded event payload.
    pub payload: String,
}

/// Best-effort outbound notification sink. Failures here must never
/// propagate to the caller of the operation that triggered the
/// notification — a non-critical-path concern, logged and retried like any
/// other background reaper failure.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `event`. Implementations should log and swallow failures
    /// rather than return them, but the signature still returns `Result`
    /// so a composite notifier can track per-destination failures
    /// internally without changing the trait.
    async fn notify(&self, event: NotificationEvent, cancel: &CancellationToken) -> Result<()>;
}
