// crates/ota-core/src/model/deployment.rs
// ============================================================================
// Module: Deployment
// Description: A rollout of one release/artifact to a set of devices (spec
// §3, §4.4, §4.5).
// Purpose: Carry both the immutable request a caller made (NewDeployment)
// and the mutable rollout record the engine maintains (Deployment).
// Dependencies: crate::{identifiers, model::device_deployment, time}, serde
// ============================================================================

//! ## Overview
//! [`NewDeployment`] is the caller-supplied creation request; [`Deployment`] is the persisted, engine-owned
//! record. Keeping them as separate types means the engine never has to
//! guess which fields a caller actually set versus which were derived.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::DeploymentId;
use crate::identifiers::ReleaseName;
use crate::model::device_deployment::DeviceDeploymentStatus;
use crate::time::Timestamp;

/// Distinguishes a deployment targeting an explicit device list/group filter
/// from one targeting every device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentKind {
    /// Targets devices matching a group name and/or filter expression.
    Targeted,
    /// Targets every device known to the tenant at rollout time.
    AllDevices,
}

/// One phase of a phased rollout.
///
/// # Invariants
/// - `batch_size` is a percentage in `1..=100` for all but the last phase,
///   which may omit it to mean "the remainder".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPhase {
    /// Percentage of the target population this phase assigns, or `None`
    /// for "the remainder" (only valid on the last phase).
    pub batch_size: Option<u8>,
    /// Minimum number of devices that must reach a terminal success status
    /// in this phase before the next phase starts.
    pub start_ts: Option<Timestamp>,
    /// Number of devices assigned so far within this phase.
    pub device_count: u64,
}

/// The overall lifecycle status of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    /// `stats` has a nonzero count only in the `pending` status; no
    /// device-deployment has started executing yet.
    Pending,
    /// At least one device-deployment has left `pending` for an active or
    /// terminal status.
    InProgress,
    /// Every device-deployment reached a terminal status.
    Finished,
}

/// Aggregate per-status device-deployment counters, kept current by [the engine's reconciliation
/// routine](crate).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStats {
    counts: BTreeMap<String, u64>,
}

impl DeploymentStats {
    /// Returns a stats map seeded with zero for every known status (spec
    /// §4.5, "stats are always present for every status, not just the ones
    /// seen so far").
    #[must_use]
    pub fn zeroed() -> Self {
        let counts = DeviceDeploymentStatus::all().into_iter().map(|status| (status.as_str().to_string(), 0)).collect();
        Self { counts }
    }

    /// Returns the counter for `status`.
    #[must_use]
    pub fn get(&self, status: DeviceDeploymentStatus) -> u64 {
        self.counts.get(status.as_str()).copied().unwrap_or(0)
    }

    /// Sets the counter for `status`.
    pub fn set(&mut self, status: DeviceDeploymentStatus, count: u64) {
        self.counts.insert(status.as_str().to_string(), count);
    }

    /// Increments the counter for `status` by one.
    pub fn increment(&mut self, status: DeviceDeploymentStatus) {
        *self.counts.entry(status.as_str().to_string()).or_insert(0) += 1;
    }

    /// Decrements the counter for `status` by one, saturating at zero.
    pub fn decrement(&mut self, status: DeviceDeploymentStatus) {
        let entry = self.counts.entry(status.as_str().to_string()).or_insert(0);
        *entry = entry.saturating_sub(1);
    }

    /// Returns the sum of every counter.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Returns the sum of counters for statuses where
    /// [`DeviceDeploymentStatus::is_terminal`] holds.
    #[must_use]
    pub fn total_terminal(&self) -> u64 {
        DeviceDeploymentStatus::all().into_iter().filter(|status| status.is_terminal()).map(|status| self.get(status)).sum()
    }
}

/// The caller-supplied request to create a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDeployment {
    /// Deployment name.
    pub name: String,
    /// Release to roll out.
    pub release_name: ReleaseName,
    /// Deployment kind.
    pub kind: DeploymentKind,
    /// Device group name to target, when `kind` is `Targeted`.
    pub group: Option<String>,
    /// Filter expression to target, when `kind` is `Targeted`.
    pub filter_id: Option<String>,
    /// Maximum number of devices this deployment may ever assign; `None`
    /// means unbounded.
    pub max_devices: Option<u64>,
    /// Maximum retries per device-deployment.
    pub retries: u32,
    /// Force reinstallation even if a device reports the target artifact
    /// already installed.
    pub force_installation: bool,
    /// Rollout phases; empty means a single unphased rollout.
    pub phases: Vec<DeploymentPhase>,
}

/// A rollout of one release to a set of devices.
///
/// # Invariants
/// - `device_count <= max_devices` whenever `max_devices` is set.
/// - `status == Finished` iff `stats.total_terminal() == device_count` and
///   `device_count > 0`.
/// - `finished.is_some()` iff `status == Finished`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Deployment identifier.
    pub id: DeploymentId,
    /// Deployment name.
    pub name: String,
    /// Release name rolled out by this deployment.
    pub release_name: ReleaseName,
    /// Deployment kind.
    pub kind: DeploymentKind,
    /// Device group name, when `kind` is `Targeted`.
    pub group: Option<String>,
    /// Filter expression, when `kind` is `Targeted`.
    pub filter_id: Option<String>,
    /// Maximum number of devices this deployment may ever assign.
    pub max_devices: Option<u64>,
    /// Number of device-deployments created so far.
    pub device_count: u64,
    /// Number of devices present in the target population at creation time.
    pub initial_device_count: u64,
    /// Maximum retries per device-deployment.
    pub retries: u32,
    /// Force reinstallation even when a device reports the artifact already
    /// installed.
    pub force_installation: bool,
    /// Rollout phases; empty means a single unphased rollout.
    pub phases: Vec<DeploymentPhase>,
    /// Creation time.
    pub created: Timestamp,
    /// Time every device-deployment reached a terminal status.
    pub finished: Option<Timestamp>,
    /// Sparse active flag; set while `status != Finished`.
    pub active: Option<bool>,
    /// Current lifecycle status.
    pub status: DeploymentStatus,
    /// Aggregate per-status device-deployment counters.
    pub stats: DeploymentStats,
    /// Sum of the sizes (bytes) of every artifact assigned by this
    /// deployment, across all device-deployments.
    pub total_size: u64,
}

impl Deployment {
    /// Returns true when every device-deployment has reached a terminal
    /// status and at least one device-deployment exists.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.device_count > 0 && self.stats.total_terminal() >= self.device_count
    }
}
