// crates/ota-core/src/model/device_deployment.rs
// ============================================================================
// Module: DeviceDeployment
// Description: The per-device instance of a deployment and its state
// machine.
// Purpose: Give the engine a single tagged-sum-type status instead of
// free-form strings.
// Dependencies: crate::{identifiers, model::artifact, time}, serde
// ============================================================================

//! ## Overview
//! [`DeviceDeploymentStatus`] is a closed enum with a total `from_str`/
//! `to_str` pair. [`DeviceDeploymentStatus::is_transition_allowed`] is the
//! single source of truth for the state diagram; the engine (`ota-engine`)
//! never inlines the diagram itself.

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::ArtifactId;
use crate::identifiers::DeploymentId;
use crate::identifiers::DeviceDeploymentId;
use crate::identifiers::DeviceId;
use crate::model::artifact::Artifact;
use crate::time::Timestamp;

/// The closed set of per-device deployment statuses.
///
/// # Invariants
/// - Variants are stable for serialization; no status string outside this
///   set is ever persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceDeploymentStatus {
    /// Assigned, not yet downloading.
    Pending,
    /// Downloading the artifact.
    Downloading,
    /// Installing the artifact.
    Installing,
    /// Rebooting to complete installation.
    Rebooting,
    /// Paused before the install step, awaiting resume.
    PauseBeforeInstall,
    /// Paused before the commit step, awaiting resume.
    PauseBeforeCommit,
    /// Paused before the final reboot, awaiting resume.
    PauseBeforeReboot,
    /// Terminal: the update completed successfully.
    Success,
    /// Terminal: the update failed (retries exhausted).
    Failure,
    /// Terminal: the device already had the target artifact installed.
    AlreadyInstalled,
    /// Terminal: the resolver found no matching artifact.
    NoArtifact,
    /// Terminal: the deployment (or this device-deployment) was aborted.
    Aborted,
    /// Terminal: the device was decommissioned.
    Decommissioned,
}

impl DeviceDeploymentStatus {
    /// Returns the stable wire name for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Downloading => "downloading",
            Self::Installing => "installing",
            Self::Rebooting => "rebooting",
            Self::PauseBeforeInstall => "pause_before_install",
            Self::PauseBeforeCommit => "pause_before_commit",
            Self::PauseBeforeReboot => "pause_before_reboot",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::AlreadyInstalled => "already_installed",
            Self::NoArtifact => "no_artifact",
            Self::Aborted => "aborted",
            Self::Decommissioned => "decommissioned",
        }
    }

    /// Parses a status from its stable wire name.
    ///
    /// # Errors
    ///
    /// Returns `Err` when `value` is not one of the known status names.
    pub fn from_str_strict(value: &str) -> Result<Self, String> {
        Ok(match value {
            "pending" => Self::Pending,
            "downloading" => Self::Downloading,
            "installing" => Self::Installing,
            "rebooting" => Self::Rebooting,
            "pause_before_install" => Self::PauseBeforeInstall,
            "pause_before_commit" => Self::PauseBeforeCommit,
            "pause_before_reboot" => Self::PauseBeforeReboot,
            "success" => Self::Success,
            "failure" => Self::Failure,
            "already_installed" => Self::AlreadyInstalled,
            "no_artifact" => Self::NoArtifact,
            "aborted" => Self::Aborted,
            "decommissioned" => Self::Decommissioned,
            other => return Err(format!("unknown device-deployment status: {other}")),
        })
    }

    /// Returns every status in the closed set (used to seed stats maps and
    /// for exhaustive reconciliation scans).
    #[must_use]
    pub const fn all() -> [Self; 13] {
        [
            Self::Pending,
            Self::Downloading,
            Self::Installing,
            Self::Rebooting,
            Self::PauseBeforeInstall,
            Self::PauseBeforeCommit,
            Self::PauseBeforeReboot,
            Self::Success,
            Self::Failure,
            Self::AlreadyInstalled,
            Self::NoArtifact,
            Self::Aborted,
            Self::Decommissioned,
        ]
    }

    /// Returns true for terminal statuses; `active` is unset for all of
    /// these.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success
                | Self::Failure
                | Self::AlreadyInstalled
                | Self::NoArtifact
                | Self::Aborted
                | Self::Decommissioned
        )
    }

    /// Returns true for the statuses that keep `active` set.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Returns true when a transition from `self` to `next` is allowed by
    /// the state diagram.
    #[must_use]
    pub const fn is_transition_allowed(self, next: Self) -> bool {
        match self {
            Self::Pending => matches!(
                next,
                Self::Downloading | Self::Failure | Self::AlreadyInstalled | Self::NoArtifact | Self::Aborted | Self::Decommissioned
            ),
            Self::Downloading => matches!(next, Self::Installing | Self::Failure | Self::Aborted | Self::Decommissioned),
            Self::Installing => matches!(
                next,
                Self::PauseBeforeInstall | Self::Rebooting | Self::PauseBeforeCommit | Self::Failure | Self::Aborted | Self::Decommissioned
            ),
            Self::PauseBeforeInstall => matches!(next, Self::Installing | Self::Aborted | Self::Decommissioned),
            Self::PauseBeforeCommit => matches!(next, Self::Rebooting | Self::Aborted | Self::Decommissioned),
            Self::Rebooting => matches!(
                next,
                Self::PauseBeforeReboot | Self::Success | Self::Failure | Self::Aborted | Self::Decommissioned
            ),
            Self::PauseBeforeReboot => matches!(next, Self::Rebooting | Self::Aborted | Self::Decommissioned),
            Self::Success
            | Self::Failure
            | Self::AlreadyInstalled
            | Self::NoArtifact
            | Self::Aborted
            | Self::Decommissioned => false,
        }
    }
}

/// The last delivery instruction issued to a device for a device-deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryInstruction {
    /// Artifact to download, when one was resolved.
    pub artifact_id: Option<ArtifactId>,
    /// Presigned or direct download URI for the artifact, when applicable.
    pub download_uri: Option<String>,
    /// Time the instruction was issued.
    pub issued_at: Timestamp,
}

/// The per-device instance of a deployment.
///
/// # Invariants
/// - Exactly one per `(deployment_id, device_id)` pair (enforced by the
///   store's unique index, not by this type).
/// - `active` is `Some(true)` iff `status.is_active()`.
/// - `deleted.is_some()` excludes the record from listings unless
///   explicitly requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDeployment {
    /// Device-deployment identifier.
    pub id: DeviceDeploymentId,
    /// Parent deployment identifier.
    pub deployment_id: DeploymentId,
    /// Target device identifier.
    pub device_id: DeviceId,
    /// Creation time.
    pub created: Timestamp,
    /// Current status.
    pub status: DeviceDeploymentStatus,
    /// Free-form sub-state reported by the device (e.g. a specific install
    /// phase detail); not interpreted by the engine.
    pub sub_state: Option<String>,
    /// Time the device-deployment reached a terminal status.
    pub finished: Option<Timestamp>,
    /// Tombstone time; `Some` excludes this record from default listings.
    pub deleted: Option<Timestamp>,
    /// Sparse active flag, set iff `status.is_active()`.
    pub active: Option<bool>,
    /// Snapshot of the assigned artifact, when one was resolved.
    pub image: Option<Artifact>,
    /// Number of retries consumed so far.
    pub retries: u32,
    /// Number of download/install cycles attempted so far.
    pub attempts: u32,
    /// Whether a device-side execution log is available.
    pub is_log_available: bool,
    /// Last delivery instruction issued to the device.
    pub request: Option<DeliveryInstruction>,
}

impl DeviceDeployment {
    /// Returns the `active` flag value that must hold for `status` (spec
    /// §3).
    #[must_use]
    pub const fn active_flag_for(status: DeviceDeploymentStatus) -> Option<bool> {
        if status.is_active() { Some(true) } else { None }
    }
}
