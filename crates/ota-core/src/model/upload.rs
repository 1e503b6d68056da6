// crates/ota-core/src/model/upload.rs
// ============================================================================
// Module: UploadIntent
// Description: A time-boxed intent to upload an artifact directly to blob
// storage.
// Purpose: Let a caller obtain a presigned (or single-shot) upload
// destination without routing the artifact bytes through the control plane.
// Dependencies: crate::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! An [`UploadIntent`] is created in [`UploadStatus::Pending`], transitions
//! to [`UploadStatus::Completed`] once the caller reports success (spec
//! §4.6, "Complete Upload"), and is reaped into
//! [`UploadStatus::Expired`] by the coordinator's background sweep once
//! `expires_at` passes without a completion.

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::ArtifactId;
use crate::time::Timestamp;

/// The upload transport offered to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadMethod {
    /// A single presigned `PUT` URL for the whole artifact.
    SinglePut,
    /// A presigned multipart upload (large artifacts).
    Multipart,
}

/// The lifecycle status of an upload intent.
///
/// # Invariants
/// - Once [`Self::Completed`], [`Self::Expired`], or [`Self::Aborted`], the
///   intent never transitions again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    /// Created, awaiting completion or expiry.
    Pending,
    /// The caller reported a successful upload; the artifact is now live.
    Completed,
    /// `expires_at` passed with no completion report.
    Expired,
    /// The caller explicitly abandoned the intent.
    Aborted,
}

impl UploadStatus {
    /// Returns true for statuses that accept no further transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Expired | Self::Aborted)
    }
}

/// A time-boxed intent to upload one artifact directly to blob storage.
///
/// # Invariants
/// - `expires_at` is fixed at creation time and never extended; a caller
///   that needs more time requests a new intent.
/// - `artifact_id` is reserved (but not yet visible in listings) from
///   creation until the intent reaches a terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadIntent {
    /// Upload intent identifier, also used as the reserved artifact's id.
    pub artifact_id: ArtifactId,
    /// Release name the artifact will belong to once the upload completes.
    pub release_name: String,
    /// Upload method offered to the caller.
    pub method: UploadMethod,
    /// Destination object key in blob storage.
    pub object_key: String,
    /// Creation time.
    pub created: Timestamp,
    /// Time after which the intent is eligible for expiry.
    pub expires_at: Timestamp,
    /// Current status.
    pub status: UploadStatus,
}

impl UploadIntent {
    /// Returns true if `now` is at or past `expires_at` and the intent is
    /// still pending.
    #[must_use]
    pub fn is_reapable(&self, now: Timestamp) -> bool {
        self.status == UploadStatus::Pending && !now.is_before(self.expires_at)
    }
}
