// crates/ota-core/src/store_types.rs
// ============================================================================
// Module: Store Request/Response Types
// Description: The parameter and result shapes the `Store` trait's semantic
// operations accept and return.
// Purpose: Keep the store's public surface limited to named operations; it
// never leaks raw query objects to callers.
// Dependencies: crate::{identifiers, model, time}, serde
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::identifiers::ReleaseName;
use crate::time::Timestamp;

/// Sort direction for a listing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// The field a release listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseSortField {
    /// Sort by `name`.
    Name,
    /// Sort by `modified`.
    Modified,
    /// Sort by `artifacts_count`.
    ArtifactsCount,
    /// Sort by the number of tags.
    Tags,
}

/// A release listing sort key; defaults to `(name, asc)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSort {
    /// Field to sort by.
    pub field: ReleaseSortField,
    /// Sort direction.
    pub direction: SortDirection,
}

impl Default for ReleaseSort {
    fn default() -> Self {
        Self { field: ReleaseSortField::Name, direction: SortDirection::Asc }
    }
}

/// Server-side filter predicate for a release listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFilter {
    /// Exact or partial name match.
    pub name: Option<String>,
    /// Partial description match, evaluated against any member artifact.
    pub description: Option<String>,
    /// Releases must carry every listed tag (intersection, not union).
    pub tags: Vec<String>,
    /// Releases must have at least one artifact compatible with this device type.
    pub device_type: Option<String>,
    /// Releases must carry this update type among `update_types`.
    pub update_type: Option<String>,
}

/// Offset/limit pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based row offset.
    pub offset: u64,
    /// Maximum rows to return.
    pub limit: u64,
}

/// A page of results plus the total count across the whole (unpaginated)
/// result set; the count is returned independently of the page size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// The requested page of items.
    pub items: Vec<T>,
    /// Total number of items matching the filter, ignoring pagination.
    pub total_count: u64,
}

/// The attribute map a device presents when requesting work or being
/// matched against `depends`.
pub type DeviceDescription = BTreeMap<String, String>;

/// Criteria used by the engine to find deployments a device may be assigned
/// to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentCandidateFilter {
    /// Device group name, if the device belongs to one.
    pub group: Option<String>,
    /// Device id, used to exclude deployments the device already has a
    /// device-deployment for.
    pub exclude_deployment_ids: Vec<crate::identifiers::DeploymentId>,
}

/// Result of attempting to assign capacity on a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityOutcome {
    /// The conditional increment succeeded; the caller may proceed.
    Reserved,
    /// `device_count` had already reached `max_devices`.
    Exhausted,
}

/// A new release to upsert as part of artifact insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseUpsert {
    /// Release name.
    pub name: ReleaseName,
    /// Modification time to stamp on the release.
    pub modified: Timestamp,
}
