// crates/ota-registry/src/release.rs
// ============================================================================
// Module: Release Listing and Metadata
// Description: Thin, validating wrappers over the store's release listing,
// tag-replacement, and notes-update operations.
// Purpose: Give callers a single entry point for release reads/metadata
// writes without duplicating the store's filter/sort/pagination shapes.
// Dependencies: ota-core
// ============================================================================

use ota_core::CancellationToken;
use ota_core::Result;
use ota_core::identifiers::ReleaseName;
use ota_core::identifiers::TenantId;
use ota_core::model::Release;
use ota_core::store_types::Page;
use ota_core::store_types::PagedResult;
use ota_core::store_types::ReleaseFilter;
use ota_core::store_types::ReleaseSort;

use crate::Registry;

impl Registry {
    /// Fetches a release by name.
    pub async fn get_release(&self, tenant: &TenantId, name: &ReleaseName, cancel: &CancellationToken) -> Result<Option<Release>> {
        self.store.get_release(tenant, name, cancel).await
    }

    /// Lists releases with server-side filtering, sorting, and pagination;
    /// the total count ignores the page bounds (spec §4.3, "Listing").
    pub async fn list_releases(
        &self,
        tenant: &TenantId,
        filter: &ReleaseFilter,
        sort: ReleaseSort,
        page: Page,
        cancel: &CancellationToken,
    ) -> Result<PagedResult<Release>> {
        self.store.list_releases(tenant, filter, sort, page, cancel).await
    }

    /// Replaces a release's tag set, enforcing the tenant-wide distinct-tag
    /// cardinality bound (spec §8 property 6).
    pub async fn replace_release_tags(
        &self,
        tenant: &TenantId,
        name: &ReleaseName,
        tags: Vec<String>,
        tags_max_unique: u64,
        cancel: &CancellationToken,
    ) -> Result<Release> {
        let deduped: Vec<String> = tags.into_iter().collect::<std::collections::BTreeSet<_>>().into_iter().collect();
        self.store.replace_release_tags(tenant, name, deduped, tags_max_unique, cancel).await
    }

    /// Replaces a release's free-form notes, enforcing the configured
    /// maximum length.
    pub async fn update_release_notes(
        &self,
        tenant: &TenantId,
        name: &ReleaseName,
        notes: String,
        notes_max_length: usize,
        cancel: &CancellationToken,
    ) -> Result<Release> {
        self.store.update_release_notes(tenant, name, notes, notes_max_length, cancel).await
    }

    /// Returns the distinct tag set currently in use across the tenant.
    pub async fn distinct_tags(&self, tenant: &TenantId, cancel: &CancellationToken) -> Result<Vec<String>> {
        self.store.distinct_tags(tenant, cancel).await
    }
}
