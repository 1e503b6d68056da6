// crates/ota-registry/src/limits.rs
// ============================================================================
// Module: Limits & Update-Type Registry
// Description: Named, tenant-scoped numeric ceilings and the set of
// update-type names ever seen for a tenant.
// Purpose: Give operators a generic quota knob and let callers validate an
// update type name against what has actually been registered.
// Dependencies: ota-core
// ============================================================================

use ota_core::CancellationToken;
use ota_core::Result;
use ota_core::identifiers::TenantId;
use ota_core::model::Limit;

use crate::Registry;

impl Registry {
    /// Fetches a named limit.
    pub async fn get_limit(&self, tenant: &TenantId, name: &str, cancel: &CancellationToken) -> Result<Option<Limit>> {
        self.store.get_limit(tenant, name, cancel).await
    }

    /// Sets a named limit.
    pub async fn set_limit(&self, tenant: &TenantId, limit: Limit, cancel: &CancellationToken) -> Result<()> {
        self.store.set_limit(tenant, limit, cancel).await
    }

    /// Returns every update-type name registered for `tenant`.
    pub async fn list_update_types(&self, tenant: &TenantId, cancel: &CancellationToken) -> Result<Vec<String>> {
        self.store.list_update_types(tenant, cancel).await
    }

    /// Returns true when `name` has been registered for `tenant`, i.e. some
    /// artifact previously declared it among its `updates`.
    pub async fn is_known_update_type(&self, tenant: &TenantId, name: &str, cancel: &CancellationToken) -> Result<bool> {
        Ok(self.store.list_update_types(tenant, cancel).await?.iter().any(|known| known == name))
    }
}
