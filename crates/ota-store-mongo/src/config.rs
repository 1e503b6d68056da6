// crates/ota-store-mongo/src/config.rs
// ============================================================================
// Module: Store Configuration
// Description: Connection and migration-policy settings for the MongoDB
// document store.
// Purpose: Separate "how to connect" from `ota_core`'s `Store` trait so the
// trait itself never mentions a connection string.
// Dependencies: ota_config::{DocumentStoreConfig, AutoMigrate}
// ============================================================================

use ota_config::AutoMigrate;
use ota_config::DocumentStoreConfig;

/// Configuration for [`crate::MongoStore::connect`].
#[derive(Debug, Clone)]
pub struct MongoStoreConfig {
    /// Document-store connection settings.
    pub document_store: DocumentStoreConfig,
    /// Base database name; `db_name(tenant)` derives the per-tenant name
    /// from this base.
    pub base_database: String,
    /// Migration application policy.
    pub auto_migrate: AutoMigrate,
}
