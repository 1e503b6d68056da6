// crates/ota-store-mongo/src/lib.rs
// ============================================================================
// Crate: ota-store-mongo
// Description: MongoDB-backed implementation of `ota_core::Store` (spec
// §4.1).
// Purpose: Per-tenant database selection, CRUD on the primary collections,
// and the migration chain that keeps a tenant database's schema current.
// Dependencies: mongodb, bson, ota-core, ota-config
// ============================================================================

//! # ota-store-mongo
//!
//! A config struct, a `connect` constructor, and typed collection handles
//! rather than raw query objects returned to callers.

pub mod config;
pub mod error;
pub mod migrations;
mod store_impl;

use mongodb::Client;
use mongodb::Collection;
use mongodb::Database;
use mongodb::options::ClientOptions;
use mongodb::options::Credential;

use ota_config::AutoMigrate;
use ota_core::error::Error;
use ota_core::error::Result;
use ota_core::identifiers::TenantId;
use ota_core::model::Artifact;
use ota_core::model::Deployment;
use ota_core::model::DeploymentLog;
use ota_core::model::DeviceDeployment;
use ota_core::model::Limit;
use ota_core::model::Release;
use ota_core::model::UploadIntent;

use crate::config::MongoStoreConfig;

/// Derives the per-tenant database name:
/// `db_name(tenant) = "<base>" + (tenant == "" ? "" : "-" + tenant)`.
#[must_use]
pub fn db_name(base: &str, tenant: &TenantId) -> String {
    if tenant.is_base() { base.to_string() } else { format!("{base}-{}", tenant.as_str()) }
}

/// MongoDB-backed `Store`.
///
/// # Invariants
/// - `client` and the per-tenant `Database` handles are safe for
///   concurrent use.
pub struct MongoStore {
    client: Client,
    base_database: String,
    auto_migrate: AutoMigrate,
}

impl MongoStore {
    /// Connects to MongoDB using `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ota_core::error::Kind::External`] if the driver fails to
    /// parse the connection string or establish a client handle.
    pub async fn connect(config: MongoStoreConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(&config.document_store.uri)
            .await
            .map_err(|err| error::map_mongo_error("store.connect", "parsing connection uri", err))?;
        if let (Some(username), Some(password)) = (config.document_store.username, config.document_store.password) {
            options.credential = Some(Credential::builder().username(username).password(password).build());
        }
        let client = Client::with_options(options).map_err(|err| error::map_mongo_error("store.connect", "building client", err))?;
        Ok(Self { client, base_database: config.base_database, auto_migrate: config.auto_migrate })
    }

    /// Returns the tenant-scoped database handle.
    #[must_use]
    pub fn database(&self, tenant: &TenantId) -> Database {
        self.client.database(&db_name(&self.base_database, tenant))
    }

    /// Ensures `tenant`'s database is migrated to the current schema
    /// version, honoring [`AutoMigrate`].
    ///
    /// # Errors
    ///
    /// Returns [`ota_core::error::Kind::External`] if a migration step
    /// fails, or [`ota_core::error::Kind::StateInvalid`] if the database is
    /// behind schema and `auto_migrate` is [`AutoMigrate::Off`].
    pub async fn ensure_migrated(&self, tenant: &TenantId) -> Result<()> {
        if matches!(self.auto_migrate, AutoMigrate::Off) {
            let db = self.database(tenant);
            let current = migrations::current_version(&db).await?;
            if current < migrations::LATEST_VERSION {
                return Err(Error::state_invalid(
                    "store.migration.required",
                    format!("tenant database is at version {current}, needs {}; auto_migrate is off", migrations::LATEST_VERSION),
                ));
            }
            return Ok(());
        }
        let db = self.database(tenant);
        migrations::run_migrations(&db).await
    }

    fn images(&self, tenant: &TenantId) -> Collection<Artifact> {
        self.database(tenant).collection("images")
    }

    fn releases(&self, tenant: &TenantId) -> Collection<Release> {
        self.database(tenant).collection("releases")
    }

    fn deployments(&self, tenant: &TenantId) -> Collection<Deployment> {
        self.database(tenant).collection("deployments")
    }

    fn devices(&self, tenant: &TenantId) -> Collection<DeviceDeployment> {
        self.database(tenant).collection("devices")
    }

    fn devices_logs(&self, tenant: &TenantId) -> Collection<DeploymentLog> {
        self.database(tenant).collection("devices_logs")
    }

    fn limits(&self, tenant: &TenantId) -> Collection<Limit> {
        self.database(tenant).collection("limits")
    }

    fn upload_intents(&self, tenant: &TenantId) -> Collection<UploadIntent> {
        self.database(tenant).collection("upload_intents")
    }

    fn update_types(&self, tenant: &TenantId) -> Collection<UpdateTypeRecord> {
        self.database(tenant).collection("update_types")
    }
}

/// A document in `update_types` recording one known update-type name (spec
/// §2, "Limits & Update-Type Registry").
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub(crate) struct UpdateTypeRecord {
    /// The update-type name.
    pub name: String,
}
