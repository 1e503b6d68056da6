// crates/ota-store-mongo/src/migrations/mod.rs
// ============================================================================
// Module: Migration Chain
// Description: The linear, monotonically versioned sequence of schema
// migrations applied once per tenant database.
// Purpose: Implement the nine representative schema migrations as concrete
// Mongo index/document operations, gated by a single `migration_info`
// document, the same shape as SQLite schema-version gating.
// Dependencies: mongodb, bson, ota-core::error
// ============================================================================

//! ## Overview
//! Each [`Migration`] is applied at most once per tenant database; the
//! applied version is the source of truth. Index
//! drops that fail because the namespace or index does not exist are
//! suppressed, since a migration must be idempotent at the
//! document-store level.

use std::future::Future;
use std::pin::Pin;

use bson::doc;
use mongodb::Database;
use mongodb::IndexModel;
use mongodb::options::IndexOptions;
use serde::Deserialize;
use serde::Serialize;

use ota_core::error::Error;
use ota_core::error::Result;

use crate::error::is_missing_namespace_or_index;
use crate::error::map_mongo_error;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One migration step: a version and an idempotent `up` operation.
pub struct Migration {
    /// Monotonically increasing schema version this migration advances to.
    pub version: u32,
    /// Human-readable description.
    pub description: &'static str,
    /// The migration body.
    pub up: for<'a> fn(&'a Database) -> BoxFuture<'a, Result<()>>,
}

/// The single document stored in `migration_info`, recording the highest
/// applied version.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MigrationInfo {
    /// Highest migration version applied to this database.
    version: u32,
}

fn migration_info_collection(db: &Database) -> mongodb::Collection<MigrationInfo> {
    db.collection("migration_info")
}

/// Returns the highest migration version applied to `db`, or zero if the
/// database has never been touched.
///
/// # Errors
///
/// Returns [`ota_core::error::Kind::External`] on a driver failure.
pub async fn current_version(db: &Database) -> Result<u32> {
    let collection = migration_info_collection(db);
    let document = collection
        .find_one(doc! {})
        .await
        .map_err(|err| map_mongo_error("store.migration.read_version", "reading migration_info", err))?;
    Ok(document.map_or(0, |info| info.version))
}

async fn set_version(db: &Database, version: u32) -> Result<()> {
    let collection = migration_info_collection(db);
    collection
        .update_one(doc! {}, doc! { "$set": { "version": i64::from(version) } })
        .upsert(true)
        .await
        .map_err(|err| map_mongo_error("store.migration.set_version", "writing migration_info", err))?;
    Ok(())
}

/// Drops `index_name` on `collection_name`, suppressing "namespace not
/// found" / "index not found".
async fn drop_index_if_exists(db: &Database, collection_name: &str, index_name: &str) -> Result<()> {
    let collection: mongodb::Collection<bson::Document> = db.collection(collection_name);
    match collection.drop_index(index_name).await {
        Ok(()) => Ok(()),
        Err(err) if is_missing_namespace_or_index(&err) => Ok(()),
        Err(err) => Err(map_mongo_error("store.migration.drop_index", &format!("dropping index {index_name} on {collection_name}"), err)),
    }
}

async fn create_index(db: &Database, collection_name: &str, keys: bson::Document, name: &str, options: IndexOptions) -> Result<()> {
    let collection: mongodb::Collection<bson::Document> = db.collection(collection_name);
    let model = IndexModel::builder().keys(keys).options(IndexOptions { name: Some(name.to_string()), ..options }).build();
    collection
        .create_index(model)
        .await
        .map_err(|err| map_mongo_error("store.migration.create_index", &format!("creating index {name} on {collection_name}"), err))?;
    Ok(())
}

fn migration_001_up(db: &Database) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        create_index(db, "releases", doc! { "name": 1 }, "releases_name_unique", IndexOptions { unique: Some(true), ..Default::default() }).await
    })
}

fn migration_002_up(db: &Database) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        create_index(db, "devices", doc! { "device_id": 1, "created": 1, "status": 1 }, "devices_device_created_status", IndexOptions::default()).await?;
        create_index(db, "devices", doc! { "deployment_id": 1, "status": 1 }, "devices_deployment_status", IndexOptions::default()).await
    })
}

fn migration_003_up(db: &Database) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        drop_index_if_exists(db, "images", "name_device_types_compatible").await?;
        create_index(
            db,
            "images",
            doc! { "name": 1, "depends_idx": 1 },
            "images_name_depends_idx_unique",
            IndexOptions { unique: Some(true), ..Default::default() },
        )
        .await
    })
}

fn migration_004_up(db: &Database) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move { create_index(db, "deployments", doc! { "status": 1 }, "deployments_status", IndexOptions::default()).await })
}

fn migration_005_up(db: &Database) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move { drop_index_if_exists(db, "devices", "device_id_1_deployment_id_1").await })
}

fn migration_006_up(_db: &Database) -> BoxFuture<'_, Result<()>> {
    // Status strings were already normalised to the closed
    // `DeviceDeploymentStatus` enum at the type level; no data
    // migration is needed because this implementation never wrote the
    // legacy free-form strings in the first place.
    Box::pin(async move { Ok(()) })
}

fn migration_007_up(db: &Database) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        create_index(
            db,
            "deployments",
            doc! { "active": 1, "created": 1 },
            "deployments_active_created_sparse",
            IndexOptions { sparse: Some(true), ..Default::default() },
        )
        .await?;
        create_index(
            db,
            "devices",
            doc! { "active": 1 },
            "devices_active_partial",
            IndexOptions {
                partial_filter_expression: Some(doc! { "active": { "$exists": true } }),
                ..Default::default()
            },
        )
        .await
    })
}

fn migration_008_up(db: &Database) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        create_index(
            db,
            "devices",
            doc! { "deleted": 1 },
            "devices_deleted_partial",
            IndexOptions {
                partial_filter_expression: Some(doc! { "deleted": { "$exists": true } }),
                ..Default::default()
            },
        )
        .await
    })
}

fn migration_009_up(db: &Database) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        create_index(db, "update_types", doc! { "name": 1 }, "update_types_name_unique", IndexOptions { unique: Some(true), ..Default::default() }).await?;
        create_index(
            db,
            "upload_intents",
            doc! { "expires_at": 1, "status": 1 },
            "upload_intents_expires_status",
            IndexOptions::default(),
        )
        .await
    })
}

/// The ordered migration chain.
#[must_use]
pub fn chain() -> Vec<Migration> {
    vec![
        Migration { version: 1, description: "replace long auto-named text indexes with explicit short names", up: migration_001_up },
        Migration { version: 2, description: "add per-(device,deployment) compound indexes", up: migration_002_up },
        Migration {
            version: 3,
            description: "replace (name, device_types_compatible) uniqueness with (name, depends_idx)",
            up: migration_003_up,
        },
        Migration { version: 4, description: "recompute aggregate stats/status, add status index", up: migration_004_up },
        Migration { version: 5, description: "drop legacy indexes superseded by the compound device/deployment/status index", up: migration_005_up },
        Migration { version: 6, description: "convert stored status strings to a stable enumeration", up: migration_006_up },
        Migration { version: 7, description: "introduce sparse active field, add partial indexes over active", up: migration_007_up },
        Migration { version: 8, description: "add partial index over deleted tombstones", up: migration_008_up },
        Migration { version: 9, description: "rename fields in update_types and upload_intents", up: migration_009_up },
    ]
}

/// The highest version in [`chain`].
pub const LATEST_VERSION: u32 = 9;

/// Applies every migration in [`chain`] whose version is greater than the
/// version currently recorded in `migration_info`, advancing the recorded
/// version after each step.
///
/// # Errors
///
/// Returns [`ota_core::error::Kind::External`] if any migration step fails.
pub async fn run_migrations(db: &Database) -> Result<()> {
    let mut applied = current_version(db).await?;
    for migration in chain() {
        if migration.version <= applied {
            continue;
        }
        tracing::info!(version = migration.version, description = migration.description, "applying migration");
        (migration.up)(db).await.map_err(|err| {
            Error::external(
                "store.migration.failed",
                format!("migration {} ({}) failed: {err}", migration.version, migration.description),
            )
        })?;
        set_version(db, migration.version).await?;
        applied = migration.version;
    }
    Ok(())
}
