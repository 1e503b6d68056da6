// crates/ota-config/src/lib.rs
// ============================================================================
// Crate: ota-config
// Description: Typed configuration structs for the deployment engine's
// options (`DocumentStore.*`, `BlobStore.*`, `PresignExpire`,
// `TagsMaxUnique`, `NotesMaxLength`, `AutoMigrate`).
// Purpose: Give a host CLI a single `serde::Deserialize` struct to feed from
// TOML/JSON/env, without this crate owning the loader itself — the CLI and
// configuration loader remain an external collaborator.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! No field here is read from the process environment directly; no
//! environment variables are consumed directly by the core. A host binary
//! is responsible for populating a [`Config`] value and handing it to
//! `ota-store-mongo`/`ota-blobstore` at startup.

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

/// Document-store connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStoreConfig {
    /// Connection URI (e.g. `mongodb://host:27017`).
    pub uri: String,
    /// Username, when the URI does not already carry credentials.
    #[serde(default)]
    pub username: Option<String>,
    /// Password, when the URI does not already carry credentials.
    #[serde(default)]
    pub password: Option<String>,
}

/// Blob-store connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobStoreConfig {
    /// S3-compatible endpoint URL.
    pub endpoint: String,
    /// Bucket name.
    pub bucket: String,
    /// Region.
    pub region: String,
    /// External URI used in presigned URLs returned to callers, when it
    /// differs from `endpoint` (e.g. a public-facing hostname behind a
    /// private endpoint).
    #[serde(default)]
    pub external_uri: Option<String>,
}

/// Migration application policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoMigrate {
    /// Never apply migrations automatically; a tenant database that is
    /// behind the current schema version is treated as an error.
    Off,
    /// Apply migrations on demand, the first time a tenant database is
    /// touched within a process lifetime.
    Manual,
    /// Always check and apply pending migrations before serving a request
    /// against a tenant database.
    Always,
}

/// Default presign expiry: 15 minutes.
const DEFAULT_PRESIGN_EXPIRE: Duration = Duration::from_secs(15 * 60);

fn default_presign_expire() -> Duration {
    DEFAULT_PRESIGN_EXPIRE
}

fn default_tags_max_unique() -> u64 {
    100
}

/// Matches `ota_core::model::release::DEFAULT_NOTES_MAX_LENGTH`; duplicated
/// here rather than imported so this crate stays free of a dependency on
/// `ota-core`.
fn default_notes_max_length() -> usize {
    4096
}

/// The full set of options the core recognises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Document-store connection settings.
    pub document_store: DocumentStoreConfig,
    /// Blob-store connection settings.
    pub blob_store: BlobStoreConfig,
    /// Presigned-URL expiry bound.
    #[serde(with = "duration_seconds", default = "default_presign_expire")]
    pub presign_expire: Duration,
    /// Tenant-wide distinct-tag cardinality bound.
    #[serde(default = "default_tags_max_unique")]
    pub tags_max_unique: u64,
    /// Maximum length of a release's `notes` field.
    #[serde(default = "default_notes_max_length")]
    pub notes_max_length: usize,
    /// Migration application policy.
    pub auto_migrate: AutoMigrate,
}

mod duration_seconds {
    use std::time::Duration;

    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
