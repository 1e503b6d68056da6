// crates/ota-core/src/identifiers.rs
// ============================================================================
// Module: Core Identifiers
// Description: Strongly typed identifiers for tenants, artifacts, releases,
// deployments, devices, and upload intents.
// Purpose: Prevent accidental cross-entity id mixups at compile time.
// Dependencies: serde, uuid
// ============================================================================

//! ## Overview
//! All persisted identifiers are UUIDs except [`TenantId`], which is the raw
//! tenant slug used to derive a per-tenant database name, and
//! [`ReleaseName`] / update-type / tag strings, which are names rather than
//! surrogate keys.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Tenant identifier. The empty string names the base (no-tenant) database.
///
/// # Invariants
/// - Never contains characters that are invalid in a Mongo database name
///   (validated at construction).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

/// Characters rejected in a tenant identifier because Mongo forbids them in
/// database names.
const INVALID_TENANT_CHARS: &[char] = &['/', '\\', '.', ' ', '"', '$', '*', '<', '>', ':', '|', '?'];

impl TenantId {
    /// The base tenant, selecting the un-suffixed database.
    #[must_use]
    pub fn base() -> Self {
        Self(String::new())
    }

    /// Builds a tenant id from a raw slug, rejecting characters that are
    /// invalid in a Mongo database name.
    ///
    /// # Errors
    ///
    /// Returns `Err` with a description when `raw` contains a forbidden
    /// character.
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        if let Some(bad) = raw.chars().find(|c| INVALID_TENANT_CHARS.contains(c)) {
            return Err(format!("tenant id contains invalid character '{bad}'"));
        }
        Ok(Self(raw))
    }

    /// Returns the tenant id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when this is the base (no-tenant) identifier.
    #[must_use]
    pub fn is_base(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() { f.write_str("<base>") } else { f.write_str(&self.0) }
    }
}

/// Declares a UUID-backed identifier newtype with the standard derives and
/// accessors shared by every entity id in the model.
macro_rules! uuid_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn new(id: Uuid) -> Self {
                Self(id)
            }

            /// Generates a fresh random (v4) identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub const fn get(self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(ArtifactId, "Identifier of an artifact (image) document.");
uuid_id!(DeploymentId, "Identifier of a deployment document.");
uuid_id!(DeviceDeploymentId, "Identifier of a device-deployment document.");
uuid_id!(DeviceId, "Identifier of a device, supplied by the caller.");

/// Name of a release. Releases are keyed by name within a tenant;
/// this is a plain validated string rather than a surrogate UUID.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseName(String);

impl ReleaseName {
    /// Builds a release name, rejecting the empty string.
    ///
    /// # Errors
    ///
    /// Returns `Err` when `raw` is empty.
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err("release name must not be empty".to_string());
        }
        Ok(Self(raw))
    }

    /// Returns the release name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
