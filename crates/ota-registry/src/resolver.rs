// crates/ota-registry/src/resolver.rs
// ============================================================================
// Module: Dependency Resolver
// Description: Matches a device description against a release's member
// artifacts and resolves the single best candidate (spec §4.4).
// Purpose: Keep the matching/tie-break algorithm pure and store-free so it
// can be unit tested without a document-store round-trip.
// Dependencies: ota-core
// ============================================================================

//! ## Overview
//! [`resolve`] returns the single best-matching artifact, or `None` when no
//! artifact matches. A candidate matches when, for every `depends` key the
//! artifact declares, the device's description satisfies it (scalar
//! equality or sequence membership); an artifact's own omission of a key
//! never blocks a match. Ties break by (1) the greatest number of matched
//! non-`device_type` keys, (2) latest `modified`, then (3) `id` ordering, so
//! the result is always a single deterministic artifact.
//!
//! [`resolve_for_device`] layers the "already installed" / "force
//! installation" rule on top: a force-installed deployment still reports
//! `no_artifact` when nothing matches, it only suppresses the
//! already-installed short-circuit.

use std::collections::BTreeMap;

use ota_core::depends::DEVICE_TYPE_KEY;
use ota_core::model::Artifact;
use ota_core::model::Release;
use ota_core::store_types::DeviceDescription;

/// The outcome of resolving a release against one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A fresh artifact was matched and should be delivered.
    Matched(Artifact),
    /// An artifact matched, but the device already reports every attribute
    /// it `provides`.
    AlreadyInstalled(Artifact),
    /// No artifact in the release matches the device's description.
    NoArtifact,
}

fn matches(artifact: &Artifact, device: &DeviceDescription) -> bool {
    artifact.depends.iter().all(|(key, value)| device.get(key).is_some_and(|candidate| value.accepts(candidate)))
}

fn specificity(artifact: &Artifact) -> usize {
    artifact.depends.keys().filter(|key| key.as_str() != DEVICE_TYPE_KEY).count()
}

/// Returns the single best-matching artifact in `release` for `device`, or
/// `None` if no artifact matches.
#[must_use]
pub fn resolve<'a>(release: &'a Release, device: &DeviceDescription) -> Option<&'a Artifact> {
    release
        .artifacts
        .iter()
        .filter(|artifact| matches(artifact, device))
        .max_by(|a, b| (specificity(a), a.modified, a.id.get()).cmp(&(specificity(b), b.modified, b.id.get())))
}

/// Returns true when the device already reports every attribute `artifact`
/// would provide, meaning reinstalling it would be a no-op.
#[must_use]
pub fn already_installed(artifact: &Artifact, device_provides: &BTreeMap<String, String>) -> bool {
    !artifact.provides.is_empty() && artifact.provides.iter().all(|(key, value)| device_provides.get(key) == Some(value))
}

/// Resolves `release` against `device`, applying the already-installed /
/// force-installation rule (spec §4.4).
#[must_use]
pub fn resolve_for_device(release: &Release, device: &DeviceDescription, device_provides: &BTreeMap<String, String>, force_installation: bool) -> Resolution {
    match resolve(release, device) {
        None => Resolution::NoArtifact,
        Some(artifact) if !force_installation && already_installed(artifact, device_provides) => Resolution::AlreadyInstalled(artifact.clone()),
        Some(artifact) => Resolution::Matched(artifact.clone()),
    }
}
