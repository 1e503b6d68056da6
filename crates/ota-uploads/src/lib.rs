// crates/ota-uploads/src/lib.rs
// ============================================================================
// Crate: ota-uploads
// Description: Upload-Intent Coordinator — issues presigned upload
// destinations, promotes a completed upload into a registered artifact, and
// reaps intents whose caller never completed them.
// Purpose: Let a caller push artifact bytes straight to blob storage instead
// of through the control plane, while still enforcing the same
// `(name, depends_idx)` uniqueness rule an inline artifact submission would.
// Dependencies: ota-core, time, tracing
// ============================================================================

//! # ota-uploads
//!
//! [`UploadCoordinator`] wraps an `Arc<dyn ota_core::Store>` and an
//! `Arc<dyn ota_core::BlobGateway>`. [`request`] reserves an artifact id and
//! a destination; [`complete`] trusts nothing about the uploaded bytes it
//! did not itself observe via [`ota_core::BlobGateway::stat_object`];
//! [`reaper`] sweeps intents the caller abandoned.
//!
//! The coordinator preserves the upload intent's `artifact_id` as the final
//! artifact's id, so it inserts artifacts directly against the store rather
//! than through `ota-registry`'s `insert_artifact` (which always mints a
//! fresh id). The uniqueness check in [`complete`] is the same Cartesian
//! `depends_idx` comparison `ota-registry` performs, duplicated here for
//! that reason.

pub mod abort;
pub mod complete;
pub mod reaper;
pub mod request;

#[cfg(test)]
mod integration_flow;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use ota_core::BlobGateway;
use ota_core::Store;

/// Entry point for every upload-intent operation.
pub struct UploadCoordinator {
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobGateway>,
}

impl UploadCoordinator {
    /// Wraps `store` and `blobs` in a new coordinator.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, blobs: Arc<dyn BlobGateway>) -> Self {
        Self { store, blobs }
    }
}
