// crates/ota-core/src/lib.rs
// ============================================================================
// Crate: ota-core
// Description: Store-agnostic domain types, identifiers, error taxonomy,
// cancellation primitives, and the trait surfaces every backend crate in
// this workspace implements.
// Purpose: Give `ota-registry`, `ota-engine`, `ota-uploads`, `ota-notify`,
// `ota-store-mongo`, and `ota-blobstore` a single shared vocabulary.
// ============================================================================

//! # ota-core
//!
//! This crate has no dependency on any concrete backend (no `mongodb`, no
//! `aws-sdk-s3`, no HTTP client). Everything here is a plain value type, a
//! pure function, or a trait; backend crates depend on this crate, never the
//! other way around.

pub mod cancel;
pub mod depends;
pub mod error;
pub mod identifiers;
pub mod model;
pub mod store_types;
pub mod time;
pub mod traits;

pub use cancel::CancellationToken;
pub use error::Error;
pub use error::Kind;
pub use error::Result;
pub use time::Timestamp;
pub use traits::BlobGateway;
pub use traits::Notifier;
pub use traits::Store;
