// crates/ota-notify/src/lib.rs
// ============================================================================
// Crate: ota-notify
// Description: Best-effort outbound notification adapters for the
// "workflow notifications" / "reporting-service forwarding" external
// collaborators.
// Purpose: Implement `ota_core::traits::Notifier` against a concrete HTTP
// destination, plus a fan-out wrapper for multiple destinations.
// Dependencies: reqwest, ota-core
// ============================================================================

//! # ota-notify
//!
//! [`HttpNotifier`] delivers one event to one webhook as a JSON POST.
//! [`CompositeNotifier`] wraps several notifiers (including several
//! [`HttpNotifier`]s) behind a single handle, logging and swallowing
//! per-destination failures so the caller that triggered the notification
//! never observes them — delivery here is never on the critical path.

pub mod composite;
pub mod config;
pub mod http;

pub use composite::CompositeNotifier;
pub use config::HttpNotifierConfig;
pub use http::HttpNotifier;
