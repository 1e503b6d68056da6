// crates/ota-notify/src/config.rs
// ============================================================================
// Module: Notifier Configuration
// Description: Connection settings for an outbound HTTP notification
// destination.
// Purpose: Keep the destination URL and request timeout out of
// `ota_core::traits::Notifier`, the same split `ota-store-mongo::config`
// and `ota-blobstore` draw between "what the trait needs" and "how to
// reach a concrete backend".
// Dependencies: none
// ============================================================================

use std::time::Duration;

/// Configuration for [`crate::HttpNotifier::connect`].
#[derive(Debug, Clone)]
pub struct HttpNotifierConfig {
    /// Destination URL that receives a POST per notification.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpNotifierConfig {
    /// Builds a config pointed at `endpoint` with a 10 second timeout.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), timeout: Duration::from_secs(10) }
    }
}
