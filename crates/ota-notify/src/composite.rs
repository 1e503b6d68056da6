// crates/ota-notify/src/composite.rs
// ============================================================================
// Module: Composite Notifier
// Description: Fans a single event out to every configured destination,
// logging and swallowing per-destination failures.
// Purpose: Give the engine one `Arc<dyn Notifier>` to hold regardless of
// how many downstream destinations are configured, matching
// `ota_core::traits::Notifier`'s documented contract that failures here
// must never propagate to the caller that triggered the notification.
// Dependencies: ota-core
// ============================================================================

use async_trait::async_trait;

use ota_core::cancel::CancellationToken;
use ota_core::error::Result;
use ota_core::traits::NotificationEvent;
use ota_core::traits::Notifier;

/// Delivers to every destination independently; one destination failing
/// never stops delivery to the others and never fails the caller.
pub struct CompositeNotifier {
    destinations: Vec<Box<dyn Notifier>>,
}

impl CompositeNotifier {
    /// Builds a composite over `destinations`.
    #[must_use]
    pub fn new(destinations: Vec<Box<dyn Notifier>>) -> Self {
        Self { destinations }
    }
}

#[async_trait]
impl Notifier for CompositeNotifier {
    async fn notify(&self, event: NotificationEvent, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        for destination in &self.destinations {
            if let Err(error) = destination.notify(event.clone(), cancel).await {
                tracing::warn!(error = %error, event = event.event, "notification delivery failed");
            }
        }
        Ok(())
    }
}
