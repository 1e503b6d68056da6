// crates/ota-notify/src/http.rs
// ============================================================================
// Module: HTTP Notifier
// Description: Delivers a `NotificationEvent` to a single webhook
// destination via an HTTP POST.
// Purpose: Implement `ota_core::traits::Notifier` for the "workflow
// notifications" / "reporting-service forwarding" external collaborators,
// modeled on the teacher's `decision-gate-broker` sink pattern adapted
// from a synchronous `Sink` to an async `Notifier`.
// Dependencies: reqwest, ota-core
// ============================================================================

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use ota_core::cancel::CancellationToken;
use ota_core::error::Error;
use ota_core::error::Result;
use ota_core::traits::NotificationEvent;
use ota_core::traits::Notifier;

use crate::config::HttpNotifierConfig;

/// Delivers events to a single HTTP endpoint as a JSON POST.
///
/// # Invariants
/// - `client` follows no redirects implicitly disallowed by its builder
///   timeout; callers needing stricter host policy should wrap this type
///   rather than modify it.
pub struct HttpNotifier {
    client: Client,
    endpoint: String,
}

impl HttpNotifier {
    /// Builds a notifier targeting `config.endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`ota_core::error::Kind::External`] if the HTTP client
    /// cannot be constructed.
    pub fn connect(config: &HttpNotifierConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| Error::external("notify.http.connect", format!("building http client: {err}")))?;
        Ok(Self { client, endpoint: config.endpoint.clone() })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, event: NotificationEvent, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header("X-Event-Name", event.event)
            .body(event.payload)
            .send()
            .await
            .map_err(|err| Error::external("notify.http.send", format!("delivering {}: {err}", event.event)))?;
        if !response.status().is_success() {
            return Err(Error::external("notify.http.status", format!("delivering {}: http status {}", event.event, response.status())));
        }
        Ok(())
    }
}
