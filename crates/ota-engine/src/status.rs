// crates/ota-engine/src/status.rs
// ============================================================================
// Module: Status Reporting & Completion Detection
// Description: Applies a device-reported status transition, keeps
// deployment-level stats in lock-step, and finishes a deployment once every
// device-deployment has reached a terminal status.
// Purpose: Implement deployment engine rules 1-3 (status-transition
// validation plus stats adjustment, terminal transitions stamp `finished`,
// and deployment-level completion) in one place.
// Dependencies: ota-core
// ============================================================================

//! ## Overview
//! [`Engine::report_status`] is the single entry point a device (or the HTTP
//! layer acting on its behalf) calls to move a device-deployment forward.
//! The store re-validates `from == current status` atomically, so a stale
//! read here only costs a retry, never a corrupted transition. Reaching a
//! terminal status always stamps `finished` and always triggers
//! [`Engine::maybe_finish_deployment`]; reaching [`DeviceDeploymentStatus::Success`]
//! or [`DeviceDeploymentStatus::Failure`] additionally fires a best-effort
//! notification when a [`ota_core::traits::Notifier`] is configured.

use ota_core::CancellationToken;
use ota_core::Result;
use ota_core::identifiers::DeviceDeploymentId;
use ota_core::identifiers::TenantId;
use ota_core::model::DeviceDeployment;
use ota_core::model::DeviceDeploymentStatus;
use ota_core::model::LogMessage;
use ota_core::model::DeploymentLog;
use ota_core::time::Timestamp;
use ota_core::traits::NotificationEvent;

use crate::Engine;

impl Engine {
    /// Applies a device-reported transition to `to`, adjusting deployment
    /// stats and finishing the deployment if this was its last active
    /// device-deployment.
    ///
    /// # Errors
    ///
    /// Returns [`ota_core::Kind::NotFound`] if the device-deployment does not
    /// exist, and [`ota_core::Kind::StateInvalid`] if the transition is not
    /// allowed or the persisted status no longer matches what the caller
    /// last observed.
    pub async fn report_status(
        &self,
        tenant: &TenantId,
        id: DeviceDeploymentId,
        to: DeviceDeploymentStatus,
        sub_state: Option<String>,
        now: Timestamp,
        cancel: &CancellationToken,
    ) -> Result<DeviceDeployment> {
        cancel.check()?;
        let current = self.store.get_device_deployment(tenant, id, cancel).await?.ok_or_else(|| ota_core::Error::not_found("device_deployment.report_status.not_found", "device-deployment not found"))?;
        let from = current.status;
        let finished = to.is_terminal().then_some(now);

        let updated = self.store.update_device_deployment_status(tenant, id, from, to, sub_state, finished, cancel).await?;
        self.store.adjust_deployment_stats(tenant, updated.deployment_id, Some(from), Some(to), 0, cancel).await?;

        if to.is_terminal() {
            self.maybe_finish_deployment(tenant, updated.deployment_id, now, cancel).await?;
        }
        if matches!(to, DeviceDeploymentStatus::Success | DeviceDeploymentStatus::Failure) {
            self.notify_status(&updated, cancel).await;
        }
        tracing::info!(device_deployment_id = %updated.id, from = from.as_str(), to = to.as_str(), "device-deployment status transition applied");
        Ok(updated)
    }

    /// Finishes `deployment_id` once its reconciled stats show every
    /// admitted device has reached a terminal status (spec §4.5, rule 3).
    pub(crate) async fn maybe_finish_deployment(&self, tenant: &TenantId, deployment_id: ota_core::identifiers::DeploymentId, now: Timestamp, cancel: &CancellationToken) -> Result<()> {
        let Some(deployment) = self.store.get_deployment(tenant, deployment_id, cancel).await? else {
            return Ok(());
        };
        if deployment.is_complete() {
            self.store.finish_deployment(tenant, deployment_id, now, cancel).await?;
            tracing::info!(deployment_id = %deployment_id, "deployment finished");
        }
        Ok(())
    }

    /// Records a device-submitted execution log for `id`.
    pub async fn append_log(&self, tenant: &TenantId, id: DeviceDeploymentId, received: Timestamp, messages: Vec<LogMessage>, cancel: &CancellationToken) -> Result<DeploymentLog> {
        self.store.append_device_deployment_log(tenant, id, received, messages, cancel).await
    }

    async fn notify_status(&self, device_deployment: &DeviceDeployment, cancel: &CancellationToken) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        let payload = serde_json::json!({
            "device_deployment_id": device_deployment.id.to_string(),
            "deployment_id": device_deployment.deployment_id.to_string(),
            "status": device_deployment.status.as_str(),
        });
        let event = NotificationEvent { event: event_name(device_deployment.status), payload: payload.to_string() };
        if let Err(error) = notifier.notify(event, cancel).await {
            tracing::warn!(error = %error, device_deployment_id = %device_deployment.id, "status notification failed");
        }
    }
}

const fn event_name(status: DeviceDeploymentStatus) -> &'static str {
    match status {
        DeviceDeploymentStatus::Success => "device_deployment.success",
        _ => "device_deployment.failure",
    }
}
