// crates/ota-core/src/model/log.rs
// ============================================================================
// Module: DeploymentLog
// Description: A device-submitted execution log for one device-deployment.
// Purpose: Keep the log payload itself store-agnostic and independent of
// the ambient tracing-based service logs (see `ota-config`'s logging
// section) — this is device telemetry, not control-plane observability.
// Dependencies: crate::{identifiers, time}, serde
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::DeviceDeploymentId;
use crate::time::Timestamp;

/// The severity a device attached to one log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Informational progress message.
    Info,
    /// A recoverable problem the device reported.
    Warning,
    /// An unrecoverable problem; usually precedes a `failure` status.
    Error,
}

/// One line of a device's submitted execution log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    /// Time the device recorded this line.
    pub timestamp: Timestamp,
    /// Severity of this line.
    pub level: LogLevel,
    /// The message text, as submitted by the device.
    pub message: String,
}

/// The execution log a device submitted for one device-deployment (spec
/// §3, "DeploymentLog").
///
/// # Invariants
/// - At most one log is stored per device-deployment; a second submission
///   replaces the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentLog {
    /// The device-deployment this log was submitted for.
    pub device_deployment_id: DeviceDeploymentId,
    /// Time the log was received by the control plane.
    pub received: Timestamp,
    /// Ordered log lines, oldest first.
    pub messages: Vec<LogMessage>,
}
