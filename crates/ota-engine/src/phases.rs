// crates/ota-engine/src/phases.rs
// ============================================================================
// Module: Phase Quota Gating
// Description: Decides whether a deployment has room, under its current
// phase, to accept one more device-deployment.
// Purpose: Keep the rounding and "last phase absorbs the remainder" rule in
// one pure, testable place rather than inlined in the assignment flow.
// Dependencies: ota-core
// ============================================================================

//! ## Overview
//! A phase's quota is `floor(max_devices * batch_size / 100)`, computed with
//! integer arithmetic so no phase ever over-admits by a rounding error; the
//! last phase always gets whatever remains, regardless of its own
//! `batch_size`. A deployment with no `max_devices` or no phases has no
//! quota to enforce — every admission goes through [`ota_core::traits::Store::reserve_deployment_capacity`]
//! unconditionally.

use ota_core::model::Deployment;
use ota_core::model::DeploymentPhase;
use ota_core::time::Timestamp;

/// Returns the cumulative device quota after each phase, in phase order.
#[must_use]
pub fn cumulative_quotas(phases: &[DeploymentPhase], max_devices: u64) -> Vec<u64> {
    let mut quotas = Vec::with_capacity(phases.len());
    let mut assigned = 0u64;
    let last_index = phases.len().saturating_sub(1);
    for (index, phase) in phases.iter().enumerate() {
        let quota = if index == last_index {
            max_devices.saturating_sub(assigned)
        } else {
            match phase.batch_size {
                Some(percent) => (max_devices * u64::from(percent)) / 100,
                None => max_devices.saturating_sub(assigned),
            }
        };
        assigned += quota;
        quotas.push(assigned);
    }
    quotas
}

/// Returns true when `deployment` has room, right now, to accept one more
/// device-deployment under its phase schedule.
///
/// A deployment with no `max_devices` or no declared phases is always
/// eligible; phase gating only applies once both are present.
#[must_use]
pub fn is_admission_eligible(deployment: &Deployment, now: Timestamp) -> bool {
    let Some(max_devices) = deployment.max_devices else {
        return true;
    };
    if deployment.phases.is_empty() {
        return true;
    }
    let quotas = cumulative_quotas(&deployment.phases, max_devices);
    deployment.phases.iter().zip(quotas.iter()).any(|(phase, cumulative_quota)| {
        let started = phase.start_ts.is_none_or(|start| !now.is_before(start));
        started && deployment.device_count < *cumulative_quota
    })
}
