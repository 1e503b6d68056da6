// crates/ota-core/src/model/mod.rs
// ============================================================================
// Module: Domain Model
// Description: The core domain entities — Artifact, Release, Deployment,
// DeviceDeployment, UploadLink, DeploymentLog, Limit.
// Purpose: A single, store-agnostic set of Rust types every other crate
// builds on.
// Dependencies: crate::{depends, identifiers, time}, serde
// ============================================================================

//! ## Overview
//! Every type in this module is a plain, serializable value with no store or
//! transport dependency. Store adapters (e.g. `ota-store-mongo`) own the
//! wire mapping to and from their native document representation.

pub mod artifact;
pub mod deployment;
pub mod device_deployment;
pub mod limit;
pub mod log;
pub mod release;
pub mod upload;

pub use artifact::Artifact;
pub use artifact::UpdateDescriptor;
pub use deployment::Deployment;
pub use deployment::DeploymentKind;
pub use deployment::DeploymentPhase;
pub use deployment::DeploymentStats;
pub use deployment::DeploymentStatus;
pub use deployment::NewDeployment;
pub use device_deployment::DeliveryInstruction;
pub use device_deployment::DeviceDeployment;
pub use device_deployment::DeviceDeploymentStatus;
pub use limit::Limit;
pub use log::DeploymentLog;
pub use log::LogLevel;
pub use log::LogMessage;
pub use release::Release;
pub use upload::UploadIntent;
pub use upload::UploadMethod;
pub use upload::UploadStatus;
