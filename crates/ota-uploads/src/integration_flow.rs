// crates/ota-uploads/src/integration_flow.rs
// ============================================================================
// Module: Upload-To-Assignment Flow
// Description: Cross-crate scenario coverage, test-only: an uploaded
// artifact becomes resolvable to a matching device as soon as its upload
// completes.
// Purpose: Verify the upload-intent lifecycle this crate owns actually
// feeds the resolution algorithm `ota-registry` owns, end to end, rather
// than testing each crate's pieces only in isolation.
// Dependencies: ota-core, ota-registry (dev-only)
// ============================================================================

#![cfg(test)]
#![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect for clear failure messages")]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use ota_core::CancellationToken;
use ota_core::depends::DEVICE_TYPE_KEY;
use ota_core::depends::DependsValue;
use ota_core::identifiers::TenantId;
use ota_core::model::Release;
use ota_core::model::UploadMethod;
use ota_core::time::Timestamp;
use ota_registry::resolver::Resolution;
use ota_registry::resolver::resolve_for_device;

use crate::UploadCoordinator;
use crate::complete::UploadCompletion;
use crate::request::UploadRequest;
use crate::test_support::InMemoryBlobGateway;
use crate::test_support::InMemoryStore;

#[tokio::test]
async fn an_artifact_resolves_for_a_matching_device_as_soon_as_its_upload_completes() {
    let store = Arc::new(InMemoryStore::default());
    let blobs = Arc::new(InMemoryBlobGateway::default());
    let coordinator = UploadCoordinator::new(store.clone(), blobs.clone());
    let tenant = TenantId::base();
    let cancel = CancellationToken::new();

    let request = UploadRequest { release_name: "App1".to_string(), method: UploadMethod::SinglePut, ttl: Duration::from_secs(60) };
    let (intent, presigned) = coordinator.request_upload(&tenant, request, Timestamp::from_unix_millis(0), &cancel).await.expect("request succeeds");
    assert_eq!(presigned.method, "PUT");

    blobs.seed_object(&intent.object_key, 4_096);

    let mut depends = BTreeMap::new();
    depends.insert(DEVICE_TYPE_KEY.to_string(), DependsValue::Scalar("raspberrypi4".to_string()));
    let completion = UploadCompletion {
        description: Some("first build".to_string()),
        device_types_compatible: vec!["raspberrypi4".to_string()],
        depends,
        provides: BTreeMap::new(),
        updates: Vec::new(),
    };
    let artifact = coordinator.complete_upload(&tenant, intent.artifact_id, completion, Timestamp::from_unix_millis(1_000), &cancel).await.expect("completion succeeds");
    assert_eq!(artifact.id, intent.artifact_id);
    assert_eq!(artifact.size, 4_096);

    let release = Release {
        name: artifact.name.clone(),
        modified: artifact.modified,
        artifacts: vec![artifact.clone()],
        artifacts_count: 1,
        tags: Default::default(),
        notes: String::new(),
        update_types: Default::default(),
    };
    let mut device = BTreeMap::new();
    device.insert(DEVICE_TYPE_KEY.to_string(), "raspberrypi4".to_string());

    let resolution = resolve_for_device(&release, &device, &BTreeMap::new(), false);
    assert_eq!(resolution, Resolution::Matched(artifact));
}
