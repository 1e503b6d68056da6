// crates/ota-blobstore/src/lib.rs
// ============================================================================
// Crate: ota-blobstore
// Description: S3-backed implementation of `ota_core::BlobGateway`.
// Purpose: Presigned upload/download URLs, direct artifact uploads, and
// object metadata lookups for the upload-intent and artifact-serving
// flows.
// Dependencies: aws-config, aws-sdk-s3, ota-core, ota-config
// ============================================================================

//! # ota-blobstore
//!
//! A config struct and a `connect` constructor, the same shape
//! `ota-store-mongo` uses for the document store, wired to `aws-sdk-s3`
//! instead of `mongodb`.

pub mod error;

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_s3::Client;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use async_trait::async_trait;

use ota_config::BlobStoreConfig;
use ota_core::cancel::CancellationToken;
use ota_core::error::Result;
use ota_core::time::Timestamp;
use ota_core::traits::BlobGateway;
use ota_core::traits::PresignedRequest;

/// S3-backed `BlobGateway`.
///
/// # Invariants
/// - `client` is safe for concurrent use across tenants; this crate does
///   not itself scope objects by tenant — callers derive tenant-qualified
///   object keys (see `ota-uploads::request::object_key`).
pub struct S3BlobGateway {
    client: Client,
    bucket: String,
    external_uri: Option<String>,
}

impl S3BlobGateway {
    /// Connects to the S3-compatible endpoint described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ota_core::error::Kind::External`] if credential or
    /// endpoint resolution fails.
    pub async fn connect(config: &BlobStoreConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
        if !config.endpoint.is_empty() {
            loader = loader.endpoint_url(config.endpoint.clone());
        }
        let shared_config = loader.load().await;
        let s3_builder = aws_sdk_s3::config::Builder::from(&shared_config).force_path_style(true);
        let client = Client::from_conf(s3_builder.build());
        tracing::info!(bucket = %config.bucket, region = %config.region, "connected to blob store");
        Ok(Self { client, bucket: config.bucket.clone(), external_uri: config.external_uri.clone() })
    }

    /// Rewrites a presigned URL's scheme and host to `external_uri` when
    /// one is configured, leaving the path, query, and signature
    /// untouched. Lets a caller behind a private S3-compatible endpoint
    /// hand out URLs its clients can actually reach.
    fn externalize(&self, url: String) -> String {
        let Some(external) = self.external_uri.as_deref() else {
            return url;
        };
        let Some(path_and_query) = url.splitn(4, '/').nth(3) else {
            return url;
        };
        format!("{}/{path_and_query}", external.trim_end_matches('/'))
    }
}

#[async_trait]
impl BlobGateway for S3BlobGateway {
    async fn put_request(&self, object_key: &str, ttl: std::time::Duration, cancel: &CancellationToken) -> Result<PresignedRequest> {
        cancel.check()?;
        let presigning = PresigningConfig::expires_in(ttl).map_err(|err| error::map_presign_error("blob.put_request.ttl", "building presigning config", err))?;
        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(object_key)
            .presigned(presigning)
            .await
            .map_err(|err| error::map_put_object_error("blob.put_request", "presigning put", err))?;
        Ok(PresignedRequest { method: "PUT", url: self.externalize(presigned.uri().to_string()) })
    }

    async fn get_request(&self, object_key: &str, ttl: std::time::Duration, cancel: &CancellationToken) -> Result<PresignedRequest> {
        cancel.check()?;
        let presigning = PresigningConfig::expires_in(ttl).map_err(|err| error::map_presign_error("blob.get_request.ttl", "building presigning config", err))?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(object_key)
            .presigned(presigning)
            .await
            .map_err(|err| error::map_get_object_error("blob.get_request", "presigning get", err))?;
        Ok(PresignedRequest { method: "GET", url: self.externalize(presigned.uri().to_string()) })
    }

    async fn upload_artifact(&self, object_key: &str, body: Vec<u8>, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(object_key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| error::map_put_object_error("blob.upload_artifact", "uploading object", err))?;
        Ok(())
    }

    async fn delete_object(&self, object_key: &str, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(object_key)
            .send()
            .await
            .map_err(|err| error::map_delete_object_error("blob.delete_object", "deleting object", err))?;
        Ok(())
    }

    async fn stat_object(&self, object_key: &str, cancel: &CancellationToken) -> Result<u64> {
        cancel.check()?;
        let response = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(object_key)
            .send()
            .await
            .map_err(|err| error::map_head_object_error("blob.stat_object", "heading object", err))?;
        let length = response.content_length().unwrap_or(0);
        Ok(u64::try_from(length).unwrap_or(0))
    }

    async fn last_modified(&self, object_key: &str, cancel: &CancellationToken) -> Result<Timestamp> {
        cancel.check()?;
        let response = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(object_key)
            .send()
            .await
            .map_err(|err| error::map_head_object_error("blob.last_modified", "heading object", err))?;
        let modified = response.last_modified().ok_or_else(|| ota_core::error::Error::external("blob.last_modified.missing", "head_object response carried no Last-Modified header"))?;
        let millis = modified.secs().saturating_mul(1000).saturating_add(i64::from(modified.subsec_nanos() / 1_000_000));
        Ok(Timestamp::from_unix_millis(millis))
    }
}
