// crates/ota-blobstore/src/error.rs
// ============================================================================
// Module: Error Mapping
// Description: Maps `aws-sdk-s3` failures onto the shared `ota_core::Error`
// taxonomy.
// Purpose: Keep every caller-facing error shape identical regardless of
// which backend crate produced it, the same convention `ota-store-mongo`
// follows for the document store.
// Dependencies: aws-sdk-s3, ota_core::error
// ============================================================================

use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::delete_object::DeleteObjectError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::operation::put_object::PutObjectError;

use ota_core::error::Error;
use ota_core::error::Kind;

/// Maps a `head_object` failure onto [`Error`], classifying a missing
/// object as [`Kind::NotFound`] and everything else as [`Kind::External`].
pub fn map_head_object_error(code: &'static str, context: &str, err: SdkError<HeadObjectError>) -> Error {
    if matches!(err.as_service_error(), Some(HeadObjectError::NotFound(_))) {
        return Error::not_found(code, format!("{context}: object not found"));
    }
    Error::external(code, format!("{context}: {err}"))
}

/// Maps a `get_object` failure onto [`Error`].
pub fn map_get_object_error(code: &'static str, context: &str, err: SdkError<GetObjectError>) -> Error {
    if matches!(err.as_service_error(), Some(GetObjectError::NoSuchKey(_))) {
        return Error::not_found(code, format!("{context}: object not found"));
    }
    Error::external(code, format!("{context}: {err}"))
}

/// Maps a `put_object` failure onto [`Error`].
pub fn map_put_object_error(code: &'static str, context: &str, err: SdkError<PutObjectError>) -> Error {
    Error::external(code, format!("{context}: {err}"))
}

/// Maps a `delete_object` failure onto [`Error`]. S3's `DeleteObject` is
/// idempotent and does not itself 404 on a missing key, so every failure
/// here is backend trouble rather than a missing-object condition.
pub fn map_delete_object_error(code: &'static str, context: &str, err: SdkError<DeleteObjectError>) -> Error {
    Error::external(code, format!("{context}: {err}"))
}

/// Maps a presigning-config construction failure (an out-of-range TTL)
/// onto [`Error`].
pub fn map_presign_error(code: &'static str, context: &str, err: impl std::fmt::Display) -> Error {
    Error::validation(code, format!("{context}: {err}"))
}
