// crates/ota-store-mongo/src/error.rs
// ============================================================================
// Module: Error Mapping
// Description: Maps `mongodb`/`bson` failures onto the shared
// `ota_core::Error` taxonomy.
// Purpose: Keep every caller-facing error shape identical regardless of
// which backend crate produced it, mapping `SqliteStoreError`-equivalent
// driver errors onto `StoreError` at the store boundary.
// Dependencies: mongodb, ota_core::error
// ============================================================================

use mongodb::error::ErrorKind;
use mongodb::error::Error as MongoError;
use mongodb::error::WriteFailure;

use ota_core::error::Error;
use ota_core::error::Kind;

/// Maps a raw driver error onto [`Error`], classifying duplicate-key write
/// failures as [`Kind::Conflict`] and everything else as [`Kind::External`].
pub fn map_mongo_error(code: &'static str, context: &str, err: MongoError) -> Error {
    if is_duplicate_key(&err) {
        return Error::new(Kind::Conflict, code, format!("{context}: duplicate key"));
    }
    Error::external(code, format!("{context}: {err}"))
}

fn is_duplicate_key(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        ErrorKind::BulkWrite(bulk) => bulk.write_errors.iter().any(|error| error.code == 11000),
        _ => false,
    }
}

/// Returns true when `err` represents a Mongo "namespace not found" or
/// "index not found" failure, which idempotent migration drops must
/// suppress.
#[must_use]
pub fn is_missing_namespace_or_index(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Command(command_error) => {
            matches!(command_error.code, 26 | 27) // NamespaceNotFound, IndexNotFound
        }
        _ => false,
    }
}

/// Maps a `bson` (de)serialization failure onto [`Error`].
pub fn map_bson_error(code: &'static str, context: &str, err: bson::de::Error) -> Error {
    Error::external(code, format!("{context}: {err}"))
}

/// Maps a `bson` serialization failure onto [`Error`].
pub fn map_bson_ser_error(code: &'static str, context: &str, err: bson::ser::Error) -> Error {
    Error::external(code, format!("{context}: {err}"))
}
