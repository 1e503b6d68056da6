// crates/ota-core/src/time.rs
// ============================================================================
// Module: Core Time Model
// Description: Millisecond-resolution UTC timestamp used across every
// persisted document.
// Purpose: Give every entity a single, serializable, millisecond-resolution
// instant type independent of the store's native time representation.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! [`Timestamp`] wraps [`time::OffsetDateTime`] truncated to millisecond
//! resolution: every persisted instant is UTC with millisecond resolution.
//! Operations that need "now" take it as an explicit parameter rather than
//! reading the wall clock internally, so the engine and resolver stay
//! deterministic and unit-testable without a live clock.

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use time::OffsetDateTime;

/// A UTC instant truncated to millisecond resolution.
///
/// # Invariants
/// - Sub-millisecond precision is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Builds a timestamp from an [`OffsetDateTime`], truncating to
    /// millisecond resolution.
    #[must_use]
    pub fn from_offset(value: OffsetDateTime) -> Self {
        let millis = value.unix_timestamp_nanos() / 1_000_000;
        Self(
            OffsetDateTime::from_unix_timestamp_nanos(millis * 1_000_000)
                .unwrap_or(OffsetDateTime::UNIX_EPOCH),
        )
    }

    /// Builds a timestamp from unix milliseconds.
    #[must_use]
    pub fn from_unix_millis(millis: i64) -> Self {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
            .map_or(Self(OffsetDateTime::UNIX_EPOCH), Self)
    }

    /// Returns the unix-epoch millisecond value.
    #[must_use]
    pub fn unix_millis(self) -> i64 {
        (self.0.unix_timestamp_nanos() / 1_000_000) as i64
    }

    /// Returns the underlying [`OffsetDateTime`].
    #[must_use]
    pub const fn as_offset(self) -> OffsetDateTime {
        self.0
    }

    /// Returns `self + duration`.
    #[must_use]
    pub fn add(self, duration: time::Duration) -> Self {
        Self::from_offset(self.0 + duration)
    }

    /// Returns true when `self` is strictly before `other`.
    #[must_use]
    pub fn is_before(self, other: Self) -> bool {
        self.0 < other.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unix_millis())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.unix_millis())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let millis = i64::deserialize(deserializer)?;
        Ok(Self::from_unix_millis(millis))
    }
}
