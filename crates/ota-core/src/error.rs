// crates/ota-core/src/error.rs
// ============================================================================
// Module: Core Error Model
// Description: The stable error-kind taxonomy shared by every component.
// Purpose: Let callers (HTTP layer, reapers, background jobs) map a single
// error shape onto retry policy and status codes without inspecting
// component-specific error enums.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Every public operation in this workspace returns `Result<T, Error>`.
//! [`Error`] carries a [`Kind`] from a fixed taxonomy, a stable
//! machine-readable `code`, a human-readable `message`, and — for
//! [`Kind::Conflict`] — the conflicting attribute map the HTTP layer needs to
//! answer with a precise 409.

use std::fmt;

use serde_json::Map;
use serde_json::Value;
use thiserror::Error as ThisError;

/// The fixed error-kind taxonomy.
///
/// # Invariants
/// - Variants are stable; new variants must not be added without updating
///   every external HTTP-status mapping that depends on this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum Kind {
    /// Caller supplied invalid input; retryable once the input is fixed.
    #[error("validation failed")]
    Validation,
    /// The targeted entity does not exist.
    #[error("not found")]
    NotFound,
    /// A uniqueness or capacity constraint was violated.
    #[error("conflict")]
    Conflict,
    /// The requested status transition is not allowed from the current state.
    #[error("invalid state transition")]
    StateInvalid,
    /// A soft quota (tag cardinality, storage bytes, notes length) was
    /// exceeded.
    #[error("limit exceeded")]
    LimitExceeded,
    /// The document store or blob store reported a transient or fatal
    /// failure.
    #[error("external dependency failure")]
    External,
    /// The caller's cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,
}

impl Kind {
    /// Returns true when this kind should be surfaced to callers as a 4xx
    /// (client-correctable) response rather than retried transparently.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        matches!(self, Self::Validation | Self::NotFound | Self::Conflict | Self::StateInvalid | Self::LimitExceeded)
    }
}

/// An error returned by any public operation in this workspace.
///
/// # Invariants
/// - `code` is a stable, lowercase, dot-separated identifier (e.g.
///   `"artifact.depends_conflict"`), never translated, never containing
///   request-specific data.
/// - `conflict`, when set, contains only the keys that actually collided.
#[derive(Debug, Clone)]
pub struct Error {
    kind: Kind,
    code: &'static str,
    message: String,
    conflict: Option<Map<String, Value>>,
}

impl Error {
    /// Builds a new error of the given kind with a stable code and message.
    #[must_use]
    pub fn new(kind: Kind, code: &'static str, message: impl Into<String>) -> Self {
        Self { kind, code, message: message.into(), conflict: None }
    }

    /// Attaches a conflicting-attribute map, used by registry uniqueness
    /// conflicts to report which fields collided.
    #[must_use]
    pub fn with_conflict(mut self, conflict: Map<String, Value>) -> Self {
        self.conflict = Some(conflict);
        self
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Returns the conflicting-attribute map, if any.
    #[must_use]
    pub const fn conflict(&self) -> Option<&Map<String, Value>> {
        self.conflict.as_ref()
    }

    /// Shorthand for [`Kind::Validation`].
    #[must_use]
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Kind::Validation, code, message)
    }

    /// Shorthand for [`Kind::NotFound`].
    #[must_use]
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Kind::NotFound, code, message)
    }

    /// Shorthand for [`Kind::Conflict`].
    #[must_use]
    pub fn conflict_err(code: &'static str, message: impl Into<String>, conflict: Map<String, Value>) -> Self {
        Self::new(Kind::Conflict, code, message).with_conflict(conflict)
    }

    /// Shorthand for [`Kind::StateInvalid`].
    #[must_use]
    pub fn state_invalid(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Kind::StateInvalid, code, message)
    }

    /// Shorthand for [`Kind::LimitExceeded`].
    #[must_use]
    pub fn limit_exceeded(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Kind::LimitExceeded, code, message)
    }

    /// Shorthand for [`Kind::External`].
    #[must_use]
    pub fn external(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Kind::External, code, message)
    }

    /// The single [`Kind::Cancelled`] error value.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::new(Kind::Cancelled, "cancelled", "operation cancelled")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.kind, self.code, self.message)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::StateInvalid => "state_invalid",
            Self::LimitExceeded => "limit_exceeded",
            Self::External => "external",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;
