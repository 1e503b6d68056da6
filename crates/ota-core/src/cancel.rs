// crates/ota-core/src/cancel.rs
// ============================================================================
// Module: Cancellation Token
// Description: A cheap, clonable cancellation signal propagated to every I/O
// boundary.
// Purpose: Let a caller abort an in-flight store/blob-store/webhook call at
// the next suspension point.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! Every public async operation in this workspace takes a
//! [`CancellationToken`] as its last parameter. A token that is already
//! cancelled must surface [`crate::error::Kind::Cancelled`] before any I/O is
//! attempted; a token cancelled mid-flight must abort at the next
//! suspension point, distinct from an [`crate::error::Kind::External`]
//! failure.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use tokio::sync::Notify;

use crate::error::Error;

/// A cancellation signal shared between a caller and the operation it invoked.
///
/// # Invariants
/// - Cancellation is one-way: once fired, a token never un-fires.
/// - Cloning shares the same underlying signal.
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

/// Shared cancellation state.
struct Inner {
    /// Whether the token has fired.
    fired: AtomicBool,
    /// Wakes tasks waiting in [`CancellationToken::cancelled`].
    notify: Notify,
}

impl Default for Inner {
    fn default() -> Self {
        Self { fired: AtomicBool::new(false), notify: Notify::new() }
    }
}

impl CancellationToken {
    /// Creates a fresh, not-yet-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the token, waking any waiters.
    pub fn cancel(&self) {
        self.inner.fired.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Returns true if the token has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.fired.load(Ordering::SeqCst)
    }

    /// Resolves once the token fires. Resolves immediately if already fired.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.inner.notify.notified().await;
    }

    /// Returns [`Error::cancelled`] if the token has fired, else `Ok(())`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::cancelled`] when the token has fired.
    pub fn check(&self) -> Result<(), Error> {
        if self.is_cancelled() { Err(Error::cancelled()) } else { Ok(()) }
    }
}
