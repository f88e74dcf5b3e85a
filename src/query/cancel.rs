//! Cancellation handles for in-flight search requests.
//!
//! At most one search request is in flight at a time; issuing a new one
//! first cancels the previous handle with a well-known reason so the old
//! completion can be told apart from a genuine failure. The handle wraps a
//! [`CancellationToken`]: cancelling is idempotent, the cancelled state is
//! observable, and each handle carries a unique id so a superseded request
//! can verify the stored handle is still its own before clearing it.

use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Cancellation reason recorded when a newer request supersedes an older one.
pub const SUPERSEDED_REASON: &str = "previous request cancelled";

/// Handle associated with one in-flight request.
#[derive(Debug, Clone)]
pub struct RequestToken {
    id: Uuid,
    token: CancellationToken,
    reason: Arc<OnceLock<String>>,
}

impl RequestToken {
    /// Create a fresh, uncancelled handle.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            token: CancellationToken::new(),
            reason: Arc::new(OnceLock::new()),
        }
    }

    /// Unique id of the request this handle belongs to.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Cancel the request, recording the reason.
    ///
    /// Idempotent: only the first call records its reason, later calls are
    /// no-ops.
    pub fn cancel(&self, reason: &str) {
        if self.reason.set(reason.to_string()).is_ok() {
            self.token.cancel();
        }
    }

    /// Whether this handle has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The recorded cancellation reason, if cancelled.
    pub fn reason(&self) -> Option<&str> {
        self.reason.get().map(String::as_str)
    }

    /// Complete when the handle is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}

impl Default for RequestToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_idempotent() {
        let token = RequestToken::new();
        assert!(!token.is_cancelled());

        token.cancel(SUPERSEDED_REASON);
        token.cancel("a different reason");

        assert!(token.is_cancelled());
        assert_eq!(token.reason(), Some(SUPERSEDED_REASON));
    }

    #[test]
    fn test_uncancelled_has_no_reason() {
        let token = RequestToken::new();
        assert_eq!(token.reason(), None);
    }

    #[test]
    fn test_handles_have_unique_ids() {
        assert_ne!(RequestToken::new().id(), RequestToken::new().id());
    }

    #[test]
    fn test_cancelled_future_resolves() {
        tokio_test::block_on(async {
            let token = RequestToken::new();
            let waiter = token.clone();
            token.cancel("done");
            // must not hang
            waiter.cancelled().await;
        });
    }
}
