//! Cooperative cancellation for animation tasks.
//!
//! [`CancellationToken`] is a cloneable signal shared between the caller,
//! the render loop and the task closure. Cancelling it makes the render loop
//! return [`Error::Cancelled`](crate::Error::Cancelled) at its next wakeup.
//! The task itself is never aborted: a task that ignores the token keeps
//! running in the background after the loop has returned, so tasks must
//! observe cancellation to avoid outliving their animation.
//!
//! ```rust
//! use clog::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let task_token = token.clone();
//! assert!(!task_token.is_cancelled());
//! token.cancel();
//! assert!(task_token.is_cancelled());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// A thread-safe, cloneable cancellation signal.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    /// Creates an uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation to every clone of this token.
    ///
    /// Cancelling twice has no further effect.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Returns `true` once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Completes when the token is cancelled.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a concurrent cancel is not missed.
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
