//! Cancellable, deadline-bound execution context.
//!
//! An [`ExecContext`] carries a cancellation signal and an optional deadline.
//! Child contexts created with [`ExecContext::with_timeout`] or
//! [`ExecContext::with_deadline`] share the parent's signal and keep the
//! earliest deadline, so cancelling the root stops everything below it.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Why a context is done.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// The context was cancelled through its [`CancelHandle`].
    #[error("context cancelled")]
    Cancelled,
    /// The context deadline has passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Handle that cancels the context it was created with, and all children.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel the context. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

/// Execution context with cooperative cancellation and an optional deadline.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use weave_core::{ContextError, ExecContext};
///
/// let (ctx, handle) = ExecContext::cancellable();
/// let ctx = ctx.with_timeout(Duration::from_secs(5));
/// assert_eq!(ctx.err(), None);
///
/// handle.cancel();
/// assert_eq!(ctx.err(), Some(ContextError::Cancelled));
/// ```
#[derive(Clone, Debug)]
pub struct ExecContext {
    cancelled: watch::Receiver<bool>,
    deadline: Option<Instant>,
}

impl ExecContext {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        // Sender dropped right away: the value can never become true
        let (_, receiver) = watch::channel(false);
        Self {
            cancelled: receiver,
            deadline: None,
        }
    }

    /// A root context paired with the handle that cancels it.
    #[must_use]
    pub fn cancellable() -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        let ctx = Self {
            cancelled: receiver,
            deadline: None,
        };
        (ctx, CancelHandle { sender })
    }

    /// Child context that expires after `timeout` (or earlier, if the parent does).
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Child context that expires at `deadline` (or earlier, if the parent does).
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        };
        Self {
            cancelled: self.cancelled.clone(),
            deadline: Some(deadline),
        }
    }

    /// The effective deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why the context is done, or `None` while it is live.
    ///
    /// Cancellation is reported in preference to an elapsed deadline.
    pub fn err(&self) -> Option<ContextError> {
        if *self.cancelled.borrow() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Whether the context is cancelled or expired.
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Wait until the context is done and report why.
    ///
    /// Never resolves for a [`background`](Self::background) context.
    pub async fn done(&self) -> ContextError {
        let mut signal = self.cancelled.clone();
        let cancelled = async move {
            loop {
                if *signal.borrow_and_update() {
                    return;
                }
                if signal.changed().await.is_err() {
                    // Sender is gone, the value is final
                    if *signal.borrow() {
                        return;
                    }
                    std::future::pending::<()>().await;
                }
            }
        };

        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                () = cancelled => ContextError::Cancelled,
                () = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
            },
            None => {
                cancelled.await;
                ContextError::Cancelled
            }
        }
    }

    /// Run `future` until it completes or the context is done.
    ///
    /// The future is not polled at all if the context is already done. When
    /// the context finishes first, the future is dropped.
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, ContextError> {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            output = future => Ok(output),
        }
    }
}

impl Default for ExecContext {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_live() {
        let ctx = ExecContext::background();
        assert_eq!(ctx.err(), None);
        assert!(!ctx.is_done());
        assert_eq!(ctx.deadline(), None);
    }

    #[test]
    fn test_cancel_propagates_to_children() {
        let (ctx, handle) = ExecContext::cancellable();
        let child = ctx.with_timeout(Duration::from_secs(60));
        handle.cancel();
        assert_eq!(ctx.err(), Some(ContextError::Cancelled));
        assert_eq!(child.err(), Some(ContextError::Cancelled));
    }

    #[test]
    fn test_cancel_survives_handle_drop() {
        let (ctx, handle) = ExecContext::cancellable();
        handle.cancel();
        drop(handle);
        assert_eq!(ctx.err(), Some(ContextError::Cancelled));
    }

    #[tokio::test]
    async fn test_child_keeps_earliest_deadline() {
        let parent = ExecContext::background().with_timeout(Duration::from_millis(10));
        let child = parent.with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());
    }

    #[tokio::test]
    async fn test_zero_timeout_is_done() {
        let ctx = ExecContext::background().with_timeout(Duration::ZERO);
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_done_resolves_on_deadline() {
        let ctx = ExecContext::background().with_timeout(Duration::from_millis(5));
        assert_eq!(ctx.done().await, ContextError::DeadlineExceeded);
    }

    #[tokio::test]
    async fn test_done_resolves_on_cancel() {
        let (ctx, handle) = ExecContext::cancellable();
        let waiter = {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.done().await })
        };
        tokio::task::yield_now().await;
        handle.cancel();
        assert_eq!(waiter.await.unwrap(), ContextError::Cancelled);
    }

    #[tokio::test]
    async fn test_run_completes_future() {
        let ctx = ExecContext::background().with_timeout(Duration::from_secs(5));
        assert_eq!(ctx.run(async { 42 }).await, Ok(42));
    }

    #[tokio::test]
    async fn test_run_interrupts_slow_future() {
        let ctx = ExecContext::background().with_timeout(Duration::from_millis(10));
        let result = ctx
            .run(tokio::time::sleep(Duration::from_secs(5)))
            .await;
        assert_eq!(result, Err(ContextError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_run_skips_future_when_done() {
        let (ctx, handle) = ExecContext::cancellable();
        handle.cancel();
        let mut polled = false;
        let result = ctx.run(async { polled = true }).await;
        assert_eq!(result, Err(ContextError::Cancelled));
        assert!(!polled);
    }
}
