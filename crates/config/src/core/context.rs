//! Cancellation and deadline for a load pass

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::{BackendError, BackendResult};

/// Cancellation signal and optional deadline shared by a load pass and the
/// backends it calls.
///
/// Backends receive the context with every call and should return
/// [`BackendError::Canceled`] or [`BackendError::DeadlineExceeded`] when it
/// fires. The loader also races each backend call against the context, so a
/// backend that ignores it cannot stall the pass.
#[derive(Debug, Clone, Default)]
pub struct LoadContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl LoadContext {
    /// Create a context that is never canceled and has no deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context driven by an existing cancellation token
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Set a deadline `timeout` from now, keeping any earlier one.
    ///
    /// A timeout too large to represent as an instant sets no deadline.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Set an absolute deadline, keeping any earlier one
    #[must_use = "builder methods must be chained or built"]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Create a child context, canceled with its parent, sharing its deadline
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancel this context and its children
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if cancellation has been requested
    pub fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancellation token
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail if the context is canceled or its deadline has passed.
    ///
    /// Cancellation wins when both apply.
    pub fn check(&self) -> BackendResult<()> {
        if self.token.is_cancelled() {
            return Err(BackendError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(BackendError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Wait until the context is canceled or its deadline passes.
    pub async fn done(&self) -> BackendError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                () = self.token.cancelled() => BackendError::Canceled,
                () = tokio::time::sleep_until(deadline) => BackendError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                BackendError::Canceled
            }
        }
    }

    /// Run `operation` unless the context fires first.
    pub async fn run<T, F>(&self, operation: F) -> BackendResult<T>
    where
        F: Future<Output = BackendResult<T>>,
    {
        self.check()?;
        tokio::select! {
            biased;
            interrupted = self.done() => Err(interrupted),
            result = operation => result,
        }
    }
}
