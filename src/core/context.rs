//! Call context: cancellation and deadline propagation
//!
//! Every suspension point in the resilience layer (backoff waits, rate limiter
//! waits, timeouts) races against the context so that a caller giving up is
//! observed promptly and surfaces as a context error.
//!
//! A deadline set by the resilience layer itself ([`CallContext::with_call_timeout`])
//! is tracked apart from the caller's: its expiry is an upstream timeout, not
//! the caller giving up.

use crate::utils::error::{ResilienceError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Cancellation token plus optional deadline, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
    /// Deadline imposed by the layer's own timeout stage, inherited by children
    call_deadline: Option<Instant>,
}

impl CallContext {
    /// A fresh context with no deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// A context driven by an existing cancellation token
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
            call_deadline: None,
        }
    }

    /// Child context with an absolute deadline (never later than the parent's)
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
            call_deadline: self.call_deadline,
        }
    }

    /// Child context bounded by the layer's own per-call timeout
    ///
    /// Unlike [`CallContext::with_timeout`], reaching this deadline is reported
    /// by [`CallContext::call_timed_out`].
    pub fn with_call_timeout(&self, timeout: Duration) -> Self {
        let call_deadline = Instant::now() + timeout;
        let mut child = self.with_deadline(call_deadline);
        child.call_deadline = Some(match self.call_deadline {
            Some(outer) if outer < call_deadline => outer,
            _ => call_deadline,
        });
        child
    }

    /// Child context that expires after `timeout`
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Cancel this context and every child derived from it
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Guard that cancels this context when dropped
    pub fn cancel_on_drop(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }

    /// The context error, if the context is already done
    pub fn err(&self) -> Option<ResilienceError> {
        if self.token.is_cancelled() {
            return Some(ResilienceError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ResilienceError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Whether the layer's own call deadline has passed
    ///
    /// False when only the caller's deadline or cancellation ended the call.
    pub fn call_timed_out(&self) -> bool {
        self.call_deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Resolves with the context error once cancelled or past the deadline
    pub async fn done(&self) -> ResilienceError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.token.cancelled() => ResilienceError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => ResilienceError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                ResilienceError::Cancelled
            }
        }
    }

    /// Run `fut` until it completes or the context is done, whichever comes first
    pub async fn run<F>(&self, fut: F) -> Result<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            out = fut => Ok(out),
        }
    }

    /// Sleep for `delay`, returning early with the context error if it fires first
    pub async fn sleep(&self, delay: Duration) -> Result<()> {
        self.run(tokio::time::sleep(delay)).await
    }
}
