//! Constructors and classification predicates

use super::types::ResilienceError;
use crate::core::types::errors::{ClassifiedError, ErrorCode};

impl ResilienceError {
    pub fn panic_recovered<S: Into<String>>(message: S) -> Self {
        Self::PanicRecovered {
            message: message.into(),
        }
    }

    pub fn rewrite<R: Into<String>, S: Into<String>>(rewriter: R, message: S) -> Self {
        Self::Rewrite {
            rewriter: rewriter.into(),
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Whether the same call may succeed if attempted again unchanged.
    ///
    /// Only classified upstream failures carry this flag; breaker rejections,
    /// context errors and local failures are never retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider(e) if e.retryable)
    }

    /// The caller gave up: cancellation or an elapsed deadline
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    /// Rejected by a breaker without attempting the call
    pub fn is_breaker_rejection(&self) -> bool {
        matches!(self, Self::CircuitOpen | Self::TooManyCallsInHalfOpen)
    }

    /// The classified upstream error, if this is one
    pub fn classified(&self) -> Option<&ClassifiedError> {
        match self {
            Self::Provider(e) => Some(e),
            _ => None,
        }
    }

    /// Taxonomy kind, if this is a classified upstream error
    pub fn code(&self) -> Option<ErrorCode> {
        self.classified().map(|e| e.code)
    }
}
