//! Error types for the resilience layer

use crate::core::types::errors::ClassifiedError;
use thiserror::Error;

/// Result type alias for the resilience layer
pub type Result<T> = std::result::Result<T, ResilienceError>;

/// Main error type returned by breakers, chains and the resilient provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResilienceError {
    /// Classified upstream failure
    #[error(transparent)]
    Provider(#[from] ClassifiedError),

    /// The breaker is open and the call was not attempted
    #[error("circuit breaker is open")]
    CircuitOpen,

    /// The half-open probe budget is exhausted
    #[error("too many calls in half-open state")]
    TooManyCallsInHalfOpen,

    /// A panic was caught by the recovery middleware
    #[error("panic recovered: {message}")]
    PanicRecovered { message: String },

    /// The caller cancelled the call
    #[error("call cancelled")]
    Cancelled,

    /// The call context deadline elapsed
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// A request rewriter failed
    #[error("rewriter '{rewriter}' failed: {message}")]
    Rewrite { rewriter: String, message: String },

    /// A request validator rejected the request
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}
