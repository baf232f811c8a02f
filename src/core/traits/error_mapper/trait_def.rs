//! Error mapper trait definition
//!
//! This module defines the core ErrorMapper trait that converts HTTP status codes,
//! error bodies and transport failures into [`ClassifiedError`] values.

use super::body::read_error_message;
use crate::core::types::errors::{ClassifiedError, ErrorCode};
use std::time::Duration;

/// Trait for mapping upstream failure conditions into the error taxonomy
///
/// Every error that crosses a provider boundary goes through a mapper exactly
/// once; callers upstream only ever see the classified shape.
///
/// ```rust,ignore
/// use llm_resilience::core::traits::error_mapper::{ErrorMapper, StatusErrorMapper};
///
/// let mapper = StatusErrorMapper::new("deepseek");
/// let err = mapper.map_http_error(429, "slow down");
/// assert!(err.retryable);
/// ```
pub trait ErrorMapper: Send + Sync + 'static {
    /// Provider name stamped on every mapped error
    fn provider(&self) -> &str;

    /// Map an HTTP status and message to a classified error
    ///
    /// The message, the status and the provider name must be preserved verbatim.
    fn map_http_error(&self, status_code: u16, message: &str) -> ClassifiedError;

    /// Map a raw error body, extracting the message from common JSON envelopes
    fn map_error_body(&self, status_code: u16, body: &str) -> ClassifiedError {
        self.map_http_error(status_code, &read_error_message(body))
    }

    /// Map network-level errors (connection refused, reset, TLS, ...)
    fn map_network_error(&self, error: &dyn std::error::Error) -> ClassifiedError {
        ClassifiedError::new(
            ErrorCode::UpstreamError,
            error.to_string(),
            502,
            true,
            self.provider(),
        )
    }

    /// Map an upstream timeout
    fn map_timeout_error(&self, timeout_duration: Duration) -> ClassifiedError {
        ClassifiedError::new(
            ErrorCode::UpstreamError,
            format!("Request timeout after {:?}", timeout_duration),
            504,
            true,
            self.provider(),
        )
    }
}
