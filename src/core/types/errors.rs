//! Error taxonomy shared by every provider boundary
//!
//! Upstream failures are classified into a closed set of kinds. Each classified
//! error keeps the provider name, the HTTP status and the original message
//! verbatim, plus a retryable flag callers use instead of string matching.
//!
//! | Kind | Typical status | Retryable |
//! |------|----------------|-----------|
//! | Unauthorized | 401 | No |
//! | Forbidden | 403 | No |
//! | RateLimited | 429 | Yes |
//! | InvalidRequest | 400 | No |
//! | QuotaExceeded | 400 | No |
//! | ModelOverloaded | 529 | Yes |
//! | UpstreamError | 5xx / other | Only for >= 500 |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of upstream failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    RateLimited,
    InvalidRequest,
    QuotaExceeded,
    ModelOverloaded,
    UpstreamError,
}

impl ErrorCode {
    /// Stable snake_case identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::RateLimited => "rate_limited",
            Self::InvalidRequest => "invalid_request",
            Self::QuotaExceeded => "quota_exceeded",
            Self::ModelOverloaded => "model_overloaded",
            Self::UpstreamError => "upstream_error",
        }
    }

    /// Whether the failure is attributable to the caller rather than the provider
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::Forbidden | Self::InvalidRequest | Self::QuotaExceeded
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An upstream failure tagged with its taxonomy kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{provider} {code} (HTTP {http_status}): {message}")]
pub struct ClassifiedError {
    pub code: ErrorCode,
    pub message: String,
    pub http_status: u16,
    pub retryable: bool,
    pub provider: String,
}

impl ClassifiedError {
    pub fn new(
        code: ErrorCode,
        message: impl Into<String>,
        http_status: u16,
        retryable: bool,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            http_status,
            retryable,
            provider: provider.into(),
        }
    }

    /// Invalid request raised locally, before anything was dispatched
    pub fn invalid_request(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message, 400, false, provider)
    }
}
