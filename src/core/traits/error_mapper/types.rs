//! Status-table error mapper
//!
//! The mapping shared by every provider. It is pure and total over the HTTP
//! status plus the message text.

use super::trait_def::ErrorMapper;
use crate::core::types::errors::{ClassifiedError, ErrorCode};

/// Keywords that turn a 400 into a quota failure (matched case-insensitively)
const QUOTA_KEYWORDS: [&str; 2] = ["quota", "credit"];

/// Status code used by some providers for an overloaded model
pub const STATUS_MODEL_OVERLOADED: u16 = 529;

/// Error mapper implementing the shared status table for one provider
#[derive(Debug, Clone)]
pub struct StatusErrorMapper {
    provider: String,
}

impl StatusErrorMapper {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
        }
    }
}

impl ErrorMapper for StatusErrorMapper {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn map_http_error(&self, status_code: u16, message: &str) -> ClassifiedError {
        map_http_error(status_code, message, &self.provider)
    }
}

/// Map an HTTP status code and message to a classified error
///
/// | Status | Kind | Retryable |
/// |--------|------|-----------|
/// | 401 | Unauthorized | No |
/// | 403 | Forbidden | No |
/// | 429 | RateLimited | Yes |
/// | 400 | InvalidRequest, or QuotaExceeded when the message mentions quota/credit | No |
/// | 502, 503, 504 | UpstreamError | Yes |
/// | 529 | ModelOverloaded | Yes |
/// | other | UpstreamError | iff status >= 500 |
pub fn map_http_error(status: u16, message: &str, provider: &str) -> ClassifiedError {
    let (code, retryable) = match status {
        401 => (ErrorCode::Unauthorized, false),
        403 => (ErrorCode::Forbidden, false),
        429 => (ErrorCode::RateLimited, true),
        400 if mentions_quota(message) => (ErrorCode::QuotaExceeded, false),
        400 => (ErrorCode::InvalidRequest, false),
        502..=504 => (ErrorCode::UpstreamError, true),
        STATUS_MODEL_OVERLOADED => (ErrorCode::ModelOverloaded, true),
        _ => (ErrorCode::UpstreamError, status >= 500),
    };

    ClassifiedError::new(code, message, status, retryable, provider)
}

fn mentions_quota(message: &str) -> bool {
    let lower = message.to_lowercase();
    QUOTA_KEYWORDS.iter().any(|k| lower.contains(k))
}
