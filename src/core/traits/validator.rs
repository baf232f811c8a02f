//! Request validation capability

use crate::core::types::ChatRequest;
use crate::utils::error::Result;

/// Pre-dispatch request check used by the validator middleware
pub trait RequestValidator: Send + Sync {
    fn validate(&self, req: &ChatRequest) -> Result<()>;
}
