//! Rate limiter capability

use crate::core::context::CallContext;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Blocking admission control in front of an upstream
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Wait until a call may proceed
    ///
    /// Returns the context error without admitting the call if the context is
    /// done first.
    async fn wait(&self, ctx: &CallContext) -> Result<()>;
}
