//! Rate limiting middleware

use crate::core::middleware::chain::{Handler, Middleware};
use crate::core::traits::RateLimiter;
use futures::FutureExt;
use std::sync::Arc;

/// Waits on the limiter before invoking the next handler
#[derive(Clone)]
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl Middleware for RateLimitMiddleware {
    fn name(&self) -> &str {
        "rate_limit"
    }

    fn wrap(&self, next: Handler) -> Handler {
        let limiter = self.limiter.clone();
        Arc::new(move |ctx, req| {
            let next = next.clone();
            let limiter = limiter.clone();
            async move {
                limiter.wait(&ctx).await?;
                next(ctx, req).await
            }
            .boxed()
        })
    }
}
