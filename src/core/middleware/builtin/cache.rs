//! Response caching middleware

use crate::core::middleware::chain::{Handler, Middleware};
use crate::core::traits::ResponseCache;
use futures::FutureExt;
use std::sync::Arc;
use tracing::debug;

/// Serves repeated requests from a [`ResponseCache`]
///
/// Streaming requests bypass the cache. Only successful responses are stored.
#[derive(Clone)]
pub struct CacheMiddleware {
    cache: Arc<dyn ResponseCache>,
}

impl CacheMiddleware {
    pub fn new(cache: Arc<dyn ResponseCache>) -> Self {
        Self { cache }
    }
}

impl Middleware for CacheMiddleware {
    fn name(&self) -> &str {
        "cache"
    }

    fn wrap(&self, next: Handler) -> Handler {
        let cache = self.cache.clone();
        Arc::new(move |ctx, req| {
            let next = next.clone();
            let cache = cache.clone();
            async move {
                if req.stream {
                    return next(ctx, req).await;
                }

                let key = cache.key(&req);
                if let Some(hit) = cache.get(&key).await {
                    debug!(model = %req.model, "response cache hit");
                    return Ok(hit);
                }

                let resp = next(ctx, req).await?;
                cache.set(key, resp.clone()).await;
                Ok(resp)
            }
            .boxed()
        })
    }
}
