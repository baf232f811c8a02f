//! Per-call timeout middleware

use crate::core::middleware::chain::{Handler, Middleware};
use crate::core::traits::error_mapper::{ErrorMapper, StatusErrorMapper};
use crate::utils::error::ResilienceError;
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Bounds the inner call with a child context deadline
///
/// The child context is cancelled on every exit path, so work spawned by
/// inner stages under it never outlives the call. When this stage's own
/// deadline fires the call fails with a retryable 504 classified error; when
/// the caller's context ends first the context error is returned unchanged.
#[derive(Debug, Clone)]
pub struct TimeoutMiddleware {
    timeout: Duration,
    mapper: StatusErrorMapper,
}

impl TimeoutMiddleware {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            mapper: StatusErrorMapper::new("unknown"),
        }
    }

    /// Provider name stamped on timeout errors
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.mapper = StatusErrorMapper::new(provider);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Middleware for TimeoutMiddleware {
    fn name(&self) -> &str {
        "timeout"
    }

    fn wrap(&self, next: Handler) -> Handler {
        let timeout = self.timeout;
        let mapper = self.mapper.clone();
        Arc::new(move |ctx, req| {
            let next = next.clone();
            let mapper = mapper.clone();
            async move {
                let child = ctx.with_call_timeout(timeout);
                let _cancel = child.cancel_on_drop();
                let result = child.run(next(child.clone(), req)).await.and_then(|r| r);
                match result {
                    Err(ResilienceError::DeadlineExceeded)
                        if child.call_timed_out() && !ctx.is_done() =>
                    {
                        warn!(
                            provider = mapper.provider(),
                            timeout_ms = timeout.as_millis() as u64,
                            "call timed out"
                        );
                        Err(mapper.map_timeout_error(timeout).into())
                    }
                    other => other,
                }
            }
            .boxed()
        })
    }
}
