//! Circuit breaker middleware

use crate::core::circuit_breaker::CircuitBreaker;
use crate::core::middleware::chain::{Handler, Middleware};
use futures::FutureExt;
use std::sync::Arc;

/// Runs the inner call through a shared [`CircuitBreaker`]
#[derive(Debug, Clone)]
pub struct CircuitBreakerMiddleware {
    breaker: Arc<CircuitBreaker>,
}

impl CircuitBreakerMiddleware {
    pub fn new(breaker: Arc<CircuitBreaker>) -> Self {
        Self { breaker }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }
}

impl Middleware for CircuitBreakerMiddleware {
    fn name(&self) -> &str {
        "circuit_breaker"
    }

    fn wrap(&self, next: Handler) -> Handler {
        let breaker = self.breaker.clone();
        Arc::new(move |ctx, req| {
            let next = next.clone();
            let breaker = breaker.clone();
            async move {
                let call_ctx = ctx.clone();
                breaker
                    .call_with_result(&ctx, move || next(call_ctx, req))
                    .await
            }
            .boxed()
        })
    }
}
