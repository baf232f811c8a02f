//! Request logging middleware

use crate::core::middleware::chain::{Handler, Middleware};
use futures::FutureExt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Logs every call with model, message count, token usage and latency
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for LoggingMiddleware {
    fn name(&self) -> &str {
        "logging"
    }

    fn wrap(&self, next: Handler) -> Handler {
        Arc::new(move |ctx, req| {
            let next = next.clone();
            async move {
                let model = req.model.clone();
                let messages = req.messages.len();
                let start = Instant::now();

                let result = next(ctx, req).await;
                let elapsed_ms = start.elapsed().as_millis() as u64;
                match &result {
                    Ok(resp) => info!(
                        model = %model,
                        messages,
                        tokens = resp.usage.total_tokens,
                        elapsed_ms,
                        "llm request completed"
                    ),
                    Err(e) => warn!(
                        model = %model,
                        messages,
                        elapsed_ms,
                        error = %e,
                        "llm request failed"
                    ),
                }
                result
            }
            .boxed()
        })
    }
}
