//! Tracing span middleware

use crate::core::middleware::chain::{Handler, Middleware};
use futures::FutureExt;
use std::sync::Arc;
use tracing::Instrument;
use tracing::field::{Empty, display};

/// Runs each call inside an `llm.request` span
#[derive(Debug, Clone, Default)]
pub struct TracingMiddleware;

impl TracingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for TracingMiddleware {
    fn name(&self) -> &str {
        "tracing"
    }

    fn wrap(&self, next: Handler) -> Handler {
        Arc::new(move |ctx, req| {
            let next = next.clone();
            let span = tracing::info_span!(
                "llm.request",
                model = %req.model,
                messages = req.messages.len(),
                trace_id = %req.trace_id,
                tokens = Empty,
                error = Empty,
            );
            let recorder = span.clone();
            async move {
                let result = next(ctx, req).await;
                match &result {
                    Ok(resp) => {
                        recorder.record("tokens", resp.usage.total_tokens);
                    }
                    Err(e) => {
                        recorder.record("error", display(e));
                    }
                }
                result
            }
            .instrument(span)
            .boxed()
        })
    }
}
