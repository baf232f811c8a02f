//! Ordered rewriter chain

use crate::core::context::CallContext;
use crate::core::types::ChatRequest;
use crate::utils::error::{ResilienceError, Result};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A pure, idempotent request normalization step
pub trait RequestRewriter: Send + Sync {
    fn name(&self) -> &str;

    fn rewrite(&self, ctx: &CallContext, req: ChatRequest) -> Result<ChatRequest>;
}

/// Rewriters applied strictly in registration order
///
/// The first failing rewriter aborts the chain with
/// [`ResilienceError::Rewrite`] naming it.
#[derive(Clone, Default)]
pub struct RewriterChain {
    rewriters: Vec<Arc<dyn RequestRewriter>>,
}

impl RewriterChain {
    pub fn new(rewriters: Vec<Arc<dyn RequestRewriter>>) -> Self {
        Self { rewriters }
    }

    pub fn with<R: RequestRewriter + 'static>(mut self, rewriter: R) -> Self {
        self.rewriters.push(Arc::new(rewriter));
        self
    }

    pub fn len(&self) -> usize {
        self.rewriters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewriters.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.rewriters.iter().map(|r| r.name()).collect()
    }

    pub fn execute(&self, ctx: &CallContext, req: ChatRequest) -> Result<ChatRequest> {
        self.rewriters.iter().try_fold(req, |req, rewriter| {
            if let Some(err) = ctx.err() {
                return Err(err);
            }
            debug!(rewriter = rewriter.name(), "applying request rewriter");
            rewriter
                .rewrite(ctx, req)
                .map_err(|e| attribute(rewriter.name(), e))
        })
    }

    /// Execute an optional chain; `None` returns the request unchanged
    pub fn execute_optional(
        chain: Option<&RewriterChain>,
        ctx: &CallContext,
        req: ChatRequest,
    ) -> Result<ChatRequest> {
        match chain {
            Some(chain) => chain.execute(ctx, req),
            None => Ok(req),
        }
    }
}

/// Name the registered rewriter in the error, keeping any inner attribution
fn attribute(name: &str, err: ResilienceError) -> ResilienceError {
    match err {
        ResilienceError::Rewrite { rewriter, message } if rewriter == name => {
            ResilienceError::rewrite(rewriter, message)
        }
        other => ResilienceError::rewrite(name, other.to_string()),
    }
}

impl fmt::Debug for RewriterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewriterChain")
            .field("rewriters", &self.names())
            .finish()
    }
}
