//! The resilient call entry point

use super::builder::ResilientProviderBuilder;
use crate::config::ResilienceConfig;
use crate::core::circuit_breaker::CircuitBreaker;
use crate::core::context::CallContext;
use crate::core::middleware::Handler;
use crate::core::rewriter::RewriterChain;
use crate::core::traits::{ChunkStream, Provider, RateLimiter};
use crate::core::types::{ChatRequest, ChatResponse, ClassifiedError};
use crate::utils::error::{ResilienceError, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// A provider wrapped in rewriting, rate limiting, retries and a breaker
///
/// Stage order, outermost first: recovery, tracing, metrics, custom
/// middlewares, cache, timeout, rate limit, retry, circuit breaker, then the
/// raw provider. Rewriters run once before the chain.
pub struct ResilientProvider {
    inner: Arc<dyn Provider>,
    rewriters: RewriterChain,
    breaker: Option<Arc<CircuitBreaker>>,
    rate_limiter: Option<Arc<dyn RateLimiter>>,
    stages: Vec<String>,
    handler: Handler,
}

impl ResilientProvider {
    pub fn builder(provider: Arc<dyn Provider>) -> ResilientProviderBuilder {
        ResilientProviderBuilder::new(provider)
    }

    pub fn from_config(provider: Arc<dyn Provider>, config: &ResilienceConfig) -> Result<Self> {
        Ok(ResilientProviderBuilder::from_config(provider, config)?.build())
    }

    pub(super) fn from_parts(
        inner: Arc<dyn Provider>,
        rewriters: RewriterChain,
        breaker: Option<Arc<CircuitBreaker>>,
        rate_limiter: Option<Arc<dyn RateLimiter>>,
        stages: Vec<String>,
        handler: Handler,
    ) -> Self {
        Self {
            inner,
            rewriters,
            breaker,
            rate_limiter,
            stages,
            handler,
        }
    }

    /// Breaker guarding the upstream, for administrative reset
    pub fn breaker(&self) -> Option<&Arc<CircuitBreaker>> {
        self.breaker.as_ref()
    }

    /// Middleware stage names, outermost first
    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn rewriters(&self) -> &RewriterChain {
        &self.rewriters
    }

    /// Execute one call through every stage
    ///
    /// The chain is abandoned as soon as `ctx` is cancelled or past its
    /// deadline.
    pub async fn call(&self, ctx: &CallContext, req: ChatRequest) -> Result<ChatResponse> {
        let req = self
            .rewriters
            .execute(ctx, req)
            .map_err(|e| self.classify(e))?;
        ctx.run((self.handler)(ctx.clone(), req))
            .await
            .and_then(|result| result)
            .map_err(|e| self.classify(e))
    }

    /// Local failures become invalid-request errors; everything else is
    /// already classified or a sentinel
    fn classify(&self, err: ResilienceError) -> ResilienceError {
        match err {
            ResilienceError::Rewrite { .. } => ClassifiedError::invalid_request(
                self.inner.name(),
                format!("request rewrite failed: {}", err),
            )
            .into(),
            ResilienceError::Validation(message) => {
                ClassifiedError::invalid_request(self.inner.name(), message).into()
            }
            other => other,
        }
    }
}

impl fmt::Debug for ResilientProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilientProvider")
            .field("provider", &self.inner.name())
            .field("stages", &self.stages)
            .field("rewriters", &self.rewriters)
            .field("breaker", &self.breaker)
            .finish()
    }
}

#[async_trait]
impl Provider for ResilientProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn completion(&self, ctx: &CallContext, req: ChatRequest) -> Result<ChatResponse> {
        self.call(ctx, req).await
    }

    /// Establish a stream; rewriters, rate limiting and the breaker apply,
    /// retries do not
    async fn stream(&self, ctx: &CallContext, req: ChatRequest) -> Result<ChunkStream> {
        let req = self
            .rewriters
            .execute(ctx, req)
            .map_err(|e| self.classify(e))?;

        if let Some(limiter) = &self.rate_limiter {
            limiter.wait(ctx).await?;
        }

        let inner = &self.inner;
        let result = match &self.breaker {
            Some(breaker) => {
                breaker
                    .call_with_result(ctx, || inner.stream(ctx, req))
                    .await
            }
            None => inner.stream(ctx, req).await,
        };
        result.map_err(|e| self.classify(e))
    }
}
