//! Builder for [`ResilientProvider`]

use super::provider::ResilientProvider;
use crate::config::{ResilienceConfig, Validate};
use crate::core::cache::MokaResponseCache;
use crate::core::circuit_breaker::{BreakerConfig, CircuitBreaker};
use crate::core::metrics::NoopMetrics;
use crate::core::middleware::{
    CacheMiddleware, CircuitBreakerMiddleware, Handler, MetricsMiddleware, Middleware,
    MiddlewareChain, PanicObserver, RateLimitMiddleware, RecoveryMiddleware, RetryMiddleware,
    TimeoutMiddleware, TracingMiddleware, handler_fn,
};
use crate::core::rate_limiter::GovernorRateLimiter;
use crate::core::rewriter::{EmptyToolsCleaner, RequestRewriter, RewriterChain};
use crate::core::traits::{MetricsCollector, Provider, RateLimiter, ResponseCache};
use crate::utils::error::{ResilienceError, Result};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Assembles the stages around a raw provider
///
/// Every stage is optional; a missing stage is a passthrough.
pub struct ResilientProviderBuilder {
    provider: Arc<dyn Provider>,
    breaker: Option<Arc<CircuitBreaker>>,
    retry: Option<RetryMiddleware>,
    rate_limiter: Option<Arc<dyn RateLimiter>>,
    cache: Option<Arc<dyn ResponseCache>>,
    metrics: Arc<dyn MetricsCollector>,
    timeout: Option<Duration>,
    rewriters: RewriterChain,
    on_panic: Option<PanicObserver>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl ResilientProviderBuilder {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            breaker: None,
            retry: None,
            rate_limiter: None,
            cache: None,
            metrics: Arc::new(NoopMetrics),
            timeout: None,
            rewriters: RewriterChain::default(),
            on_panic: None,
            middlewares: Vec::new(),
        }
    }

    /// Stages described by `config`, with the provider's overrides applied
    ///
    /// The empty-tools cleaner is always installed.
    pub fn from_config(provider: Arc<dyn Provider>, config: &ResilienceConfig) -> Result<Self> {
        let effective = config.for_provider(provider.name());
        effective.validate().map_err(ResilienceError::config)?;

        let mut builder = Self::new(provider)
            .breaker_config(effective.breaker.to_config())
            .rewriter(EmptyToolsCleaner);

        if effective.retry.enabled {
            builder = builder.retry(effective.retry.to_middleware());
        }
        if effective.rate_limit.enabled {
            let limiter = GovernorRateLimiter::new(
                effective.rate_limit.requests_per_second,
                effective.rate_limit.burst,
            )?;
            builder = builder.rate_limiter(Arc::new(limiter));
        }
        if effective.cache.enabled {
            let cache = MokaResponseCache::new(effective.cache.ttl(), effective.cache.max_capacity);
            builder = builder.cache(Arc::new(cache));
        }
        if let Some(timeout) = effective.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(builder)
    }

    /// Share an existing breaker
    pub fn breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.breaker = Some(breaker);
        self
    }

    /// Create a breaker named after the provider
    pub fn breaker_config(mut self, config: BreakerConfig) -> Self {
        let breaker = CircuitBreaker::new(self.provider.name(), config);
        self.breaker = Some(Arc::new(breaker));
        self
    }

    pub fn retry(mut self, retry: RetryMiddleware) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Whole-call deadline, retries included
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn rewriters(mut self, rewriters: RewriterChain) -> Self {
        self.rewriters = rewriters;
        self
    }

    pub fn rewriter<R: RequestRewriter + 'static>(mut self, rewriter: R) -> Self {
        self.rewriters = self.rewriters.with(rewriter);
        self
    }

    /// Observe panics recovered at the outermost stage
    pub fn on_panic<F>(mut self, observer: F) -> Self
    where
        F: Fn(&(dyn Any + Send)) + Send + Sync + 'static,
    {
        self.on_panic = Some(Arc::new(observer));
        self
    }

    /// Extra middleware, run inside metrics and outside the cache
    pub fn middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn build(self) -> ResilientProvider {
        let provider_name = self.provider.name().to_string();
        let chain = MiddlewareChain::new()
            .with(RecoveryMiddleware::with_shared_observer(self.on_panic))
            .with(TracingMiddleware::new())
            .with(MetricsMiddleware::new(self.metrics));
        for middleware in self.middlewares {
            chain.use_shared(middleware);
        }
        if let Some(cache) = self.cache {
            chain.use_middleware(CacheMiddleware::new(cache));
        }
        if let Some(timeout) = self.timeout {
            chain.use_middleware(TimeoutMiddleware::new(timeout).with_provider(provider_name));
        }
        if let Some(limiter) = &self.rate_limiter {
            chain.use_middleware(RateLimitMiddleware::new(limiter.clone()));
        }
        if let Some(retry) = self.retry {
            chain.use_middleware(retry);
        }
        if let Some(breaker) = &self.breaker {
            chain.use_middleware(CircuitBreakerMiddleware::new(breaker.clone()));
        }

        let provider = self.provider;
        let raw = provider.clone();
        let base: Handler = handler_fn(move |ctx, req| {
            let raw = raw.clone();
            async move { raw.completion(&ctx, req).await }
        });
        let handler = chain.then(base);

        info!(
            provider = provider.name(),
            stages = ?chain.names(),
            rewriters = ?self.rewriters.names(),
            "resilient provider assembled"
        );

        ResilientProvider::from_parts(
            provider,
            self.rewriters,
            self.breaker,
            self.rate_limiter,
            chain.names(),
            handler,
        )
    }
}
