//! Resilient provider integration tests
//!
//! Stage interplay: caching, timeouts, cancellation, custom middlewares and
//! local failures surfacing as classified errors.

#[cfg(test)]
mod tests {
    use crate::common::{
        ChatRequestFactory, ChatResponseAssertions, ErrorFactory, ResilienceErrorAssertions,
        ScriptedProvider, Step,
    };
    use crate::wait_until;
    use llm_resilience::core::cache::MokaResponseCache;
    use llm_resilience::core::metrics::InMemoryMetrics;
    use llm_resilience::core::middleware::{
        HeadersMiddleware, MaxTokensLimit, RequireModel, RetryMiddleware, ValidatorMiddleware,
    };
    use llm_resilience::core::rewriter::DefaultModelRewriter;
    use llm_resilience::{
        BreakerConfig, CallContext, CircuitState, ErrorCode, Provider, ResilienceError,
        ResilientProvider,
    };
    use std::sync::Arc;
    use std::time::Duration;

    fn retrying(max: u32) -> RetryMiddleware {
        RetryMiddleware::new(max, Duration::from_millis(1)).retry_if(ResilienceError::is_retryable)
    }

    // ==================== Local Failures ====================

    #[tokio::test]
    async fn test_validation_failure_is_invalid_request() {
        let raw = ScriptedProvider::healthy();
        let provider = ResilientProvider::builder(raw.clone())
            .middleware(ValidatorMiddleware::new(vec![
                Arc::new(RequireModel),
                Arc::new(MaxTokensLimit::new(100)),
            ]))
            .retry(retrying(3))
            .build();

        let mut req = ChatRequestFactory::simple();
        req.max_tokens = Some(4096);
        let err = provider.call(&CallContext::new(), req).await.unwrap_err();

        err.assert_code(ErrorCode::InvalidRequest);
        err.assert_not_retryable();
        let classified = err.classified().unwrap();
        assert_eq!(classified.http_status, 400);
        assert_eq!(classified.provider, "scripted");
        assert!(classified.message.contains("exceeds limit 100"));
        assert_eq!(raw.calls(), 0);
    }

    #[tokio::test]
    async fn test_default_model_is_filled_before_validation() {
        let raw = ScriptedProvider::healthy();
        let provider = ResilientProvider::builder(raw.clone())
            .rewriter(DefaultModelRewriter::new("claude-3-haiku"))
            .middleware(ValidatorMiddleware::new(vec![Arc::new(RequireModel)]))
            .build();

        let resp = provider
            .call(&CallContext::new(), ChatRequestFactory::with_model(""))
            .await
            .unwrap();
        assert_eq!(resp.model, "claude-3-haiku");
        assert_eq!(raw.requests()[0].model, "claude-3-haiku");
    }

    // ==================== Custom Middleware ====================

    #[tokio::test]
    async fn test_custom_middleware_runs_inside_observability() {
        let raw = ScriptedProvider::healthy();
        let provider = ResilientProvider::builder(raw.clone())
            .middleware(HeadersMiddleware::default().header("x-tenant", "acme"))
            .breaker_config(BreakerConfig::default())
            .build();

        assert_eq!(
            provider.stages(),
            ["recovery", "tracing", "metrics", "headers", "circuit_breaker"]
        );
        provider
            .call(&CallContext::new(), ChatRequestFactory::simple())
            .await
            .unwrap();
        assert_eq!(raw.requests()[0].headers["x-tenant"], "acme");
    }

    // ==================== Cache ====================

    #[tokio::test]
    async fn test_cache_hit_skips_breaker_and_provider() {
        let raw = ScriptedProvider::new(vec![Step::Succeed, Step::Fail(ErrorFactory::transient())]);
        let provider = ResilientProvider::builder(raw.clone())
            .cache(Arc::new(MokaResponseCache::new(Duration::from_secs(60), 100)))
            .breaker_config(BreakerConfig::new(1, Duration::from_secs(3600)))
            .build();
        let ctx = CallContext::new();

        for _ in 0..3 {
            provider
                .call(&ctx, ChatRequestFactory::simple())
                .await
                .unwrap()
                .assert_content("ok");
        }
        assert_eq!(raw.calls(), 1);

        // A different request misses the cache and trips the breaker
        let err = provider
            .call(&ctx, ChatRequestFactory::with_model("gpt-4o"))
            .await
            .unwrap_err();
        err.assert_retryable();
        assert_eq!(provider.breaker().unwrap().state(), CircuitState::Open);

        provider
            .call(&ctx, ChatRequestFactory::simple())
            .await
            .unwrap()
            .assert_content("ok");
    }

    // ==================== Deadlines and Cancellation ====================

    #[tokio::test]
    async fn test_timeout_covers_retries() {
        let raw = ScriptedProvider::new(vec![
            Step::Fail(ErrorFactory::transient()),
            Step::Sleep(Duration::from_secs(10)),
        ]);
        let provider = ResilientProvider::builder(raw.clone())
            .timeout(Duration::from_millis(100))
            .retry(retrying(5))
            .breaker_config(BreakerConfig::new(5, Duration::from_secs(3600)))
            .build();

        let started = tokio::time::Instant::now();
        let err = provider
            .call(&CallContext::new(), ChatRequestFactory::simple())
            .await
            .unwrap_err();
        err.assert_code(ErrorCode::UpstreamError);
        err.assert_retryable();
        assert_eq!(err.classified().map(|e| e.http_status), Some(504));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(raw.calls(), 2);

        // The transient failure and the timed-out attempt both count
        let metrics = provider.breaker().unwrap().metrics();
        assert_eq!(metrics.state, CircuitState::Closed);
        assert_eq!(metrics.failure_count, 2);
    }

    #[tokio::test]
    async fn test_caller_cancellation_interrupts_call() {
        let raw = ScriptedProvider::new(vec![Step::Sleep(Duration::from_secs(10))]);
        let provider = Arc::new(
            ResilientProvider::builder(raw.clone())
                .breaker_config(BreakerConfig::new(1, Duration::from_secs(3600)))
                .retry(retrying(3))
                .build(),
        );
        let ctx = CallContext::new();

        let call = {
            let provider = provider.clone();
            let ctx = ctx.clone();
            tokio::spawn(async move { provider.call(&ctx, ChatRequestFactory::simple()).await })
        };
        wait_until!(raw.calls() == 1);
        ctx.cancel();

        let err = call.await.unwrap().unwrap_err();
        assert_eq!(err, ResilienceError::Cancelled);
        assert_eq!(raw.calls(), 1);
        assert_eq!(provider.breaker().unwrap().state(), CircuitState::Closed);
        assert_eq!(provider.breaker().unwrap().metrics().half_open_calls, 0);
    }

    // ==================== Metrics ====================

    #[tokio::test]
    async fn test_metrics_count_calls_not_attempts() {
        let metrics = Arc::new(InMemoryMetrics::new());
        let raw = ScriptedProvider::failing(2, ErrorFactory::transient());
        let provider = ResilientProvider::builder(raw.clone())
            .metrics(metrics.clone())
            .retry(retrying(3))
            .build();

        provider
            .call(&CallContext::new(), ChatRequestFactory::simple())
            .await
            .unwrap();

        let snapshot = metrics.snapshot("gpt-4").unwrap();
        assert_eq!(snapshot.requests, 1);
        assert_eq!(snapshot.successes, 1);
        assert_eq!(raw.calls(), 3);
    }

    // ==================== Concurrency and Streaming ====================

    #[tokio::test]
    async fn test_concurrent_calls_share_stages() {
        let raw = ScriptedProvider::healthy();
        let provider = Arc::new(
            ResilientProvider::builder(raw.clone())
                .breaker_config(BreakerConfig::default())
                .retry(retrying(2))
                .build(),
        );

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let provider = provider.clone();
                tokio::spawn(async move {
                    provider
                        .call(&CallContext::new(), ChatRequestFactory::simple())
                        .await
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(raw.calls(), 32);
    }

    #[tokio::test]
    async fn test_stream_unsupported_by_provider() {
        let raw = ScriptedProvider::healthy();
        let provider = ResilientProvider::builder(raw.clone())
            .retry(retrying(3))
            .build();

        let err = provider
            .stream(&CallContext::new(), ChatRequestFactory::simple())
            .await
            .err()
            .unwrap();
        err.assert_code(ErrorCode::InvalidRequest);
        err.assert_not_retryable();
        assert_eq!(raw.calls(), 0);
    }
}
