//! Circuit breaker integration tests
//!
//! Drives the breaker state machine through a resilient provider without
//! retries, so every call is exactly one breaker outcome.

#[cfg(test)]
mod tests {
    use crate::common::{ChatRequestFactory, ErrorFactory, GatedProvider, ScriptedProvider, Step};
    use llm_resilience::{BreakerConfig, CallContext, CircuitState, ResilienceError, ResilientProvider};
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::time::Duration;

    fn guarded(provider: Arc<ScriptedProvider>, config: BreakerConfig) -> ResilientProvider {
        ResilientProvider::builder(provider).breaker_config(config).build()
    }

    async fn fail_times(provider: &ResilientProvider, n: usize) {
        for _ in 0..n {
            assert!(provider.call(&CallContext::new(), ChatRequestFactory::simple()).await.is_err());
        }
    }

    // ==================== Trip Threshold ====================

    #[tokio::test]
    async fn test_exact_threshold_trips() {
        let raw = ScriptedProvider::failing(4, ErrorFactory::transient());
        let provider = guarded(raw.clone(), BreakerConfig::new(4, Duration::from_secs(3600)));
        let breaker = provider.breaker().unwrap().clone();

        fail_times(&provider, 3).await;
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.metrics().failure_count, 3);

        fail_times(&provider, 1).await;
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn test_open_rejects_without_invoking() {
        let raw = ScriptedProvider::failing(2, ErrorFactory::transient());
        let provider = guarded(raw.clone(), BreakerConfig::new(2, Duration::from_secs(3600)));
        fail_times(&provider, 2).await;

        for _ in 0..5 {
            let err = provider
                .call(&CallContext::new(), ChatRequestFactory::simple())
                .await
                .unwrap_err();
            assert_eq!(err, ResilienceError::CircuitOpen);
        }
        assert_eq!(raw.calls(), 2);
    }

    #[tokio::test]
    async fn test_success_forgives_failures() {
        let raw = ScriptedProvider::new(vec![
            Step::Fail(ErrorFactory::transient()),
            Step::Fail(ErrorFactory::transient()),
            Step::Succeed,
            Step::Fail(ErrorFactory::transient()),
            Step::Fail(ErrorFactory::transient()),
        ]);
        let provider = guarded(raw.clone(), BreakerConfig::new(3, Duration::from_secs(3600)));

        for _ in 0..5 {
            let _ = provider.call(&CallContext::new(), ChatRequestFactory::simple()).await;
        }
        let breaker = provider.breaker().unwrap();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.metrics().failure_count, 2);
    }

    // ==================== Half-Open ====================

    #[tokio::test]
    async fn test_half_open_success_closes() {
        let raw = ScriptedProvider::failing(1, ErrorFactory::transient());
        let provider = guarded(raw.clone(), BreakerConfig::new(1, Duration::from_millis(50)));
        fail_times(&provider, 1).await;
        assert_eq!(provider.breaker().unwrap().state(), CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(80)).await;
        provider
            .call(&CallContext::new(), ChatRequestFactory::simple())
            .await
            .unwrap();

        let metrics = provider.breaker().unwrap().metrics();
        assert_eq!(metrics.state, CircuitState::Closed);
        assert_eq!(metrics.failure_count, 0);
        assert_eq!(metrics.half_open_calls, 0);
    }

    #[tokio::test]
    async fn test_half_open_failure_restarts_window() {
        let raw = ScriptedProvider::failing(2, ErrorFactory::transient());
        let provider = guarded(raw.clone(), BreakerConfig::new(1, Duration::from_millis(50)));
        fail_times(&provider, 1).await;

        tokio::time::sleep(Duration::from_millis(80)).await;
        fail_times(&provider, 1).await;
        assert_eq!(raw.calls(), 2);
        assert_eq!(provider.breaker().unwrap().state(), CircuitState::Open);

        let err = provider
            .call(&CallContext::new(), ChatRequestFactory::simple())
            .await
            .unwrap_err();
        assert_eq!(err, ResilienceError::CircuitOpen);
        assert_eq!(raw.calls(), 2);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(provider.call(&CallContext::new(), ChatRequestFactory::simple()).await.is_ok());
        assert_eq!(provider.breaker().unwrap().state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_budget_rejects_concurrent_probe() {
        let raw = GatedProvider::new();
        raw.set_failing(true);
        let provider = Arc::new(
            ResilientProvider::builder(raw.clone())
                .breaker_config(
                    BreakerConfig::new(1, Duration::from_millis(50)).with_half_open_max_calls(1),
                )
                .build(),
        );

        assert!(provider.call(&CallContext::new(), ChatRequestFactory::simple()).await.is_err());
        tokio::time::sleep(Duration::from_millis(80)).await;

        raw.set_failing(false);
        raw.set_gated(true);
        let probe = {
            let provider = provider.clone();
            tokio::spawn(async move {
                provider
                    .call(&CallContext::new(), ChatRequestFactory::simple())
                    .await
            })
        };
        raw.wait_started().await;
        assert_eq!(provider.breaker().unwrap().state(), CircuitState::HalfOpen);

        let err = provider
            .call(&CallContext::new(), ChatRequestFactory::simple())
            .await
            .unwrap_err();
        assert_eq!(err, ResilienceError::TooManyCallsInHalfOpen);
        assert_eq!(raw.calls(), 2);

        raw.release();
        assert!(probe.await.unwrap().is_ok());
        assert_eq!(provider.breaker().unwrap().state(), CircuitState::Closed);
    }

    // ==================== Administration ====================

    #[tokio::test]
    async fn test_reset_reopens_traffic() {
        let raw = ScriptedProvider::failing(1, ErrorFactory::transient());
        let provider = guarded(raw.clone(), BreakerConfig::new(1, Duration::from_secs(3600)));
        fail_times(&provider, 1).await;

        provider.breaker().unwrap().reset();
        assert_eq!(provider.breaker().unwrap().state(), CircuitState::Closed);
        assert!(provider.call(&CallContext::new(), ChatRequestFactory::simple()).await.is_ok());
    }

    #[tokio::test]
    async fn test_observer_sees_trip_and_recovery() {
        let (tx, rx) = mpsc::channel();
        let config = BreakerConfig::new(1, Duration::from_millis(50)).with_state_change(
            move |from, to| {
                let _ = tx.send((from, to));
            },
        );
        let raw = ScriptedProvider::failing(1, ErrorFactory::transient());
        let provider = guarded(raw, config);

        fail_times(&provider, 1).await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        provider
            .call(&CallContext::new(), ChatRequestFactory::simple())
            .await
            .unwrap();

        let timeout = Duration::from_secs(2);
        assert_eq!(
            rx.recv_timeout(timeout).unwrap(),
            (CircuitState::Closed, CircuitState::Open)
        );
        assert_eq!(
            rx.recv_timeout(timeout).unwrap(),
            (CircuitState::Open, CircuitState::HalfOpen)
        );
        assert_eq!(
            rx.recv_timeout(timeout).unwrap(),
            (CircuitState::HalfOpen, CircuitState::Closed)
        );
    }

    #[tokio::test]
    async fn test_shared_breaker_across_providers() {
        let breaker = Arc::new(llm_resilience::CircuitBreaker::new(
            "upstream",
            BreakerConfig::new(2, Duration::from_secs(3600)),
        ));
        let first = ResilientProvider::builder(ScriptedProvider::failing(1, ErrorFactory::transient()))
            .breaker(breaker.clone())
            .build();
        let second_raw = ScriptedProvider::failing(1, ErrorFactory::transient());
        let second = ResilientProvider::builder(second_raw.clone())
            .breaker(breaker.clone())
            .build();

        fail_times(&first, 1).await;
        fail_times(&second, 1).await;
        assert_eq!(breaker.state(), CircuitState::Open);

        let err = second
            .call(&CallContext::new(), ChatRequestFactory::simple())
            .await
            .unwrap_err();
        assert!(err.is_breaker_rejection());
        assert_eq!(second_raw.calls(), 1);
    }
}
