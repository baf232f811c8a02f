//! Configuration integration tests
//!
//! Loads configuration the way a deployment would and checks the assembled
//! provider behaves accordingly.

#[cfg(test)]
mod tests {
    use crate::common::{ChatRequestFactory, ErrorFactory, ScriptedProvider};
    use llm_resilience::config::{BreakerSettings, ProviderOverrides, RetrySettings};
    use llm_resilience::core::middleware::BackoffStrategy;
    use llm_resilience::{CallContext, ResilienceConfig, ResilienceError, ResilientProvider};
    use std::collections::HashMap;
    use std::io::Write;

    const CONFIG: &str = r#"
breaker:
  threshold: 10
  reset_timeout_secs: 30
retry:
  max_retries: 2
  backoff:
    kind: linear
    step_ms: 1
providers:
  fragile:
    breaker:
      threshold: 1
    retry:
      enabled: false
"#;

    // ==================== File Loading ====================

    #[tokio::test]
    async fn test_file_config_drives_assembly() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();
        let config = ResilienceConfig::from_file(file.path()).await.unwrap();

        let sturdy_raw = ScriptedProvider::named("sturdy", vec![]);
        sturdy_raw.push(std::iter::repeat_n(
            crate::common::Step::Fail(ErrorFactory::transient()),
            2,
        ));
        let sturdy = ResilientProvider::from_config(sturdy_raw.clone(), &config).unwrap();
        assert!(sturdy.call(&CallContext::new(), ChatRequestFactory::simple()).await.is_ok());
        assert_eq!(sturdy_raw.calls(), 3);
        assert_eq!(sturdy.breaker().unwrap().config().threshold, 10);

        let fragile_raw = ScriptedProvider::named("fragile", vec![]);
        fragile_raw.push([crate::common::Step::Fail(ErrorFactory::transient())]);
        let fragile = ResilientProvider::from_config(fragile_raw.clone(), &config).unwrap();
        assert!(!fragile.stages().iter().any(|s| s == "retry"));

        assert!(fragile.call(&CallContext::new(), ChatRequestFactory::simple()).await.is_err());
        let err = fragile
            .call(&CallContext::new(), ChatRequestFactory::simple())
            .await
            .unwrap_err();
        assert_eq!(err, ResilienceError::CircuitOpen);
        assert_eq!(fragile_raw.calls(), 1);
    }

    #[test]
    fn test_env_config_drives_assembly() {
        let vars: HashMap<&str, &str> = [
            ("RESILIENCE_RETRY_ENABLED", "false"),
            ("RESILIENCE_CACHE_ENABLED", "true"),
            ("RESILIENCE_REQUEST_TIMEOUT_MS", "2000"),
        ]
        .into_iter()
        .collect();
        let config =
            ResilienceConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        let provider = ResilientProvider::from_config(ScriptedProvider::healthy(), &config).unwrap();
        assert_eq!(
            provider.stages(),
            ["recovery", "tracing", "metrics", "cache", "timeout", "circuit_breaker"]
        );
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let mut config = ResilienceConfig::default();
        config.providers.insert(
            "scripted".to_string(),
            ProviderOverrides {
                retry: Some(RetrySettings {
                    backoff: BackoffStrategy::Exponential {
                        initial_ms: 100,
                        max_ms: 10,
                        multiplier: 2.0,
                    },
                    ..Default::default()
                }),
                ..Default::default()
            },
        );

        let err = ResilientProvider::from_config(ScriptedProvider::healthy(), &config).unwrap_err();
        assert!(matches!(err, ResilienceError::Config(_)));
    }

    #[test]
    fn test_zero_breaker_fields_fall_back_to_defaults() {
        let config = ResilienceConfig {
            breaker: BreakerSettings {
                threshold: 0,
                half_open_max_calls: 0,
                ..Default::default()
            },
            ..Default::default()
        };

        let provider = ResilientProvider::from_config(ScriptedProvider::healthy(), &config).unwrap();
        let breaker = provider.breaker().unwrap().config();
        assert_eq!(breaker.threshold, 5);
        assert_eq!(breaker.half_open_max_calls, 3);
    }
}
