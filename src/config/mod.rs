//! Configuration management for the resilience layer
//!
//! Loaded from YAML or `RESILIENCE_*` environment variables, validated, and
//! resolved per provider before the resilient provider is assembled.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::core::middleware::BackoffStrategy;
use crate::utils::error::{ResilienceError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Prefix of every environment variable read by [`ResilienceConfig::from_env`]
pub const ENV_PREFIX: &str = "RESILIENCE_";

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResilienceConfig {
    #[serde(default)]
    pub breaker: BreakerSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    /// Whole-call deadline in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Per-provider business budgets, keyed by provider name
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub providers: HashMap<String, ProviderOverrides>,
}

impl ResilienceConfig {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading resilience configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ResilienceError::config(format!("Failed to read config file: {}", e)))?;

        Self::from_yaml_str(&content)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| ResilienceError::config(format!("Failed to parse config: {}", e)))?;

        config.validated()
    }

    /// Load configuration from `RESILIENCE_*` environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading resilience configuration from environment variables");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from defaults overlaid with the variables `lookup` resolves
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };
        let mut config = Self::default();

        if let Some(v) = env.parse("BREAKER_THRESHOLD")? {
            config.breaker.threshold = v;
        }
        if let Some(v) = env.parse("BREAKER_TIMEOUT_SECS")? {
            config.breaker.timeout_secs = v;
        }
        if let Some(v) = env.parse("BREAKER_RESET_TIMEOUT_SECS")? {
            config.breaker.reset_timeout_secs = v;
        }
        if let Some(v) = env.parse("BREAKER_HALF_OPEN_MAX_CALLS")? {
            config.breaker.half_open_max_calls = v;
        }

        if let Some(v) = env.parse("RETRY_ENABLED")? {
            config.retry.enabled = v;
        }
        if let Some(v) = env.parse("RETRY_MAX_RETRIES")? {
            config.retry.max_retries = v;
        }
        if let Some(step_ms) = env.parse("RETRY_BACKOFF_MS")? {
            config.retry.backoff = BackoffStrategy::Linear { step_ms };
        }
        if let Some(v) = env.parse("RETRY_JITTER")? {
            config.retry.jitter = v;
        }

        if let Some(v) = env.parse("RATE_LIMIT_ENABLED")? {
            config.rate_limit.enabled = v;
        }
        if let Some(v) = env.parse("RATE_LIMIT_RPS")? {
            config.rate_limit.requests_per_second = v;
        }
        if let Some(v) = env.parse("RATE_LIMIT_BURST")? {
            config.rate_limit.burst = v;
        }

        if let Some(v) = env.parse("CACHE_ENABLED")? {
            config.cache.enabled = v;
        }
        if let Some(v) = env.parse("CACHE_TTL_SECS")? {
            config.cache.ttl_secs = v;
        }
        if let Some(v) = env.parse("CACHE_MAX_CAPACITY")? {
            config.cache.max_capacity = v;
        }

        config.request_timeout_ms = env.parse("REQUEST_TIMEOUT_MS")?;

        if let Some(level) = env.get("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(v) = env.parse("LOG_JSON")? {
            config.logging.json = v;
        }

        config.validated()
    }

    /// Effective configuration for one provider
    ///
    /// Override sections replace the global ones; the returned config has no
    /// nested provider table.
    pub fn for_provider(&self, name: &str) -> Self {
        let mut effective = Self {
            providers: HashMap::new(),
            ..self.clone()
        };

        if let Some(overrides) = self.providers.get(name) {
            debug!(provider = name, "applying provider overrides");
            if let Some(breaker) = &overrides.breaker {
                effective.breaker = breaker.clone();
            }
            if let Some(retry) = &overrides.retry {
                effective.retry = retry.clone();
            }
            if let Some(rate_limit) = &overrides.rate_limit {
                effective.rate_limit = rate_limit.clone();
            }
            if overrides.request_timeout_ms.is_some() {
                effective.request_timeout_ms = overrides.request_timeout_ms;
            }
        }
        effective
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    fn validated(self) -> Result<Self> {
        self.validate().map_err(ResilienceError::config)?;
        debug!("Configuration loaded successfully");
        Ok(self)
    }
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(&format!("{}{}", ENV_PREFIX, key)).filter(|v| !v.trim().is_empty())
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get(key)
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|e| {
                    ResilienceError::config(format!("Invalid {}{}='{}': {}", ENV_PREFIX, key, raw, e))
                })
            })
            .transpose()
    }
}
