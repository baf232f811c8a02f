//! Validators for each configuration section

use super::trait_def::Validate;
use crate::config::ResilienceConfig;
use crate::config::models::*;
use crate::core::middleware::BackoffStrategy;

/// Upper bound on retries; larger budgets belong to the caller's own loop
const MAX_RETRIES_LIMIT: u32 = 10;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

impl Validate for BreakerSettings {
    fn validate(&self) -> Result<(), String> {
        // Zero fields are replaced by defaults when the breaker is built
        Ok(())
    }
}

impl Validate for BackoffStrategy {
    fn validate(&self) -> Result<(), String> {
        match *self {
            BackoffStrategy::Linear { .. } => Ok(()),
            BackoffStrategy::Exponential {
                initial_ms,
                max_ms,
                multiplier,
            } => {
                if multiplier.is_nan() || multiplier < 1.0 {
                    return Err("Exponential backoff multiplier must be at least 1.0".to_string());
                }
                if max_ms < initial_ms {
                    return Err(format!(
                        "Exponential backoff max_ms ({}) must not be below initial_ms ({})",
                        max_ms, initial_ms
                    ));
                }
                Ok(())
            }
        }
    }
}

impl Validate for RetrySettings {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(format!(
                "Retry max_retries must not exceed {}",
                MAX_RETRIES_LIMIT
            ));
        }
        self.backoff.validate()
    }
}

impl Validate for RateLimitSettings {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.requests_per_second == 0 {
            return Err("Rate limit requests_per_second must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for CacheSettings {
    fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }
        if self.ttl_secs == 0 {
            return Err("Cache TTL must be greater than 0".to_string());
        }
        if self.max_capacity == 0 {
            return Err("Cache max capacity must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for LoggingSettings {
    fn validate(&self) -> Result<(), String> {
        let level = self.level.trim().to_ascii_lowercase();
        if LOG_LEVELS.contains(&level.as_str()) {
            return Ok(());
        }
        tracing_subscriber::EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| format!("Invalid log level '{}': {}", self.level, e))
    }
}

impl Validate for ProviderOverrides {
    fn validate(&self) -> Result<(), String> {
        if let Some(breaker) = &self.breaker {
            breaker.validate()?;
        }
        if let Some(retry) = &self.retry {
            retry.validate()?;
        }
        if let Some(rate_limit) = &self.rate_limit {
            rate_limit.validate()?;
        }
        if self.request_timeout_ms == Some(0) {
            return Err("request_timeout_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for ResilienceConfig {
    fn validate(&self) -> Result<(), String> {
        self.breaker
            .validate()
            .map_err(|e| format!("breaker: {}", e))?;
        self.retry.validate().map_err(|e| format!("retry: {}", e))?;
        self.rate_limit
            .validate()
            .map_err(|e| format!("rate_limit: {}", e))?;
        self.cache.validate().map_err(|e| format!("cache: {}", e))?;
        self.logging
            .validate()
            .map_err(|e| format!("logging: {}", e))?;

        if self.request_timeout_ms == Some(0) {
            return Err("request_timeout_ms must be greater than 0".to_string());
        }

        let mut names: Vec<_> = self.providers.keys().collect();
        names.sort();
        for name in names {
            if let Some(overrides) = self.providers.get(name) {
                overrides
                    .validate()
                    .map_err(|e| format!("providers.{}: {}", name, e))?;
            }
        }
        Ok(())
    }
}
