//! Retry configuration

use super::*;
use crate::core::middleware::{BackoffStrategy, RetryMiddleware};
use crate::utils::error::ResilienceError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Extra attempts after the first one
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default)]
    pub backoff: BackoffStrategy,
    /// Randomize backoff delays by plus or minus 5%
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: default_max_retries(),
            backoff: BackoffStrategy::default(),
            jitter: false,
        }
    }
}

impl RetrySettings {
    /// Retry middleware that only repeats retryable classified errors
    pub fn to_middleware(&self) -> RetryMiddleware {
        RetryMiddleware::new(self.max_retries, Duration::ZERO)
            .with_backoff(self.backoff.clone())
            .with_jitter(self.jitter)
            .retry_if(ResilienceError::is_retryable)
    }
}
