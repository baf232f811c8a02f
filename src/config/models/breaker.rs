//! Circuit breaker configuration

use super::*;
use crate::core::circuit_breaker::BreakerConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Circuit breaker settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerSettings {
    /// Consecutive failures that open the breaker
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    /// Per-call timeout hint in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Cooldown before probing an open breaker, in seconds
    #[serde(default = "default_reset_timeout_secs")]
    pub reset_timeout_secs: u64,
    /// Concurrent probes while half-open
    #[serde(default = "default_half_open_max_calls")]
    pub half_open_max_calls: u32,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            timeout_secs: default_timeout_secs(),
            reset_timeout_secs: default_reset_timeout_secs(),
            half_open_max_calls: default_half_open_max_calls(),
        }
    }
}

impl BreakerSettings {
    pub fn to_config(&self) -> BreakerConfig {
        BreakerConfig::new(self.threshold, Duration::from_secs(self.reset_timeout_secs))
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_half_open_max_calls(self.half_open_max_calls)
    }
}
