//! Response cache configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Response cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Time to live in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    /// Maximum number of cached responses
    #[serde(default = "default_cache_max_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: default_cache_ttl(),
            max_capacity: default_cache_max_capacity(),
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}
