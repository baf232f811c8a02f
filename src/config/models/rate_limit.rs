//! Rate limiting configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Token bucket settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Enable rate limiting
    #[serde(default)]
    pub enabled: bool,
    /// Sustained rate
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    /// Bucket size
    #[serde(default = "default_burst")]
    pub burst: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
        }
    }
}
