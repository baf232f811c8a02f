//! Configuration data models
//!
//! Every field has a serde default, so an empty document is a valid config.

pub mod breaker;
pub mod cache;
pub mod logging;
pub mod provider;
pub mod rate_limit;
pub mod retry;

pub use breaker::*;
pub use cache::*;
pub use logging::*;
pub use provider::*;
pub use rate_limit::*;
pub use retry::*;

/// Default consecutive-failure threshold
pub fn default_threshold() -> u32 {
    5
}

/// Default per-call timeout in seconds
pub fn default_timeout_secs() -> u64 {
    30
}

/// Default Open -> HalfOpen cooldown in seconds
pub fn default_reset_timeout_secs() -> u64 {
    60
}

pub fn default_half_open_max_calls() -> u32 {
    3
}

/// Default maximum retry attempts
pub fn default_max_retries() -> u32 {
    3
}

pub fn default_requests_per_second() -> u32 {
    10
}

pub fn default_burst() -> u32 {
    20
}

pub fn default_cache_ttl() -> u64 {
    3600 // 1 hour
}

pub fn default_cache_max_capacity() -> u64 {
    1000
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub(crate) fn default_true() -> bool {
    true
}
