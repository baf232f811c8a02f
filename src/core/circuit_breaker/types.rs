//! Breaker state, configuration and metrics types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default consecutive-failure threshold
pub const DEFAULT_THRESHOLD: u32 = 5;
/// Default per-call timeout hint
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default Open -> HalfOpen cooldown
pub const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(60);
/// Default concurrent probe budget
pub const DEFAULT_HALF_OPEN_MAX_CALLS: u32 = 3;

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CircuitState {
    /// Calls flow normally
    Closed,
    /// Calls are rejected without being attempted
    Open,
    /// A bounded number of probe calls test recovery
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Closed => "Closed",
            Self::Open => "Open",
            Self::HalfOpen => "HalfOpen",
        };
        f.write_str(name)
    }
}

/// Observer invoked with `(from, to)` on every transition
pub type StateChangeCallback = Arc<dyn Fn(CircuitState, CircuitState) + Send + Sync>;

/// Circuit breaker configuration
#[derive(Clone)]
pub struct BreakerConfig {
    /// Consecutive failures that trip Closed -> Open
    pub threshold: u32,
    /// Per-call deadline enforced by the breaker; overruns count as failures
    pub timeout: Duration,
    /// Cooldown before an Open breaker admits a probe
    pub reset_timeout: Duration,
    /// Concurrent probes admitted while HalfOpen
    pub half_open_max_calls: u32,
    /// Transition observer
    pub on_state_change: Option<StateChangeCallback>,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            timeout: DEFAULT_TIMEOUT,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
            half_open_max_calls: DEFAULT_HALF_OPEN_MAX_CALLS,
            on_state_change: None,
        }
    }
}

impl fmt::Debug for BreakerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BreakerConfig")
            .field("threshold", &self.threshold)
            .field("timeout", &self.timeout)
            .field("reset_timeout", &self.reset_timeout)
            .field("half_open_max_calls", &self.half_open_max_calls)
            .field("on_state_change", &self.on_state_change.is_some())
            .finish()
    }
}

impl BreakerConfig {
    pub fn new(threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            threshold,
            reset_timeout,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_half_open_max_calls(mut self, max_calls: u32) -> Self {
        self.half_open_max_calls = max_calls;
        self
    }

    pub fn with_state_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(CircuitState, CircuitState) + Send + Sync + 'static,
    {
        self.on_state_change = Some(Arc::new(callback));
        self
    }

    /// Replace zero fields by their defaults
    pub fn normalized(mut self) -> Self {
        if self.threshold == 0 {
            self.threshold = DEFAULT_THRESHOLD;
        }
        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TIMEOUT;
        }
        if self.reset_timeout.is_zero() {
            self.reset_timeout = DEFAULT_RESET_TIMEOUT;
        }
        if self.half_open_max_calls == 0 {
            self.half_open_max_calls = DEFAULT_HALF_OPEN_MAX_CALLS;
        }
        self
    }
}

/// Point-in-time breaker snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakerMetrics {
    pub state: CircuitState,
    /// Consecutive failures since the last success or reset
    pub failure_count: u32,
    /// Probes currently in flight
    pub half_open_calls: u32,
}
