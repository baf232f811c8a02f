//! Circuit breaker
//!
//! Closed -> Open after `threshold` consecutive failures, Open -> HalfOpen once
//! `reset_timeout` has elapsed, HalfOpen -> Closed on a successful probe and
//! back to Open on a failed one.

mod breaker;
mod types;


pub use breaker::CircuitBreaker;
pub use types::{
    BreakerConfig, BreakerMetrics, CircuitState, DEFAULT_HALF_OPEN_MAX_CALLS,
    DEFAULT_RESET_TIMEOUT, DEFAULT_THRESHOLD, DEFAULT_TIMEOUT, StateChangeCallback,
};
