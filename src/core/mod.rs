//! Core functionality for the resilience layer
//!
//! Breaker, middleware chain, rewriters and the resilient provider that ties
//! them together.

pub mod cache;
pub mod circuit_breaker;
pub mod context;
pub mod metrics;
pub mod middleware;
pub mod rate_limiter;
pub mod resilient;
pub mod rewriter;
pub mod traits;
pub mod types;
